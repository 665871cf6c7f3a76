use brook_core::DomError;
use brook_router::NavigationError;
use wasm_bindgen::JsValue;

/// Error type produced by the web backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebError {
    /// The DOM APIs are not accessible (e.g., when executed outside of a browser).
    #[error("DOM is not available")]
    DomUnavailable,
    /// The requested mounting node cannot be located.
    #[error("failed to find DOM element with id `{0}`")]
    RootNotFound(String),
    /// The operation needs an element but received another kind of node.
    #[error("`{0}` requires an element node")]
    NotAnElement(&'static str),
    /// Wrapper around JavaScript exceptions.
    #[error("JavaScript error: {0}")]
    Js(String),
}

impl From<JsValue> for WebError {
    fn from(value: JsValue) -> Self {
        value
            .as_string()
            .map_or_else(|| Self::Js(format!("{value:?}")), Self::Js)
    }
}

impl From<WebError> for JsValue {
    fn from(value: WebError) -> Self {
        Self::from(value.to_string())
    }
}

impl From<WebError> for DomError {
    fn from(value: WebError) -> Self {
        match value {
            WebError::RootNotFound(id) => Self::RootNotFound(id),
            WebError::NotAnElement(operation) => Self::NotAnElement(operation),
            other => Self::Host(other.to_string()),
        }
    }
}

impl From<WebError> for NavigationError {
    fn from(value: WebError) -> Self {
        Self::History(value.to_string())
    }
}

/// Converts a JavaScript exception into a [`DomError`].
pub(crate) fn dom(error: JsValue) -> DomError {
    WebError::from(error).into()
}

/// Converts a JavaScript exception into a [`NavigationError`].
pub(crate) fn navigation(error: JsValue) -> NavigationError {
    WebError::from(error).into()
}
