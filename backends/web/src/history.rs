use std::rc::Rc;

use brook_router::{History, Location, NavigationError};
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use web_sys::Window;

use crate::error::{self, WebError};

/// [`History`] backed by `window.location` and `window.history`.
///
/// Change callbacks run on `popstate`, which browsers fire both for
/// back/forward traversal and for fragment changes.
#[derive(Debug, Clone)]
pub struct WebHistory {
    window: Window,
}

impl WebHistory {
    /// Connects to the current window.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::DomUnavailable`] outside of a browser.
    pub fn new() -> Result<Self, WebError> {
        web_sys::window()
            .map(Self::from_window)
            .ok_or(WebError::DomUnavailable)
    }

    /// Uses `window` for location and history access.
    #[must_use]
    pub const fn from_window(window: Window) -> Self {
        Self { window }
    }
}

impl History for WebHistory {
    fn location(&self) -> Location {
        let location = self.window.location();
        Location {
            path: location.pathname().unwrap_or_else(|_| "/".to_owned()),
            hash: location.hash().unwrap_or_default(),
        }
    }

    fn push(&self, path: &str) -> Result<(), NavigationError> {
        self.window
            .history()
            .map_err(error::navigation)?
            .push_state_with_url(&JsValue::NULL, "", Some(path))
            .map_err(error::navigation)
    }

    fn set_hash(&self, hash: &str) -> Result<(), NavigationError> {
        self.window
            .location()
            .set_hash(hash)
            .map_err(error::navigation)
    }

    fn on_change(&self, callback: Rc<dyn Fn()>) -> Result<(), NavigationError> {
        let listener = Closure::<dyn FnMut()>::new(move || callback()).into_js_value();
        self.window
            .add_event_listener_with_callback("popstate", listener.unchecked_ref())
            .map_err(error::navigation)
    }
}
