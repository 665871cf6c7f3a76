use core::fmt;
use std::rc::Rc;

/// Failure raised by a route handler, shared between the published
/// [`RouteOutcome`](crate::RouteOutcome) and the error callback.
///
/// Clones share the underlying error; equality is identity.
#[derive(Clone)]
pub struct RouteError(Rc<anyhow::Error>);

impl RouteError {
    /// Wraps a handler failure.
    #[must_use]
    pub fn new(error: anyhow::Error) -> Self {
        Self(Rc::new(error))
    }

    /// The wrapped error.
    #[must_use]
    pub fn inner(&self) -> &anyhow::Error {
        &self.0
    }

    /// Borrows the root error if it has type `E`.
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.0.downcast_ref()
    }

    /// Returns `true` if both values share the same error.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for RouteError {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RouteError").field(&self.0).finish()
    }
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Error type produced while changing the location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    /// The history implementation rejected the update.
    #[error("history update rejected: {0}")]
    History(String),
    /// The address cannot be expressed as a location.
    #[error("invalid navigation address `{0}`")]
    InvalidAddress(String),
}
