//! Event handler values captured inside node trees.
//!
//! A [`Handler`] is a reference-counted closure. Node trees carry handlers by
//! value, hosts bind them directly on the element they were declared on, and
//! two handlers compare equal only when they share the same allocation.

use core::fmt;
use std::rc::Rc;

use crate::Event;

/// A shared event callback.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&Event)>);

impl Handler {
    /// Wraps a closure into a handler.
    pub fn new(handler: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(handler))
    }

    /// Invokes the handler with the given event.
    pub fn call(&self, event: &Event) {
        (self.0)(event);
    }

    /// Returns `true` if both handlers point to the same closure.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Rc::as_ptr(&self.0).cast::<()>())
    }
}
