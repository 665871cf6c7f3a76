use core::{cell::Cell, fmt};
use std::rc::Rc;

/// Capability returned by `subscribe`-style registrations.
///
/// Calling [`Subscription::unsubscribe`] removes exactly the registration that
/// produced it. Further calls are no-ops. Dropping the handle does *not*
/// unsubscribe.
#[must_use = "dropping a subscription keeps the listener registered; call `unsubscribe` to remove it"]
pub struct Subscription {
    remove: Rc<dyn Fn()>,
    active: Rc<Cell<bool>>,
}

impl Subscription {
    pub(crate) fn new(remove: impl Fn() + 'static) -> Self {
        Self {
            remove: Rc::new(remove),
            active: Rc::new(Cell::new(true)),
        }
    }

    /// Removes the registration. Idempotent.
    pub fn unsubscribe(&self) {
        if self.active.replace(false) {
            (self.remove)();
        }
    }

    /// Returns `true` until [`Subscription::unsubscribe`] has been called.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

impl Clone for Subscription {
    fn clone(&self) -> Self {
        Self {
            remove: self.remove.clone(),
            active: self.active.clone(),
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.active.get())
            .finish_non_exhaustive()
    }
}
