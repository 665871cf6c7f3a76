//! The observable application state container.
//!
//! A [`Store`] owns the only writable copy of the application [`State`].
//! Reads hand out shallow copies; writes go through [`Store::set_state`],
//! which merges a [`Patch`] and then notifies every subscriber synchronously,
//! in subscription order.
//!
//! # Re-entrancy
//!
//! A listener may call [`Store::set_state`] itself. The nested call merges and
//! runs a complete notification pass of its own before returning, after which
//! the outer pass resumes with the state snapshot it started with. Nothing
//! guards against a listener that unconditionally writes back: it recurses
//! until the stack overflows.
//!
//! # Failures
//!
//! Listener panics are not caught. A panicking listener aborts the remaining
//! notifications of that `set_state` call. No borrow is held while listeners
//! run, so the store stays usable afterwards.

use core::{
    cell::{Cell, RefCell},
    fmt,
};
use std::rc::Rc;

use tracing::trace;

use crate::{Patch, State, Subscription};

type Listener = Rc<dyn Fn(&State)>;

struct StoreInner {
    state: RefCell<State>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_id: Cell<u64>,
}

impl StoreInner {
    fn is_subscribed(&self, id: u64) -> bool {
        self.listeners
            .borrow()
            .iter()
            .any(|(existing, _)| *existing == id)
    }
}

/// Handle to a shared state container. Clones refer to the same store.
#[derive(Clone)]
pub struct Store {
    inner: Rc<StoreInner>,
}

thread_local! {
    static GLOBAL: Store = Store::default();
}

impl Store {
    /// Creates a store holding `initial`.
    #[must_use]
    pub fn new(initial: State) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(initial),
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// The default store of the current thread.
    ///
    /// Convenient for small applications; code that needs isolation (tests in
    /// particular) should construct its own store with [`Store::new`].
    #[must_use]
    pub fn global() -> Self {
        GLOBAL.with(Clone::clone)
    }

    /// A shallow copy of the current state.
    #[must_use]
    pub fn state(&self) -> State {
        self.inner.state.borrow().clone()
    }

    /// Merges `patch` into the state and notifies every listener with the result.
    pub fn set_state(&self, patch: impl Into<Patch>) {
        let snapshot = {
            let mut state = self.inner.state.borrow_mut();
            state.merge(patch.into());
            state.clone()
        };
        let listeners: Vec<(u64, Listener)> = self.inner.listeners.borrow().clone();
        trace!(listeners = listeners.len(), "notifying store listeners");
        for (id, listener) in listeners {
            // Skip listeners removed earlier in this pass.
            if self.inner.is_subscribed(id) {
                listener(&snapshot);
            }
        }
    }

    /// Registers `listener`, called with the new state after every update.
    pub fn subscribe(&self, listener: impl Fn(&State) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));

        let inner = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner
                    .listeners
                    .borrow_mut()
                    .retain(|(existing, _)| *existing != id);
            }
        })
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Returns `true` if both handles refer to the same store.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(State::default())
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &*self.inner.state.borrow())
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish()
    }
}
