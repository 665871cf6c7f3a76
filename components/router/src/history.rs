//! Access to the location and the session history.

use core::{
    cell::{Cell, RefCell},
    fmt,
};
use std::rc::Rc;

use tracing::trace;

use crate::NavigationError;

/// The part of the current URL the router looks at.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    /// Path component, for example `/users/42`.
    pub path: String,
    /// Fragment including the leading `#`, or empty.
    pub hash: String,
}

impl Location {
    /// Splits an address such as `/app#/active` into path and hash.
    #[must_use]
    pub fn parse(address: &str) -> Self {
        let (path, hash) = address
            .find('#')
            .map_or((address, ""), |index| address.split_at(index));
        Self {
            path: if path.is_empty() { "/".to_owned() } else { path.to_owned() },
            hash: hash.to_owned(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.path, self.hash)
    }
}

/// Session history the router navigates through.
///
/// Implementations call every callback registered with
/// [`History::on_change`] when the location changes outside of
/// [`History::push`]: back/forward traversal and hash changes. Pushing does
/// not notify, matching `popstate` semantics.
pub trait History {
    /// The current location.
    fn location(&self) -> Location;

    /// Pushes a new entry for `path`, clearing the hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the history rejects the entry.
    fn push(&self, path: &str) -> Result<(), NavigationError>;

    /// Replaces the hash fragment (`hash` starts with `#`).
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be updated.
    fn set_hash(&self, hash: &str) -> Result<(), NavigationError>;

    /// Registers a callback for location changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying listener cannot be installed.
    fn on_change(&self, callback: Rc<dyn Fn()>) -> Result<(), NavigationError>;
}

/// History kept in memory: entries, a cursor, and change callbacks.
///
/// Mirrors the browser: [`MemoryHistory::set_hash`] adds an entry and notifies
/// only when the hash actually changes, [`MemoryHistory::back`] and
/// [`MemoryHistory::forward`] move the cursor and notify.
#[derive(Clone)]
pub struct MemoryHistory {
    inner: Rc<MemoryHistoryInner>,
}

struct MemoryHistoryInner {
    entries: RefCell<Vec<Location>>,
    cursor: Cell<usize>,
    callbacks: RefCell<Vec<Rc<dyn Fn()>>>,
}

impl MemoryHistory {
    /// Creates a history whose single entry is `address` (for example `/` or `/#/active`).
    #[must_use]
    pub fn new(address: &str) -> Self {
        Self {
            inner: Rc::new(MemoryHistoryInner {
                entries: RefCell::new(vec![Location::parse(address)]),
                cursor: Cell::new(0),
                callbacks: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    /// Always `false`: a history has at least one entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.borrow().is_empty()
    }

    /// Moves one entry back. Returns `false` at the first entry.
    pub fn back(&self) -> bool {
        let cursor = self.inner.cursor.get();
        if cursor == 0 {
            return false;
        }
        self.inner.cursor.set(cursor - 1);
        self.notify();
        true
    }

    /// Moves one entry forward. Returns `false` at the last entry.
    pub fn forward(&self) -> bool {
        let cursor = self.inner.cursor.get();
        if cursor + 1 >= self.len() {
            return false;
        }
        self.inner.cursor.set(cursor + 1);
        self.notify();
        true
    }

    fn push_entry(&self, location: Location) {
        let cursor = self.inner.cursor.get();
        let mut entries = self.inner.entries.borrow_mut();
        entries.truncate(cursor + 1);
        entries.push(location);
        self.inner.cursor.set(entries.len() - 1);
    }

    fn notify(&self) {
        let callbacks: Vec<Rc<dyn Fn()>> = self.inner.callbacks.borrow().clone();
        trace!(location = %self.location(), callbacks = callbacks.len(), "history changed");
        for callback in callbacks {
            callback();
        }
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl History for MemoryHistory {
    fn location(&self) -> Location {
        self.inner.entries.borrow()[self.inner.cursor.get()].clone()
    }

    fn push(&self, path: &str) -> Result<(), NavigationError> {
        self.push_entry(Location {
            path: path.to_owned(),
            hash: String::new(),
        });
        Ok(())
    }

    fn set_hash(&self, hash: &str) -> Result<(), NavigationError> {
        let current = self.location();
        if current.hash == hash {
            return Ok(());
        }
        self.push_entry(Location {
            path: current.path,
            hash: hash.to_owned(),
        });
        self.notify();
        Ok(())
    }

    fn on_change(&self, callback: Rc<dyn Fn()>) -> Result<(), NavigationError> {
        self.inner.callbacks.borrow_mut().push(callback);
        Ok(())
    }
}

impl fmt::Debug for MemoryHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryHistory")
            .field("entries", &*self.inner.entries.borrow())
            .field("cursor", &self.inner.cursor.get())
            .finish_non_exhaustive()
    }
}
