use core::{
    cell::{Cell, RefCell},
    fmt,
};
use std::rc::{Rc, Weak};

use brook_core::{Patch, Store, Value};
use tracing::debug;

use crate::{
    History, NavigationError, Params, ROUTE_KEY, RouteError, RouteOutcome, RouteResult,
    path::{self, Target},
};

type RouteHandler = Rc<dyn Fn(&Params) -> anyhow::Result<RouteResult>>;
type NotFoundCallback = Rc<dyn Fn(&RouteOutcome)>;
type ErrorCallback = Rc<dyn Fn(&RouteError)>;

/// One registered pattern with its handler.
pub struct RouteEntry {
    pattern: String,
    handler: RouteHandler,
    params: RefCell<Params>,
}

impl RouteEntry {
    /// The pattern, in normalized form.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Parameters extracted the last time this entry matched.
    #[must_use]
    pub fn params(&self) -> Params {
        self.params.borrow().clone()
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("pattern", &self.pattern)
            .field("params", &*self.params.borrow())
            .finish_non_exhaustive()
    }
}

struct RouterInner {
    store: Store,
    history: Rc<dyn History>,
    routes: RefCell<Vec<Rc<RouteEntry>>>,
    current: RefCell<Option<Rc<RouteEntry>>>,
    on_not_found: RefCell<Option<NotFoundCallback>>,
    on_error: RefCell<Option<ErrorCallback>>,
    listening: Cell<bool>,
    generation: Cell<u64>,
}

/// Resolves the current location against registered routes and publishes the
/// [`RouteOutcome`] into a [`Store`].
///
/// Every resolution writes the outcome under [`ROUTE_KEY`] before the
/// not-found or error callback runs, so callbacks already see the fresh route
/// in the store. Resolving an unchanged location publishes again; there is no
/// short-circuit for "same route".
///
/// Clones refer to the same router.
#[derive(Clone)]
pub struct Router {
    inner: Rc<RouterInner>,
}

impl Router {
    /// Creates a router publishing into `store` and navigating through `history`.
    pub fn new(store: Store, history: impl History + 'static) -> Self {
        Self {
            inner: Rc::new(RouterInner {
                store,
                history: Rc::new(history),
                routes: RefCell::new(Vec::new()),
                current: RefCell::new(None),
                on_not_found: RefCell::new(None),
                on_error: RefCell::new(None),
                listening: Cell::new(false),
                generation: Cell::new(0),
            }),
        }
    }

    /// Registers a route. Earlier registrations win when several match.
    ///
    /// Patterns are plain paths (`/about`), hash paths (`/#/active`, or the
    /// bare fragment `#/active`), and may contain `:name` parameter segments.
    pub fn route(
        &self,
        pattern: &str,
        handler: impl Fn(&Params) -> anyhow::Result<RouteResult> + 'static,
    ) -> &Self {
        self.inner.routes.borrow_mut().push(Rc::new(RouteEntry {
            pattern: path::normalize_pattern(pattern),
            handler: Rc::new(handler),
            params: RefCell::new(Params::new()),
        }));
        self
    }

    /// Sets the callback invoked after a resolution finds no route.
    pub fn on_not_found(&self, callback: impl Fn(&RouteOutcome) + 'static) -> &Self {
        *self.inner.on_not_found.borrow_mut() = Some(Rc::new(callback));
        self
    }

    /// Sets the callback invoked after a route handler fails.
    pub fn on_error(&self, callback: impl Fn(&RouteError) + 'static) -> &Self {
        *self.inner.on_error.borrow_mut() = Some(Rc::new(callback));
        self
    }

    /// The store outcomes are published into.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// Registered routes in order.
    #[must_use]
    pub fn routes(&self) -> Vec<Rc<RouteEntry>> {
        self.inner.routes.borrow().clone()
    }

    /// The entry matched by the last resolution, if any.
    #[must_use]
    pub fn current_route(&self) -> Option<Rc<RouteEntry>> {
        self.inner.current.borrow().clone()
    }

    /// Starts following history changes (once) and resolves the current location.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot report changes.
    pub fn init(&self) -> Result<RouteOutcome, NavigationError> {
        if !self.inner.listening.get() {
            let router: Weak<RouterInner> = Rc::downgrade(&self.inner);
            self.inner.history.on_change(Rc::new(move || {
                if let Some(inner) = router.upgrade() {
                    Self { inner }.handle_route_change();
                }
            }))?;
            self.inner.listening.set(true);
        }
        Ok(self.handle_route_change())
    }

    /// Navigates to `address`: `/path`, `#/hash`, `/#/hash` or `/`.
    ///
    /// Path addresses push a history entry and resolve immediately. Hash
    /// addresses replace the fragment and resolve through the history's
    /// change notification; before [`Router::init`] they resolve immediately.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty address or when the history rejects the update.
    pub fn navigate(&self, address: &str) -> Result<(), NavigationError> {
        match path::parse_address(address) {
            Some(Target::Path(path)) => {
                self.inner.history.push(&path)?;
                self.handle_route_change();
            }
            Some(Target::Hash(hash)) => {
                self.inner.history.set_hash(&hash)?;
                if !self.inner.listening.get() {
                    self.handle_route_change();
                }
            }
            None => return Err(NavigationError::InvalidAddress(address.to_owned())),
        }
        Ok(())
    }

    /// Resolves the current location and publishes the outcome.
    ///
    /// A handler may navigate while it runs. The nested resolution then wins:
    /// the outer one publishes nothing, runs no callback and returns the
    /// outcome the nested one published.
    pub fn handle_route_change(&self) -> RouteOutcome {
        let generation = self.inner.generation.get().wrapping_add(1);
        self.inner.generation.set(generation);
        let path = path::current_path(&self.inner.history.location());
        let routes = self.routes();
        let matched = routes.into_iter().find_map(|entry| {
            path::match_pattern(&entry.pattern, &path).map(|params| (entry, params))
        });

        let Some((entry, params)) = matched else {
            debug!(path = %path, "no route matched");
            *self.inner.current.borrow_mut() = None;
            let outcome = RouteOutcome::not_found(path);
            self.publish(&outcome);
            let callback = self.inner.on_not_found.borrow().clone();
            if let Some(callback) = callback {
                callback(&outcome);
            }
            return outcome;
        };

        *entry.params.borrow_mut() = params.clone();
        *self.inner.current.borrow_mut() = Some(entry.clone());
        debug!(path = %path, pattern = %entry.pattern, "route matched");

        let result = (entry.handler)(&params);
        if self.inner.generation.get() != generation {
            debug!(path = %path, "superseded by a nested resolution");
            let state = self.inner.store.state();
            return RouteOutcome::from_state(&state).unwrap_or_else(|| match result {
                Ok(result) => RouteOutcome::resolved(path, params, result),
                Err(error) => RouteOutcome::failed(path, params, RouteError::new(error)),
            });
        }

        match result {
            Ok(result) => {
                let outcome = RouteOutcome::resolved(path, params, result);
                self.publish(&outcome);
                outcome
            }
            Err(error) => {
                let error = RouteError::new(error);
                let outcome = RouteOutcome::failed(path, params, error.clone());
                self.publish(&outcome);
                let callback = self.inner.on_error.borrow().clone();
                match callback {
                    Some(callback) => callback(&error),
                    None => debug!(pattern = %entry.pattern, error = %error, "route handler failed"),
                }
                outcome
            }
        }
    }

    fn publish(&self, outcome: &RouteOutcome) {
        self.inner
            .store
            .set_state(Patch::new().set(ROUTE_KEY, Value::new(outcome.clone())));
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &*self.inner.routes.borrow())
            .field("listening", &self.inner.listening.get())
            .finish_non_exhaustive()
    }
}
