//! Application bootstrap: mount container, event bridge, store, router and
//! the render loop tying them together.

use core::{cell::RefCell, fmt};
use std::rc::{Rc, Weak};

use brook_core::{
    Child, EventBridge, Host, Node, Patch, State, Store, Subscription, mount_children,
};
use brook_router::{History, RouteOutcome, Router};
use tracing::{debug, error};

use crate::{AppConfig, AppError, logging};

/// Builder for [`App`].
#[derive(Debug)]
pub struct AppBuilder<H> {
    host: H,
    config: AppConfig,
    store: Option<Store>,
}

impl<H: Host + 'static> AppBuilder<H> {
    /// Creates a builder rendering through `host` with the default configuration.
    #[must_use]
    pub fn new(host: H) -> Self {
        Self {
            host,
            config: AppConfig::default(),
            store: None,
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the id of the element the application mounts into.
    #[must_use]
    pub fn with_root_id(mut self, id: impl Into<String>) -> Self {
        self.config.root_id = id.into();
        self
    }

    /// Uses `store` instead of a fresh one, for example [`Store::global`].
    #[must_use]
    pub fn store(mut self, store: Store) -> Self {
        self.store = Some(store);
        self
    }

    /// Finalises the builder: locates the root, attaches the event bridge and
    /// creates a router navigating through `history`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::RootNotFound`] if the root element does not exist,
    /// or the host error raised while attaching root listeners.
    pub fn build(self, history: impl History + 'static) -> Result<App<H>, AppError> {
        let Self {
            host,
            config,
            store,
        } = self;
        if let Some(filter) = &config.log_filter {
            logging::init(filter);
        }

        let root = host
            .element_by_id(&config.root_id)
            .ok_or_else(|| AppError::RootNotFound(config.root_id.clone()))?;
        let bridge = EventBridge::with_event_types(&config.event_types);
        bridge.attach(&host, &root)?;

        let store = store.unwrap_or_else(|| Store::new(State::new()));
        if !config.initial_state.is_empty() {
            store.set_state(Patch::from_json(config.initial_state.clone()));
        }
        let router = Router::new(store.clone(), history);
        debug!(root = %config.root_id, "application created");

        Ok(App {
            inner: Rc::new(AppInner {
                host,
                root,
                config,
                store,
                router,
                bridge,
                render: RefCell::new(None),
            }),
        })
    }
}

struct AppInner<H: Host> {
    host: H,
    root: H::Element,
    config: AppConfig,
    store: Store,
    router: Router,
    bridge: EventBridge,
    render: RefCell<Option<Subscription>>,
}

/// A running application.
///
/// [`App::mount`] renders a view function into the root element and renders
/// it again, replacing the previous subtree, after every store update.
/// The published route takes part in each render: a route view replaces the
/// view function's tree and a blank route leaves the root empty.
/// Clones refer to the same application.
pub struct App<H: Host> {
    inner: Rc<AppInner<H>>,
}

impl<H: Host + 'static> App<H> {
    /// Starts building an application rendering through `host`.
    #[must_use]
    pub fn builder(host: H) -> AppBuilder<H> {
        AppBuilder::new(host)
    }

    /// The host elements are created through.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.inner.host
    }

    /// The mount container.
    #[must_use]
    pub fn root(&self) -> &H::Element {
        &self.inner.root
    }

    /// The configuration the application was built with.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// The application store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// The application router.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.inner.router
    }

    /// The event bridge attached to the root.
    #[must_use]
    pub fn bridge(&self) -> &EventBridge {
        &self.inner.bridge
    }

    /// Renders `view` into the root now and after every store update.
    ///
    /// See [`RouteOutcome::render_or`] for how the current route overrides `view`.
    /// Mounting again replaces the previous view function.
    ///
    /// # Errors
    ///
    /// Returns the host error raised by the initial render. Errors raised by
    /// later renders are logged.
    pub fn mount(&self, view: impl Fn(&State) -> Node + 'static) -> Result<(), AppError> {
        let view: Rc<dyn Fn(&State) -> Node> = Rc::new(view);
        if let Some(previous) = self.inner.render.borrow_mut().take() {
            previous.unsubscribe();
        }

        self.inner.render_with(&view, &self.inner.store.state())?;

        let app: Weak<AppInner<H>> = Rc::downgrade(&self.inner);
        let subscription = self.inner.store.subscribe(move |state| {
            if let Some(app) = app.upgrade()
                && let Err(err) = app.render_with(&view, state)
            {
                error!(error = %err, "render failed");
            }
        });
        *self.inner.render.borrow_mut() = Some(subscription);
        Ok(())
    }

    /// Starts the router: follows history changes and resolves the current location.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot report changes.
    pub fn start(&self) -> Result<RouteOutcome, AppError> {
        Ok(self.inner.router.init()?)
    }

    /// Hands the application to `plugin`, for example to register routes.
    pub fn use_plugin(&self, plugin: impl FnOnce(&Self)) -> &Self {
        plugin(self);
        self
    }
}

impl<H: Host> AppInner<H> {
    fn render_with(&self, view: &Rc<dyn Fn(&State) -> Node>, state: &State) -> Result<(), AppError> {
        let children = match RouteOutcome::from_state(state) {
            Some(route) => route.render_or(|| view(state)),
            None => vec![Child::Node(view(state))],
        };
        mount_children(&self.host, &self.root, &children)?;
        Ok(())
    }
}

impl<H: Host> Clone for App<H> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<H: Host> fmt::Debug for App<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("config", &self.inner.config)
            .field("store", &self.inner.store)
            .field("router", &self.inner.router)
            .field("mounted", &self.inner.render.borrow().is_some())
            .finish_non_exhaustive()
    }
}
