//! Routing for the `brook` UI framework.
//!
//! A [`Router`] keeps an ordered list of path patterns. On every navigation
//! (an explicit [`Router::navigate`], back/forward traversal, or a hash change)
//! it resolves the current location, runs the matching handler, and publishes
//! a [`RouteOutcome`] into the application [`Store`](brook_core::Store) under
//! [`ROUTE_KEY`]. The render layer reads that outcome like any other state.
//!
//! ```
//! use brook_core::Store;
//! use brook_router::{MemoryHistory, RouteOutcome, RouteResult, Router};
//!
//! let store = Store::default();
//! let router = Router::new(store.clone(), MemoryHistory::new("/users/42"));
//! router.route("/users/:id", |_| Ok(RouteResult::Handled));
//! router.init()?;
//!
//! let route = RouteOutcome::from_state(&store.state()).unwrap();
//! assert_eq!(route.params["id"], "42");
//! # Ok::<(), brook_router::NavigationError>(())
//! ```

mod error;
mod history;
mod outcome;
pub mod path;
mod router;


pub use error::{NavigationError, RouteError};
pub use history::{History, Location, MemoryHistory};
pub use outcome::{ROUTE_KEY, RouteOutcome, RouteResult, RouteStatus, View};
pub use path::Params;
pub use router::{RouteEntry, Router};
