#![doc = include_str!("../README.md")]

mod app;
pub mod config;
mod error;
pub mod logging;

pub use app::{App, AppBuilder};
pub use config::AppConfig;
pub use error::AppError;

#[doc(inline)]
pub use brook_core::{
    AttrValue, Child, DEFAULT_EVENT_TYPES, DomError, Event, EventBridge, EventEmitter,
    ForeignHandle, Handler, Host, IntoAttrs, IntoChildren, Node, Patch, State, Store, Style,
    Subscription, Value, event, h, host, memory, mount, mount_children, node, render, state,
    store,
};
pub use brook_editable as editable;
pub use brook_router as router;
#[cfg(feature = "web")]
pub use brook_web as web;

pub use tracing as log;

pub mod prelude {
    //! The types most applications need, for a single glob import.
    //!
    //! ```
    //! use brook::prelude::*;
    //!
    //! fn counter(state: &State) -> Node {
    //!     let count = state.get_as::<i32>("count").copied().unwrap_or_default();
    //!     h("p", [("class", "count")], count.to_string())
    //! }
    //! # let _ = counter(&State::new());
    //! ```
    pub use crate::{App, AppBuilder, AppConfig, AppError};
    pub use brook_core::{Event, Host, Node, Patch, State, Store, Value, h};
    pub use brook_editable::Editable;
    pub use brook_router::{History, RouteOutcome, RouteResult, Router, View};
}
