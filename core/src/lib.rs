//! Core building blocks of the `brook` UI framework.
//!
//! The crate is split along the render pipeline:
//!
//! - [`node`] describes element trees as plain values ([`Node`], [`h`]).
//! - [`host`] turns those trees into live elements through a [`Host`]
//!   implementation ([`render`], [`mount`]).
//! - [`memory`] provides an in-memory [`Host`] used headlessly and in tests.
//! - [`store`] holds application state and notifies subscribers synchronously.
//! - [`event`] carries the synthetic [`Event`] handed to handlers, the
//!   [`EventBridge`] that attaches root listeners to a mount root, and a small
//!   named-channel [`EventEmitter`].
//!
//! Everything here is single-threaded: handles are `Rc` based and every
//! notification runs to completion before control returns to the caller.
//!
//! ```
//! use brook_core::{h, memory::MemoryHost, render};
//!
//! let host = MemoryHost::new();
//! let item = render(&host, &h("li", [("class", "completed")], "text"))?;
//! assert_eq!(item.tag().as_deref(), Some("li"));
//! assert_eq!(item.attribute("class").as_deref(), Some("completed"));
//! assert_eq!(item.text_content(), "text");
//! # Ok::<(), brook_core::DomError>(())
//! ```

#[macro_use]
mod macros;

mod error;
pub mod event;
pub mod handler;
pub mod host;
pub mod memory;
pub mod node;
pub mod state;
pub mod store;
mod subscription;

pub use error::DomError;
pub use event::{DEFAULT_EVENT_TYPES, Event, EventBridge, EventEmitter};
pub use handler::Handler;
pub use host::{ForeignHandle, Host, mount, mount_children, render};
pub use node::{AttrValue, Child, IntoAttrs, IntoChildren, Node, Style, h};
pub use state::{Patch, State, Value};
pub use store::Store;
pub use subscription::Subscription;
