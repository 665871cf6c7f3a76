//! Browser backend for the `brook` UI framework.
//!
//! [`WebHost`] materializes node trees into the live DOM and [`WebHistory`]
//! drives the router from `window.location`. Both are thin adapters; all
//! behaviour lives in `brook-core` and `brook-router`.

mod dom;
mod error;
mod history;

pub use dom::WebHost;
pub use error::WebError;
pub use history::WebHistory;

/// Forwards Rust panics to the browser console. Safe to call repeatedly.
pub fn install_panic_hook() {
    console_error_panic_hook::set_once();
}
