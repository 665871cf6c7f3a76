//! Inline editable text for the `brook` UI framework.
//!
//! An [`Editable`] renders as a `span` until it is double-clicked, then as an
//! `input` until the edit is committed or cancelled. Whether an element is in
//! edit mode lives in the [`Store`] under [`EDITING_KEY`], which holds the id of
//! the single element being edited (or null), so only one element edits at a
//! time and the editor survives every re-render.
//!
//! ```
//! use brook_core::{Store, Value};
//! use brook_editable::{EDITING_KEY, Editable};
//!
//! let store = Store::default();
//! let label = Editable::new("todo-1", "Buy milk").build(&store);
//! assert_eq!(label.tag(), "span");
//!
//! store.set_state([(EDITING_KEY, Value::from("todo-1"))]);
//! let input = Editable::new("todo-1", "Buy milk").build(&store);
//! assert_eq!(input.tag(), "input");
//! ```

use core::fmt;
use std::rc::Rc;

use brook_core::{AttrValue, Event, Node, State, Store, Value};
use tracing::debug;

/// Key holding the id of the element currently being edited.
pub const EDITING_KEY: &str = "editing";

type UpdateCallback = Rc<dyn Fn(&str)>;

/// Builder for an inline editable element.
///
/// The element is rebuilt on every render; nothing about it is retained
/// except what is in the store.
#[must_use]
pub struct Editable {
    id: String,
    text: String,
    attrs: Vec<(String, AttrValue)>,
    on_update: Option<UpdateCallback>,
}

impl Editable {
    /// Creates an editable element with a stable `id` showing `text`.
    ///
    /// The id is also rendered as the element's `id` attribute.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            attrs: Vec::new(),
            on_update: None,
        }
    }

    /// Adds an attribute to both the `span` and the `input` form.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Sets the callback receiving the committed text.
    pub fn on_update(mut self, callback: impl Fn(&str) + 'static) -> Self {
        self.on_update = Some(Rc::new(callback));
        self
    }

    /// The element id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Renders the element for the current state of `store`.
    #[must_use]
    pub fn build(self, store: &Store) -> Node {
        let editing = editing_target(&store.state()).as_deref() == Some(self.id.as_str());
        let node = self
            .attrs
            .iter()
            .fold(Node::new(if editing { "input" } else { "span" }), |node, (name, value)| {
                node.attr(name.clone(), value.clone())
            })
            .attr("id", self.id.clone());

        if editing {
            self.input(node, store)
        } else {
            self.span(node, store)
        }
    }

    fn span(self, node: Node, store: &Store) -> Node {
        let store = store.clone();
        let id = self.id;
        node.attr("data-editable", true)
            .on("dblclick", move |_| {
                debug!(id = %id, "editing started");
                store.set_state([(EDITING_KEY, Value::from(id.clone()))]);
            })
            .child(self.text)
    }

    fn input(self, node: Node, store: &Store) -> Node {
        let commit = Commit {
            id: self.id,
            text: self.text.clone(),
            store: store.clone(),
            on_update: self.on_update,
        };
        let on_key = commit.clone();
        node.attr("value", self.text)
            .attr("autofocus", true)
            .on("keydown", move |event| match event.key() {
                Some("Enter") => on_key.commit(event),
                Some("Escape") => on_key.cancel(),
                _ => {}
            })
            .on("blur", move |event| {
                // A commit or cancel re-renders and may blur the old input.
                if commit.is_active() {
                    commit.commit(event);
                }
            })
    }
}

impl fmt::Debug for Editable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editable")
            .field("id", &self.id)
            .field("text", &self.text)
            .field("attrs", &self.attrs.len())
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
struct Commit {
    id: String,
    text: String,
    store: Store,
    on_update: Option<UpdateCallback>,
}

impl Commit {
    fn is_active(&self) -> bool {
        editing_target(&self.store.state()).as_deref() == Some(self.id.as_str())
    }

    fn commit(&self, event: &Event) {
        let value = event.value().unwrap_or(&self.text);
        debug!(id = %self.id, "edit committed");
        self.stop();
        if let Some(on_update) = &self.on_update {
            on_update(value);
        }
    }

    fn cancel(&self) {
        debug!(id = %self.id, "edit cancelled");
        self.stop();
    }

    fn stop(&self) {
        self.store.set_state([(EDITING_KEY, Value::null())]);
    }
}

/// The id of the element being edited, if any.
///
/// Accepts ids stored as strings, optional strings, or JSON strings
/// (for example after rehydrating state from storage).
#[must_use]
pub fn editing_target(state: &State) -> Option<String> {
    let json = state.get(EDITING_KEY)?.to_json()?;
    json.as_str().map(str::to_owned)
}

/// Writes a null [`EDITING_KEY`] into `store` unless the key is already present.
pub fn ensure_editing_key(store: &Store) {
    if !store.state().contains_key(EDITING_KEY) {
        store.set_state([(EDITING_KEY, Value::null())]);
    }
}
