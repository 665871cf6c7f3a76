//! Events, the mount-root event bridge, and a named-channel emitter.
//!
//! # Dispatch discipline
//!
//! Handlers declared on a [`Node`](crate::Node) (`on*` attributes) are bound
//! directly on the element they were declared on, and fire while an event
//! bubbles through that element. This is the only dispatch mechanism. The
//! `data-event-*` marker attributes written next to each binding exist for
//! styling and inspection; nothing resolves handlers through them, and there is
//! no registry of named handler functions.
//!
//! [`EventBridge`] attaches one listener per tracked event type to a mount root.
//! Those listeners only observe what reaches the root.

use core::{
    cell::{Cell, RefCell},
    fmt,
};
use std::{any::Any, collections::BTreeMap, rc::Rc};

use tracing::trace;

use crate::{DomError, Handler, Host, Subscription};

/// Event types tracked on a mount root unless configured otherwise.
pub const DEFAULT_EVENT_TYPES: [&str; 10] = [
    "click",
    "dblclick",
    "input",
    "change",
    "submit",
    "keydown",
    "keyup",
    "mouseover",
    "mouseout",
    "focusout",
];

const NON_BUBBLING: [&str; 5] = ["blur", "focus", "mouseenter", "mouseleave", "load"];

/// Host-independent event handed to handlers.
///
/// Hosts fill in what handlers usually need from the native event: the key of
/// keyboard events and the `value`/`checked` state of the target.
#[derive(Debug, Clone)]
pub struct Event {
    kind: String,
    key: Option<String>,
    value: Option<String>,
    checked: Option<bool>,
    bubbles: bool,
    propagation_stopped: Cell<bool>,
    default_prevented: Cell<bool>,
}

impl Event {
    /// Creates an event of the given type. `blur`, `focus`, `mouseenter`,
    /// `mouseleave` and `load` do not bubble, every other type does.
    pub fn new(kind: impl Into<String>) -> Self {
        let kind = kind.into();
        let bubbles = !NON_BUBBLING.contains(&kind.as_str());
        Self {
            kind,
            key: None,
            value: None,
            checked: None,
            bubbles,
            propagation_stopped: Cell::new(false),
            default_prevented: Cell::new(false),
        }
    }

    /// A `keydown` event for `key` (for example `"Enter"`).
    pub fn key_down(key: impl Into<String>) -> Self {
        Self::new("keydown").with_key(key)
    }

    /// Sets the keyboard key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets the target's current value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Sets the target's checked state.
    #[must_use]
    pub const fn with_checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    /// Overrides whether the event bubbles.
    #[must_use]
    pub const fn with_bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    /// The event type, lowercase.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The key of a keyboard event.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The value of the target (inputs, selects, text areas).
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The checked state of the target (checkboxes, radios).
    #[must_use]
    pub const fn checked(&self) -> Option<bool> {
        self.checked
    }

    /// Whether the event travels up to the ancestors of its target.
    #[must_use]
    pub const fn bubbles(&self) -> bool {
        self.bubbles
    }

    /// Stops the event from reaching further ancestors.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    /// Returns `true` once a handler called [`Event::stop_propagation`].
    #[must_use]
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    /// Asks the host to skip the default action.
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    /// Returns `true` once a handler called [`Event::prevent_default`].
    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

/// Attaches the root listeners of a mount root.
///
/// Application bootstrap code calls [`EventBridge::attach`] exactly once per
/// mount root. Attaching the same root again is a no-op.
#[derive(Clone)]
pub struct EventBridge {
    inner: Rc<BridgeInner>,
}

struct BridgeInner {
    event_types: Vec<String>,
    attached: RefCell<Vec<Rc<dyn Any>>>,
    counts: RefCell<BTreeMap<String, u64>>,
}

impl EventBridge {
    /// Creates a bridge tracking [`DEFAULT_EVENT_TYPES`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_event_types(DEFAULT_EVENT_TYPES)
    }

    /// Creates a bridge tracking the given event types.
    pub fn with_event_types<I, S>(event_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner: Rc::new(BridgeInner {
                event_types: event_types
                    .into_iter()
                    .map(|kind| kind.into().to_ascii_lowercase())
                    .collect(),
                attached: RefCell::new(Vec::new()),
                counts: RefCell::new(BTreeMap::new()),
            }),
        }
    }

    /// Event types this bridge listens for.
    #[must_use]
    pub fn event_types(&self) -> &[String] {
        &self.inner.event_types
    }

    /// Installs one root listener per tracked event type on `root`.
    ///
    /// Returns `false` without touching the host if `root` was already attached.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by the host while adding listeners.
    pub fn attach<H: Host + ?Sized>(&self, host: &H, root: &H::Element) -> Result<bool, DomError> {
        let already = self
            .inner
            .attached
            .borrow()
            .iter()
            .any(|known| known.downcast_ref::<H::Element>() == Some(root));
        if already {
            return Ok(false);
        }

        for kind in &self.inner.event_types {
            let inner = Rc::downgrade(&self.inner);
            let listener = Handler::new(move |event| {
                trace!(event = event.kind(), "event reached mount root");
                if let Some(inner) = inner.upgrade() {
                    *inner
                        .counts
                        .borrow_mut()
                        .entry(event.kind().to_owned())
                        .or_default() += 1;
                }
            });
            host.add_listener(root, kind, listener)?;
        }
        self.inner
            .attached
            .borrow_mut()
            .push(Rc::new(root.clone()));
        Ok(true)
    }

    /// Number of events of type `kind` that bubbled up to an attached root.
    #[must_use]
    pub fn dispatch_count(&self, kind: &str) -> u64 {
        self.inner.counts.borrow().get(kind).copied().unwrap_or(0)
    }
}

impl Default for EventBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBridge")
            .field("event_types", &self.inner.event_types)
            .field("attached_roots", &self.inner.attached.borrow().len())
            .finish()
    }
}

type Callback<T> = Rc<dyn Fn(&T)>;
type Channels<T> = BTreeMap<String, Vec<(u64, Callback<T>)>>;

/// Named-channel publish/subscribe for application-level events.
pub struct EventEmitter<T> {
    channels: Rc<RefCell<Channels<T>>>,
    next_id: Cell<u64>,
}

impl<T: 'static> EventEmitter<T> {
    /// Creates an emitter without subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            channels: Rc::new(RefCell::new(BTreeMap::new())),
            next_id: Cell::new(0),
        }
    }

    /// Registers `callback` on channel `name`.
    pub fn on(&self, name: impl Into<String>, callback: impl Fn(&T) + 'static) -> Subscription {
        let name = name.into();
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.channels
            .borrow_mut()
            .entry(name.clone())
            .or_default()
            .push((id, Rc::new(callback)));

        let channels = Rc::downgrade(&self.channels);
        Subscription::new(move || {
            if let Some(channels) = channels.upgrade()
                && let Some(callbacks) = channels.borrow_mut().get_mut(&name)
            {
                callbacks.retain(|(existing, _)| *existing != id);
            }
        })
    }

    /// Calls every callback registered on `name`, in registration order.
    pub fn emit(&self, name: &str, payload: &T) {
        let callbacks: Vec<Callback<T>> = self
            .channels
            .borrow()
            .get(name)
            .map(|callbacks| callbacks.iter().map(|(_, cb)| cb.clone()).collect())
            .unwrap_or_default();
        for callback in callbacks {
            callback(payload);
        }
    }

    /// Number of callbacks registered on `name`.
    #[must_use]
    pub fn listener_count(&self, name: &str) -> usize {
        self.channels.borrow().get(name).map_or(0, Vec::len)
    }
}

impl<T: 'static> Default for EventEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EventEmitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("channels", &self.channels.borrow().keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Node, h, memory::MemoryHost, render};

    #[test]
    fn handler_fires_while_bubbling_through_ancestor() {
        let host = MemoryHost::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let tree = Node::new("ul")
            .on("click", move |event| log.borrow_mut().push(event.kind().to_owned()))
            .child(h("li", (), h("span", (), "x")));
        let list = render(&host, &tree).unwrap();
        let span = list.children()[0].children()[0].clone();

        host.dispatch(&span, Event::new("click"));

        assert_eq!(*seen.borrow(), ["click"]);
    }

    #[test]
    fn stop_propagation_keeps_event_from_ancestors() {
        let host = MemoryHost::new();
        let outer_hits = Rc::new(Cell::new(0));
        let counter = outer_hits.clone();
        let tree = Node::new("div")
            .on("click", move |_| counter.set(counter.get() + 1))
            .child(Node::new("button").on("click", |event| event.stop_propagation()));
        let div = render(&host, &tree).unwrap();
        let button = div.children()[0].clone();

        let event = host.dispatch(&button, Event::new("click"));

        assert!(event.propagation_stopped());
        assert_eq!(outer_hits.get(), 0);
    }

    #[test]
    fn blur_does_not_bubble() {
        let host = MemoryHost::new();
        let outer_hits = Rc::new(Cell::new(0));
        let counter = outer_hits.clone();
        let tree = Node::new("form")
            .on("blur", move |_| counter.set(counter.get() + 1))
            .child(Node::new("input"));
        let form = render(&host, &tree).unwrap();

        host.dispatch(&form.children()[0], Event::new("blur"));
        assert_eq!(outer_hits.get(), 0);
    }

    #[test]
    fn bridge_attaches_once_per_root_and_observes_events() {
        let host = MemoryHost::new();
        let root = host.body();
        let bridge = EventBridge::with_event_types(["click", "keydown"]);

        assert_eq!(bridge.attach(&host, &root), Ok(true));
        assert_eq!(bridge.attach(&host, &root), Ok(false));
        assert_eq!(root.listener_count("click"), 1);

        let button = render(&host, &Node::new("button").on("click", |_| {})).unwrap();
        host.append_child(&root, &button).unwrap();
        host.dispatch(&button, Event::new("click"));
        host.dispatch(&button, Event::new("mouseover"));

        assert_eq!(bridge.dispatch_count("click"), 1);
        assert_eq!(bridge.dispatch_count("mouseover"), 0);
    }

    #[test]
    fn emitter_unsubscribe_is_idempotent() {
        let emitter = EventEmitter::<u32>::new();
        let total = Rc::new(Cell::new(0));
        let sum = total.clone();
        let subscription = emitter.on("add", move |n| sum.set(sum.get() + n));
        let _other = emitter.on("add", |_| {});

        emitter.emit("add", &2);
        subscription.unsubscribe();
        subscription.unsubscribe();
        emitter.emit("add", &5);
        emitter.emit("unknown", &7);

        assert_eq!(total.get(), 2);
        assert_eq!(emitter.listener_count("add"), 1);
    }
}
