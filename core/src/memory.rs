//! An in-memory [`Host`].
//!
//! [`MemoryHost`] keeps a small document (rooted at [`MemoryHost::body`]) made
//! of [`MemoryNode`]s. It implements the parts of the DOM the framework relies
//! on: attributes, inline styles, directly bound handlers, listeners, and
//! bubbling dispatch through [`MemoryHost::dispatch`]. It runs anywhere, which
//! makes it the host of choice for tests and headless rendering.

use core::{cell::RefCell, fmt};
use std::{
    collections::BTreeMap,
    rc::{Rc, Weak},
};

use crate::{DomError, Event, Handler, Host};

/// A node of the in-memory document: an element or a text node.
#[derive(Clone)]
pub struct MemoryNode(Rc<RefCell<NodeData>>);

struct NodeData {
    kind: Kind,
    parent: Weak<RefCell<NodeData>>,
    children: Vec<MemoryNode>,
}

enum Kind {
    Element(ElementData),
    Text(String),
}

#[derive(Default)]
struct ElementData {
    tag: String,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    handlers: BTreeMap<String, Handler>,
    listeners: Vec<(String, Handler)>,
}

impl MemoryNode {
    fn with_kind(kind: Kind) -> Self {
        Self(Rc::new(RefCell::new(NodeData {
            kind,
            parent: Weak::new(),
            children: Vec::new(),
        })))
    }

    fn element(tag: &str) -> Self {
        Self::with_kind(Kind::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            ..ElementData::default()
        }))
    }

    fn text_node(text: &str) -> Self {
        Self::with_kind(Kind::Text(text.to_owned()))
    }

    fn with_element<R>(&self, f: impl FnOnce(&ElementData) -> R) -> Option<R> {
        match &self.0.borrow().kind {
            Kind::Element(element) => Some(f(element)),
            Kind::Text(_) => None,
        }
    }

    fn with_element_mut<R>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut ElementData) -> R,
    ) -> Result<R, DomError> {
        match &mut self.0.borrow_mut().kind {
            Kind::Element(element) => Ok(f(element)),
            Kind::Text(_) => Err(DomError::NotAnElement(operation)),
        }
    }

    /// The lowercase tag of an element, `None` for text nodes.
    #[must_use]
    pub fn tag(&self) -> Option<String> {
        self.with_element(|element| element.tag.clone())
    }

    /// The content of a text node, `None` for elements.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        match &self.0.borrow().kind {
            Kind::Text(text) => Some(text.clone()),
            Kind::Element(_) => None,
        }
    }

    /// Returns `true` for text nodes.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self.0.borrow().kind, Kind::Text(_))
    }

    /// Reads an attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.with_element(|element| element.attributes.get(name).cloned())
            .flatten()
    }

    /// Returns `true` if the attribute is present.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.with_element(|element| element.attributes.contains_key(name))
            .unwrap_or(false)
    }

    /// Attribute names in order.
    #[must_use]
    pub fn attribute_names(&self) -> Vec<String> {
        self.with_element(|element| element.attributes.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Reads one inline style property.
    #[must_use]
    pub fn style(&self, property: &str) -> Option<String> {
        self.with_element(|element| element.style.get(property).cloned())
            .flatten()
    }

    /// The handler directly bound for `event`.
    #[must_use]
    pub fn handler(&self, event: &str) -> Option<Handler> {
        self.with_element(|element| element.handlers.get(event).cloned())
            .flatten()
    }

    /// Number of listeners added for `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.with_element(|element| {
            element
                .listeners
                .iter()
                .filter(|(kind, _)| kind == event)
                .count()
        })
        .unwrap_or(0)
    }

    /// Simulates user input by replacing the `value` attribute.
    ///
    /// # Errors
    ///
    /// Returns an error on text nodes.
    pub fn set_value(&self, value: &str) -> Result<(), DomError> {
        self.with_element_mut("set_value", |element| {
            element
                .attributes
                .insert("value".to_owned(), value.to_owned());
        })
    }

    /// Child nodes in order.
    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        self.0.borrow().children.clone()
    }

    /// The parent node, if attached.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.0.borrow().parent.upgrade().map(Self)
    }

    /// Concatenated text of this node and its descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        let data = self.0.borrow();
        match &data.kind {
            Kind::Text(text) => out.push_str(text),
            Kind::Element(_) => {
                for child in &data.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Every descendant element matching `predicate`, in document order.
    #[must_use]
    pub fn find_all(&self, predicate: impl Fn(&Self) -> bool) -> Vec<Self> {
        let mut found = Vec::new();
        self.walk(&predicate, &mut found);
        found
    }

    fn walk(&self, predicate: &impl Fn(&Self) -> bool, found: &mut Vec<Self>) {
        for child in self.children() {
            if !child.is_text() && predicate(&child) {
                found.push(child.clone());
            }
            child.walk(predicate, found);
        }
    }

    /// The first descendant element matching `predicate`.
    #[must_use]
    pub fn find(&self, predicate: impl Fn(&Self) -> bool) -> Option<Self> {
        self.find_all(predicate).into_iter().next()
    }

    /// Descendant elements with the given tag.
    #[must_use]
    pub fn by_tag(&self, tag: &str) -> Vec<Self> {
        self.find_all(|node| node.tag().as_deref() == Some(tag))
    }

    /// Descendant elements whose `class` attribute contains `class`.
    #[must_use]
    pub fn by_class(&self, class: &str) -> Vec<Self> {
        self.find_all(|node| {
            node.attribute("class")
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
        })
    }

    fn detach(&self) {
        let Some(parent) = self.parent() else {
            return;
        };
        parent
            .0
            .borrow_mut()
            .children
            .retain(|child| !Rc::ptr_eq(&child.0, &self.0));
        self.0.borrow_mut().parent = Weak::new();
    }

    fn contains(&self, other: &Self) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if node == *self {
                return true;
            }
            current = node.parent();
        }
        false
    }
}

impl PartialEq for MemoryNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for MemoryNode {}

impl fmt::Debug for MemoryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        match &data.kind {
            Kind::Text(text) => write!(f, "#text({text:?})"),
            Kind::Element(element) => {
                write!(f, "<{}", element.tag)?;
                for (name, value) in &element.attributes {
                    write!(f, " {name}={value:?}")?;
                }
                write!(f, "> ({} children)", data.children.len())
            }
        }
    }
}

/// In-memory document implementing [`Host`].
#[derive(Clone, Debug)]
pub struct MemoryHost {
    body: MemoryNode,
}

impl MemoryHost {
    /// Creates a document with an empty `body`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            body: MemoryNode::element("body"),
        }
    }

    /// The document body; the usual mount container.
    #[must_use]
    pub fn body(&self) -> MemoryNode {
        self.body.clone()
    }

    /// Dispatches `event` at `target` and returns it once dispatch is complete.
    ///
    /// The propagation path (the target, then its ancestors if the event
    /// bubbles) is fixed before the first handler runs, so handlers that
    /// re-render and detach the target do not cut the path short. At each node
    /// the directly bound handler runs first, then added listeners. Dispatch
    /// stops after the node at which a handler called
    /// [`Event::stop_propagation`].
    ///
    /// Unless the event already carries them, the target's `value` attribute
    /// and, for inputs, its `checked` state are copied onto the event.
    pub fn dispatch(&self, target: &MemoryNode, mut event: Event) -> Event {
        if event.value().is_none()
            && let Some(value) = target.attribute("value")
        {
            event = event.with_value(value);
        }
        if event.checked().is_none() && target.tag().as_deref() == Some("input") {
            event = event.with_checked(target.has_attribute("checked"));
        }

        let mut path = vec![target.clone()];
        if event.bubbles() {
            let mut current = target.parent();
            while let Some(node) = current {
                current = node.parent();
                path.push(node);
            }
        }

        for node in path {
            let (handler, listeners) = node
                .with_element(|element| {
                    let listeners: Vec<Handler> = element
                        .listeners
                        .iter()
                        .filter(|(kind, _)| kind == event.kind())
                        .map(|(_, listener)| listener.clone())
                        .collect();
                    (element.handlers.get(event.kind()).cloned(), listeners)
                })
                .unwrap_or_default();
            if let Some(handler) = handler {
                handler.call(&event);
            }
            for listener in listeners {
                listener.call(&event);
            }
            if event.propagation_stopped() {
                break;
            }
        }
        event
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for MemoryHost {
    type Element = MemoryNode;

    fn create_element(&self, tag: &str) -> Result<MemoryNode, DomError> {
        Ok(MemoryNode::element(tag))
    }

    fn create_text(&self, text: &str) -> Result<MemoryNode, DomError> {
        Ok(MemoryNode::text_node(text))
    }

    fn set_attribute(&self, element: &MemoryNode, name: &str, value: &str) -> Result<(), DomError> {
        element.with_element_mut("set_attribute", |element| {
            element.attributes.insert(name.to_owned(), value.to_owned());
        })
    }

    fn set_style(&self, element: &MemoryNode, property: &str, value: &str) -> Result<(), DomError> {
        element.with_element_mut("set_style", |element| {
            element.style.insert(property.to_owned(), value.to_owned());
        })
    }

    fn bind_handler(
        &self,
        element: &MemoryNode,
        event: &str,
        handler: Handler,
    ) -> Result<(), DomError> {
        element.with_element_mut("bind_handler", |element| {
            element.handlers.insert(event.to_owned(), handler);
        })
    }

    fn add_listener(
        &self,
        element: &MemoryNode,
        event: &str,
        listener: Handler,
    ) -> Result<(), DomError> {
        element.with_element_mut("add_listener", |element| {
            element.listeners.push((event.to_owned(), listener));
        })
    }

    fn append_child(&self, parent: &MemoryNode, child: &MemoryNode) -> Result<(), DomError> {
        if parent.is_text() {
            return Err(DomError::NotAnElement("append_child"));
        }
        if child.contains(parent) {
            return Err(DomError::Host(
                "cannot append a node to one of its own descendants".to_owned(),
            ));
        }
        child.detach();
        child.0.borrow_mut().parent = Rc::downgrade(&parent.0);
        parent.0.borrow_mut().children.push(child.clone());
        Ok(())
    }

    fn clear_children(&self, element: &MemoryNode) -> Result<(), DomError> {
        let children = core::mem::take(&mut element.0.borrow_mut().children);
        for child in children {
            child.0.borrow_mut().parent = Weak::new();
        }
        Ok(())
    }

    fn element_by_id(&self, id: &str) -> Option<MemoryNode> {
        if self.body.attribute("id").as_deref() == Some(id) {
            return Some(self.body.clone());
        }
        self.body
            .find(|node| node.attribute("id").as_deref() == Some(id))
    }
}
