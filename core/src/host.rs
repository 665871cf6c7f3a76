//! Materialization of node trees into live elements.
//!
//! A [`Host`] is the DOM a tree is rendered into: the browser document in
//! `brook-web`, or [`MemoryHost`](crate::memory::MemoryHost) headlessly. The
//! rendering rules themselves live here, once, in [`render`].
//!
//! There is no reconciliation: [`render`] always creates fresh elements and
//! [`mount`] always replaces the container's previous content. Both take a full
//! tree and return a full subtree, so a diffing strategy could later be
//! introduced behind the same signatures.

use core::{any::Any, fmt};
use std::rc::Rc;

use tracing::trace;

use crate::{AttrValue, Child, DomError, Handler, Node};

/// Attributes that are reflected as present/absent instead of carrying a value.
pub const BOOLEAN_ATTRIBUTES: [&str; 4] = ["checked", "disabled", "selected", "autofocus"];

/// Prefix of the marker attribute written for every declared event handler.
pub const EVENT_MARKER_PREFIX: &str = "data-event-";

/// A DOM implementation node trees can be materialized into.
pub trait Host {
    /// Handle to a live node (element or text) of this host.
    type Element: Clone + PartialEq + 'static;

    /// Creates a detached element.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the tag.
    fn create_element(&self, tag: &str) -> Result<Self::Element, DomError>;

    /// Creates a detached text node.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot create text nodes.
    fn create_text(&self, text: &str) -> Result<Self::Element, DomError>;

    /// Sets a string attribute.
    ///
    /// # Errors
    ///
    /// Returns an error if `element` is not an element or the name is invalid.
    fn set_attribute(&self, element: &Self::Element, name: &str, value: &str)
    -> Result<(), DomError>;

    /// Sets one inline style property.
    ///
    /// # Errors
    ///
    /// Returns an error if `element` does not carry inline styles.
    fn set_style(&self, element: &Self::Element, property: &str, value: &str)
    -> Result<(), DomError>;

    /// Binds `handler` as the element's own handler for `event`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if `element` cannot receive events.
    fn bind_handler(
        &self,
        element: &Self::Element,
        event: &str,
        handler: Handler,
    ) -> Result<(), DomError>;

    /// Adds a listener for `event` on `element`, in addition to any existing ones.
    ///
    /// # Errors
    ///
    /// Returns an error if `element` cannot receive events.
    fn add_listener(
        &self,
        element: &Self::Element,
        event: &str,
        listener: Handler,
    ) -> Result<(), DomError>;

    /// Appends `child` to `parent`, detaching it from its previous parent.
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` cannot have children.
    fn append_child(&self, parent: &Self::Element, child: &Self::Element) -> Result<(), DomError>;

    /// Removes every child of `element`.
    ///
    /// # Errors
    ///
    /// Returns an error if a child cannot be removed.
    fn clear_children(&self, element: &Self::Element) -> Result<(), DomError>;

    /// Looks up an attached element by its `id` attribute.
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    /// Takes over an externally-owned handle.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::ForeignHandle`] if the handle was not created for this host.
    fn adopt(&self, handle: &ForeignHandle) -> Result<Self::Element, DomError> {
        handle
            .downcast::<Self::Element>()
            .ok_or(DomError::ForeignHandle)
    }
}

/// An externally-owned DOM handle embedded in a node tree.
///
/// Materializing a tree that contains the handle moves the underlying node
/// under its new parent.
#[derive(Clone)]
pub struct ForeignHandle(Rc<dyn Any>);

impl ForeignHandle {
    /// Wraps a host element handle.
    pub fn new<T: Any>(handle: T) -> Self {
        Self(Rc::new(handle))
    }

    /// Returns a copy of the wrapped handle if it has type `T`.
    #[must_use]
    pub fn downcast<T: Any + Clone>(&self) -> Option<T> {
        self.0.downcast_ref::<T>().cloned()
    }
}

impl PartialEq for ForeignHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ForeignHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ForeignHandle({:p})", Rc::as_ptr(&self.0).cast::<()>())
    }
}

/// Materializes `node` into a fresh, detached subtree of `host`.
///
/// # Errors
///
/// Returns the first error reported by the host.
pub fn render<H: Host + ?Sized>(host: &H, node: &Node) -> Result<H::Element, DomError> {
    let element = host.create_element(node.tag())?;
    for (name, value) in node.attrs() {
        apply_attribute(host, &element, name, value)?;
    }
    for child in node.children() {
        let child = render_child(host, child)?;
        host.append_child(&element, &child)?;
    }
    Ok(element)
}

fn render_child<H: Host + ?Sized>(host: &H, child: &Child) -> Result<H::Element, DomError> {
    match child {
        Child::Node(node) => render(host, node),
        Child::Text(text) => host.create_text(text),
        Child::Foreign(handle) => host.adopt(handle),
    }
}

/// Clears `container` and appends the materialized `node`, returning the new subtree root.
///
/// # Errors
///
/// Returns the first error reported by the host.
pub fn mount<H: Host + ?Sized>(
    host: &H,
    container: &H::Element,
    node: &Node,
) -> Result<H::Element, DomError> {
    let element = render(host, node)?;
    host.clear_children(container)?;
    host.append_child(container, &element)?;
    Ok(element)
}

/// Clears `container` and appends each of `children` in order.
///
/// An empty slice leaves the container empty.
///
/// # Errors
///
/// Returns the first error reported by the host.
pub fn mount_children<H: Host + ?Sized>(
    host: &H,
    container: &H::Element,
    children: &[Child],
) -> Result<(), DomError> {
    let elements = children
        .iter()
        .map(|child| render_child(host, child))
        .collect::<Result<Vec<_>, _>>()?;
    host.clear_children(container)?;
    for element in &elements {
        host.append_child(container, element)?;
    }
    Ok(())
}

fn apply_attribute<H: Host + ?Sized>(
    host: &H,
    element: &H::Element,
    name: &str,
    value: &AttrValue,
) -> Result<(), DomError> {
    match value {
        AttrValue::Style(style) if name == "style" => {
            for (property, value) in style {
                host.set_style(element, property, value)?;
            }
        }
        _ if name.starts_with("on") => {
            let event = name[2..].to_ascii_lowercase();
            if let AttrValue::Handler(handler) = value {
                host.set_attribute(element, &format!("{EVENT_MARKER_PREFIX}{event}"), "")?;
                host.bind_handler(element, &event, handler.clone())?;
            } else {
                trace!(attribute = name, "ignoring non-handler value on event attribute");
            }
        }
        _ if BOOLEAN_ATTRIBUTES.contains(&name) => {
            if value.is_truthy() {
                host.set_attribute(element, name, name)?;
            }
        }
        AttrValue::Text(text) => host.set_attribute(element, name, text)?,
        AttrValue::Bool(flag) if name != "style" => {
            host.set_attribute(element, name, if *flag { "true" } else { "false" })?;
        }
        AttrValue::Style(style) => {
            let css = style
                .iter()
                .map(|(property, value)| format!("{property}: {value};"))
                .collect::<Vec<_>>()
                .join(" ");
            host.set_attribute(element, name, &css)?;
        }
        AttrValue::Bool(_) | AttrValue::Handler(_) => {
            trace!(attribute = name, "skipping attribute without a string form");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Event, h, memory::MemoryHost};
    use core::cell::Cell;
    use proptest::prelude::*;

    #[test]
    fn renders_list_item() {
        let host = MemoryHost::new();
        let item = render(&host, &h("li", [("class", "completed")], "text")).unwrap();

        assert_eq!(item.tag().as_deref(), Some("li"));
        assert_eq!(item.attribute("class").as_deref(), Some("completed"));
        let children = item.children();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].text().as_deref(), Some("text"));
    }

    #[test]
    fn style_map_is_applied_per_property() {
        let host = MemoryHost::new();
        let node = Node::new("div").style("color", "red").style("display", "none");
        let element = render(&host, &node).unwrap();

        assert_eq!(element.style("color").as_deref(), Some("red"));
        assert_eq!(element.style("display").as_deref(), Some("none"));
        assert_eq!(element.attribute("style"), None);
    }

    #[test]
    fn non_map_style_is_coerced() {
        let host = MemoryHost::new();
        let text = render(&host, &Node::new("div").attr("style", "color: blue")).unwrap();
        let flag = render(&host, &Node::new("div").attr("style", true)).unwrap();

        assert_eq!(text.attribute("style").as_deref(), Some("color: blue"));
        assert_eq!(flag.attribute("style"), None);
    }

    #[test]
    fn handlers_are_bound_and_marked() {
        let host = MemoryHost::new();
        let clicks = Rc::new(Cell::new(0));
        let counter = clicks.clone();
        let node = Node::new("button").on("Click", move |_| counter.set(counter.get() + 1));
        let button = render(&host, &node).unwrap();

        assert!(button.has_attribute("data-event-click"));
        assert!(button.handler("click").is_some());

        host.dispatch(&button, Event::new("click"));
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn non_handler_event_attribute_is_ignored() {
        let host = MemoryHost::new();
        let element = render(&host, &Node::new("a").attr("onclick", "alert(1)")).unwrap();

        assert!(!element.has_attribute("onclick"));
        assert!(element.handler("click").is_none());
    }

    #[test]
    fn plain_flags_are_stringified() {
        let host = MemoryHost::new();
        let element = render(&host, &Node::new("div").attr("hidden", false)).unwrap();
        assert_eq!(element.attribute("hidden").as_deref(), Some("false"));
    }

    #[test]
    fn foreign_handles_move_under_new_parent() {
        let host = MemoryHost::new();
        let old_parent = host.create_element("section").unwrap();
        let foreign = host.create_element("canvas").unwrap();
        host.append_child(&old_parent, &foreign).unwrap();

        let tree = h("div", (), ForeignHandle::new(foreign.clone()));
        let div = render(&host, &tree).unwrap();

        assert!(old_parent.children().is_empty());
        assert_eq!(foreign.parent(), Some(div));
    }

    #[test]
    fn foreign_handle_of_another_host_is_rejected() {
        let host = MemoryHost::new();
        let tree = h("div", (), ForeignHandle::new("not an element"));
        assert_eq!(render(&host, &tree), Err(DomError::ForeignHandle));
    }

    #[test]
    fn mount_replaces_previous_content() {
        let host = MemoryHost::new();
        let container = host.body();

        mount(&host, &container, &h("p", (), "first")).unwrap();
        let second = mount(&host, &container, &h("p", (), "second")).unwrap();

        assert_eq!(container.children(), vec![second]);
        assert_eq!(container.text_content(), "second");
    }

    #[test]
    fn mount_children_accepts_text_and_nothing() {
        let host = MemoryHost::new();
        let container = host.body();
        mount(&host, &container, &h("p", (), "old")).unwrap();

        let children = [Child::Text("plain".into()), Child::Node(h("b", (), "bold"))];
        mount_children(&host, &container, &children).unwrap();
        assert_eq!(container.children().len(), 2);
        assert_eq!(container.text_content(), "plainbold");

        mount_children(&host, &container, &[]).unwrap();
        assert!(container.children().is_empty());
    }

    proptest! {
        #[test]
        fn boolean_attributes_reflect_truthy_subset(
            flags in proptest::collection::vec(
                (prop::sample::select(BOOLEAN_ATTRIBUTES.to_vec()), any::<bool>()),
                0..8,
            )
        ) {
            let host = MemoryHost::new();
            let mut node = Node::new("input");
            for (name, flag) in &flags {
                node = node.attr(*name, *flag);
            }
            let element = render(&host, &node).unwrap();

            for name in BOOLEAN_ATTRIBUTES {
                let expected = flags.iter().rev().find(|(n, _)| *n == name).is_some_and(|(_, f)| *f);
                prop_assert_eq!(element.has_attribute(name), expected);
                if expected {
                    let value = element.attribute(name);
                    prop_assert_eq!(value.as_deref(), Some(name));
                }
            }
        }
    }
}
