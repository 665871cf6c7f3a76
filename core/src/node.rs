//! Declarative element trees.
//!
//! A [`Node`] describes one element: its tag, its attributes and its children.
//! Nodes are plain values. They are rebuilt from scratch on every render pass,
//! materialized through a [`Host`](crate::Host), and dropped.
//!
//! ```
//! use brook_core::{Node, h};
//!
//! let done = true;
//! let item = h(
//!     "li",
//!     [("class", if done { "completed" } else { "" })],
//!     (
//!         Node::new("input").attr("type", "checkbox").attr("checked", done),
//!         "buy milk",
//!         done.then(|| Node::new("button").attr("class", "destroy")),
//!     ),
//! );
//! assert_eq!(item.children().len(), 3);
//! ```

use std::collections::BTreeMap;

use crate::{Event, ForeignHandle, Handler};

/// Inline style properties, applied one by one at materialization.
pub type Style = BTreeMap<String, String>;

/// The value of one attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// A plain string attribute.
    Text(String),
    /// A flag. Only `checked`, `disabled`, `selected` and `autofocus` are
    /// reflected as present/absent; other names receive `"true"`/`"false"`.
    Bool(bool),
    /// A style mapping (meaningful under the `style` name).
    Style(Style),
    /// An event handler (meaningful under an `on*` name).
    Handler(Handler),
}

impl AttrValue {
    /// JavaScript-style truthiness of the value.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Text(text) => !text.is_empty(),
            Self::Bool(flag) => *flag,
            Self::Style(_) | Self::Handler(_) => true,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for AttrValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Style> for AttrValue {
    fn from(value: Style) -> Self {
        Self::Style(value)
    }
}

impl From<Handler> for AttrValue {
    fn from(value: Handler) -> Self {
        Self::Handler(value)
    }
}

macro_rules! number_attr {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for AttrValue {
                fn from(value: $ty) -> Self {
                    Self::Text(value.to_string())
                }
            }
        )*
    };
}

number_attr!(i32, i64, u32, u64, usize, f64);

/// One child of a [`Node`].
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    /// A nested element.
    Node(Node),
    /// A text node.
    Text(String),
    /// An element owned outside the tree; appended as-is.
    Foreign(ForeignHandle),
}

/// Description of one element and its subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    tag: String,
    attrs: Vec<(String, AttrValue)>,
    children: Vec<Child>,
}

impl Node {
    /// Creates an element description without attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Sets an attribute, replacing an earlier value with the same name.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.set_attr(name.into(), value.into());
        self
    }

    /// Adds one inline style property.
    #[must_use]
    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        let (property, value) = (property.into(), value.into());
        match self.attrs.iter_mut().find(|(name, _)| name == "style") {
            Some((_, AttrValue::Style(style))) => {
                style.insert(property, value);
            }
            _ => self.set_attr(
                "style".to_owned(),
                AttrValue::Style(Style::from([(property, value)])),
            ),
        }
        self
    }

    /// Declares a handler for `event` (for example `"click"`), stored as the `on<event>` attribute.
    #[must_use]
    pub fn on(self, event: &str, handler: impl Fn(&Event) + 'static) -> Self {
        self.attr(format!("on{event}"), Handler::new(handler))
    }

    /// Appends children, flattening nested collections and dropping absent values.
    #[must_use]
    pub fn child(mut self, children: impl IntoChildren) -> Self {
        children.collect_into(&mut self.children);
        self
    }

    fn set_attr(&mut self, name: String, value: AttrValue) {
        match self.attrs.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.attrs.push((name, value)),
        }
    }

    /// The element tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attributes in declaration order.
    #[must_use]
    pub fn attrs(&self) -> &[(String, AttrValue)] {
        &self.attrs
    }

    /// Looks up one attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attrs
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Children in order, already flattened.
    #[must_use]
    pub fn children(&self) -> &[Child] {
        &self.children
    }
}

/// Builds a [`Node`] from a tag, an attribute list and a set of children.
///
/// `children` may be any [`IntoChildren`] value: a node, text, numbers, an
/// `Option`, a `Vec` or array of those, or a tuple mixing them. Nested
/// collections are flattened to any depth; `None` and `false` are dropped.
pub fn h(tag: impl Into<String>, attrs: impl IntoAttrs, children: impl IntoChildren) -> Node {
    let mut node = Node::new(tag);
    for (name, value) in attrs.into_attrs() {
        node.set_attr(name, value);
    }
    node.child(children)
}

/// Conversion into an attribute list for [`h`].
pub trait IntoAttrs {
    /// Converts into `(name, value)` pairs.
    fn into_attrs(self) -> Vec<(String, AttrValue)>;
}

impl IntoAttrs for () {
    fn into_attrs(self) -> Vec<(String, AttrValue)> {
        Vec::new()
    }
}

impl<K: Into<String>, V: Into<AttrValue>, const N: usize> IntoAttrs for [(K, V); N] {
    fn into_attrs(self) -> Vec<(String, AttrValue)> {
        self.into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<AttrValue>> IntoAttrs for Vec<(K, V)> {
    fn into_attrs(self) -> Vec<(String, AttrValue)> {
        self.into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect()
    }
}

/// Conversion into a flat list of [`Child`] values.
pub trait IntoChildren {
    /// Appends the flattened children to `out`.
    fn collect_into(self, out: &mut Vec<Child>);
}

impl IntoChildren for Child {
    fn collect_into(self, out: &mut Vec<Child>) {
        out.push(self);
    }
}

impl IntoChildren for Node {
    fn collect_into(self, out: &mut Vec<Child>) {
        out.push(Child::Node(self));
    }
}

impl IntoChildren for ForeignHandle {
    fn collect_into(self, out: &mut Vec<Child>) {
        out.push(Child::Foreign(self));
    }
}

impl IntoChildren for &str {
    fn collect_into(self, out: &mut Vec<Child>) {
        out.push(Child::Text(self.to_owned()));
    }
}

impl IntoChildren for String {
    fn collect_into(self, out: &mut Vec<Child>) {
        out.push(Child::Text(self));
    }
}

impl IntoChildren for &String {
    fn collect_into(self, out: &mut Vec<Child>) {
        out.push(Child::Text(self.clone()));
    }
}

macro_rules! number_child {
    ($($ty:ty),*) => {
        $(
            impl IntoChildren for $ty {
                fn collect_into(self, out: &mut Vec<Child>) {
                    out.push(Child::Text(self.to_string()));
                }
            }
        )*
    };
}

number_child!(i32, i64, u32, u64, usize, f64);

// `false` is dropped so that `cond && node` style expressions compose; `true`
// has no textual form and is dropped as well.
impl IntoChildren for bool {
    fn collect_into(self, _out: &mut Vec<Child>) {}
}

impl<T: IntoChildren> IntoChildren for Option<T> {
    fn collect_into(self, out: &mut Vec<Child>) {
        if let Some(children) = self {
            children.collect_into(out);
        }
    }
}

impl<T: IntoChildren> IntoChildren for Vec<T> {
    fn collect_into(self, out: &mut Vec<Child>) {
        for children in self {
            children.collect_into(out);
        }
    }
}

impl<T: IntoChildren, const N: usize> IntoChildren for [T; N] {
    fn collect_into(self, out: &mut Vec<Child>) {
        for children in self {
            children.collect_into(out);
        }
    }
}

macro_rules! impl_tuple_children {
    ($($ty:ident),*) => {
        #[allow(non_snake_case, unused_variables)]
        impl<$($ty: IntoChildren,)*> IntoChildren for ($($ty,)*) {
            fn collect_into(self, out: &mut Vec<Child>) {
                let ($($ty,)*) = self;
                $($ty.collect_into(out);)*
            }
        }
    };
}

tuples!(impl_tuple_children);
