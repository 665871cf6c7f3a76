use brook_core::{DomError, Event, Handler, Host};
use tracing::trace;
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, KeyboardEvent, Node, Window};

use crate::error::{self, WebError};

/// [`Host`] backed by the browser DOM.
///
/// Elements are [`web_sys::Node`]s. Handlers are bound as `on{event}`
/// properties of the element, listeners through `addEventListener`; both
/// receive a [`brook_core::Event`] converted from the native event, and
/// `stop_propagation`/`prevent_default` calls are forwarded back to it.
#[derive(Debug, Clone)]
pub struct WebHost {
    window: Window,
    document: Document,
}

impl WebHost {
    /// Connects to the current window's document.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::DomUnavailable`] outside of a browser.
    pub fn new() -> Result<Self, WebError> {
        let window = web_sys::window().ok_or(WebError::DomUnavailable)?;
        let document = window.document().ok_or(WebError::DomUnavailable)?;
        Ok(Self { window, document })
    }

    /// The window this host renders into.
    #[must_use]
    pub const fn window(&self) -> &Window {
        &self.window
    }

    /// The owning document.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Looks up the mounting element with the provided id.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::RootNotFound`] if no element has that id.
    pub fn root(&self, id: &str) -> Result<Node, WebError> {
        self.document
            .get_element_by_id(id)
            .map(Node::from)
            .ok_or_else(|| WebError::RootNotFound(id.to_owned()))
    }
}

fn element<'a>(node: &'a Node, operation: &'static str) -> Result<&'a Element, DomError> {
    node.dyn_ref::<Element>()
        .ok_or(DomError::NotAnElement(operation))
}

/// Builds the host-independent event for a native one.
fn convert(native: &web_sys::Event) -> Event {
    let mut event = Event::new(native.type_()).with_bubbles(native.bubbles());
    if let Some(keyboard) = native.dyn_ref::<KeyboardEvent>() {
        event = event.with_key(keyboard.key());
    }
    if let Some(input) = native
        .target()
        .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
    {
        event = event.with_value(input.value()).with_checked(input.checked());
    }
    event
}

fn callback(handler: Handler) -> JsValue {
    Closure::<dyn FnMut(web_sys::Event)>::new(move |native: web_sys::Event| {
        let event = convert(&native);
        handler.call(&event);
        if event.propagation_stopped() {
            native.stop_propagation();
        }
        if event.default_prevented() {
            native.prevent_default();
        }
    })
    .into_js_value()
}

impl Host for WebHost {
    type Element = Node;

    fn create_element(&self, tag: &str) -> Result<Node, DomError> {
        self.document
            .create_element(tag)
            .map(Node::from)
            .map_err(error::dom)
    }

    fn create_text(&self, text: &str) -> Result<Node, DomError> {
        Ok(self.document.create_text_node(text).into())
    }

    fn set_attribute(&self, node: &Node, name: &str, value: &str) -> Result<(), DomError> {
        element(node, "set_attribute")?
            .set_attribute(name, value)
            .map_err(error::dom)
    }

    fn set_style(&self, node: &Node, property: &str, value: &str) -> Result<(), DomError> {
        node.dyn_ref::<HtmlElement>()
            .ok_or(DomError::NotAnElement("set_style"))?
            .style()
            .set_property(property, value)
            .map_err(error::dom)
    }

    fn bind_handler(&self, node: &Node, event: &str, handler: Handler) -> Result<(), DomError> {
        trace!(event, "binding handler property");
        js_sys::Reflect::set(node, &JsValue::from_str(&format!("on{event}")), &callback(handler))
            .map(drop)
            .map_err(error::dom)
    }

    fn add_listener(&self, node: &Node, event: &str, listener: Handler) -> Result<(), DomError> {
        let callback = callback(listener);
        node.add_event_listener_with_callback(event, callback.unchecked_ref())
            .map_err(error::dom)
    }

    fn append_child(&self, parent: &Node, child: &Node) -> Result<(), DomError> {
        parent.append_child(child).map(drop).map_err(error::dom)
    }

    fn clear_children(&self, node: &Node) -> Result<(), DomError> {
        while let Some(child) = node.first_child() {
            node.remove_child(&child).map_err(error::dom)?;
        }
        Ok(())
    }

    fn element_by_id(&self, id: &str) -> Option<Node> {
        self.document.get_element_by_id(id).map(Node::from)
    }
}
