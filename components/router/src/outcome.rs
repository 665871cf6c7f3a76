use brook_core::{Child, ForeignHandle, IntoChildren, Node, State};

use crate::{Params, RouteError};

/// Key under which the router publishes its [`RouteOutcome`].
pub const ROUTE_KEY: &str = "route";

/// Content a route handler asks the render layer to show.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// A node tree.
    Node(Node),
    /// An element built outside the tree.
    Handle(ForeignHandle),
    /// Plain text.
    Text(String),
    /// A number, shown as text.
    Number(f64),
}

impl From<Node> for View {
    fn from(value: Node) -> Self {
        Self::Node(value)
    }
}

impl From<ForeignHandle> for View {
    fn from(value: ForeignHandle) -> Self {
        Self::Handle(value)
    }
}

impl From<&str> for View {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for View {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for View {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl IntoChildren for View {
    fn collect_into(self, out: &mut Vec<Child>) {
        out.push(match self {
            Self::Node(node) => Child::Node(node),
            Self::Handle(handle) => Child::Foreign(handle),
            Self::Text(text) => Child::Text(text),
            Self::Number(number) => Child::Text(number.to_string()),
        });
    }
}

/// What a route handler returns.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteResult {
    /// The handler took care of the route itself (for example by writing
    /// state); the render layer keeps its default view.
    Handled,
    /// The route deliberately renders nothing.
    Blank,
    /// The route overrides the view.
    View(View),
}

impl RouteResult {
    /// Shorthand for `RouteResult::View(view.into())`.
    pub fn view(view: impl Into<View>) -> Self {
        Self::View(view.into())
    }
}

impl From<Node> for RouteResult {
    fn from(value: Node) -> Self {
        Self::View(View::Node(value))
    }
}

/// Which signal of a [`RouteOutcome`] is active, by precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteStatus {
    /// The handler failed.
    Error,
    /// No pattern matched.
    NotFound,
    /// The handler supplied a view.
    View,
    /// The handler asked for a blank render.
    Blank,
    /// The handler handled the route without overriding the view.
    Handled,
}

/// The result of resolving the current location, published under [`ROUTE_KEY`].
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOutcome {
    /// The resolved path (hash path when a fragment was present).
    pub path: String,
    /// Parameters extracted from the matching pattern.
    pub params: Params,
    /// `true` when no pattern matched.
    pub not_found: bool,
    /// The handler failure, if any.
    pub error: Option<RouteError>,
    /// `true` when the handler asked for a blank render.
    pub no_view: bool,
    /// The view supplied by the handler.
    pub view: Option<View>,
}

impl RouteOutcome {
    pub(crate) fn not_found(path: String) -> Self {
        Self {
            path,
            params: Params::new(),
            not_found: true,
            error: None,
            no_view: false,
            view: None,
        }
    }

    pub(crate) fn failed(path: String, params: Params, error: RouteError) -> Self {
        Self {
            path,
            params,
            not_found: false,
            error: Some(error),
            no_view: false,
            view: None,
        }
    }

    pub(crate) fn resolved(path: String, params: Params, result: RouteResult) -> Self {
        let (no_view, view) = match result {
            RouteResult::Handled => (false, None),
            RouteResult::Blank => (true, None),
            RouteResult::View(view) => (false, Some(view)),
        };
        Self {
            path,
            params,
            not_found: false,
            error: None,
            no_view,
            view,
        }
    }

    /// The active signal: error, then not found, then view, then blank.
    #[must_use]
    pub const fn status(&self) -> RouteStatus {
        if self.error.is_some() {
            RouteStatus::Error
        } else if self.not_found {
            RouteStatus::NotFound
        } else if self.view.is_some() {
            RouteStatus::View
        } else if self.no_view {
            RouteStatus::Blank
        } else {
            RouteStatus::Handled
        }
    }

    /// The content to render for this outcome.
    ///
    /// A view override replaces `default`, a blank route renders nothing, and
    /// every other status renders `default()`.
    pub fn render_or(&self, default: impl FnOnce() -> Node) -> Vec<Child> {
        let mut children = Vec::new();
        match self.status() {
            RouteStatus::View => self.view.clone().collect_into(&mut children),
            RouteStatus::Blank => {}
            RouteStatus::Error | RouteStatus::NotFound | RouteStatus::Handled => {
                children.push(Child::Node(default()));
            }
        }
        children
    }

    /// Reads the outcome the router published into `state`.
    #[must_use]
    pub fn from_state(state: &State) -> Option<Self> {
        state.get_as::<Self>(ROUTE_KEY).cloned()
    }
}
