/// Error type produced while materializing or mounting node trees.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// A foreign handle was created by a different host than the one rendering it.
    #[error("foreign handle does not belong to this host")]
    ForeignHandle,
    /// An element-only operation was applied to a text node.
    #[error("operation `{0}` requires an element, found a text node")]
    NotAnElement(&'static str),
    /// The requested mounting node cannot be located.
    #[error("failed to find DOM element with id `{0}`")]
    RootNotFound(String),
    /// The host rejected an operation.
    #[error("host error: {0}")]
    Host(String),
}
