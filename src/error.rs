use brook_core::DomError;
use brook_router::NavigationError;

/// Error type produced while bootstrapping or running an [`App`](crate::App).
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The mount container does not exist.
    #[error("failed to find root element with id `{0}`")]
    RootNotFound(String),
    /// Materializing or mounting a view failed.
    #[error(transparent)]
    Dom(#[from] DomError),
    /// Starting the router failed.
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    /// The configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
