//! Application configuration.

use brook_core::DEFAULT_EVENT_TYPES;
use serde::Deserialize;
use serde_json::{Map, Value as Json};

use crate::AppError;

/// Settings read by [`AppBuilder`](crate::AppBuilder).
///
/// Every field has a default, so an empty JSON object is a valid configuration:
///
/// ```
/// let config = brook::AppConfig::from_json(r#"{ "root_id": "todoapp" }"#)?;
/// assert_eq!(config.root_id, "todoapp");
/// assert!(config.event_types.iter().any(|kind| kind == "click"));
/// # Ok::<(), brook::AppError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Id of the element the application mounts into.
    pub root_id: String,
    /// Event types the event bridge attaches root listeners for.
    pub event_types: Vec<String>,
    /// `tracing` filter directive; logging is left alone when absent.
    pub log_filter: Option<String>,
    /// Entries written into the store before the first render.
    pub initial_state: Map<String, Json>,
}

impl AppConfig {
    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] for malformed JSON or unknown fields.
    pub fn from_json(source: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(source)?)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root_id: "app".to_owned(),
            event_types: DEFAULT_EVENT_TYPES.iter().map(|kind| (*kind).to_owned()).collect(),
            log_filter: None,
            initial_state: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        assert_eq!(AppConfig::from_json("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn reads_initial_state() {
        let config = AppConfig::from_json(
            r#"{ "initial_state": { "filter": "all", "todos": [] }, "log_filter": "debug" }"#,
        )
        .unwrap();
        assert_eq!(config.initial_state["filter"], "all");
        assert_eq!(config.log_filter.as_deref(), Some("debug"));
        assert_eq!(config.root_id, "app");
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(matches!(
            AppConfig::from_json(r#"{ "root": "app" }"#),
            Err(AppError::Config(_))
        ));
    }
}
