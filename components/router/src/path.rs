//! Path normalization and pattern matching.
//!
//! Hash locations are compared in their "hash path" form: the fragment is
//! prefixed with `/#/`, so `#/active`, `#active` and `/#/active` all resolve
//! to `/#/active`, and patterns are written the same way. An empty fragment
//! (`#` or `#/`) is the root hash, `/#/`, which the `/` pattern also matches.

use std::collections::BTreeMap;

use crate::Location;

/// Parameters extracted from `:name` pattern segments.
pub type Params = BTreeMap<String, String>;

/// The hash path of the root hash.
pub const ROOT_HASH_PATH: &str = "/#/";

/// Converts a fragment (with or without its leading `#`) into hash-path form.
///
/// Returns `None` when there is no fragment at all.
#[must_use]
pub fn normalize_hash(hash: &str) -> Option<String> {
    let fragment = hash.strip_prefix('#')?;
    let route = fragment.trim_start_matches('/');
    Some(format!("{ROOT_HASH_PATH}{route}"))
}

/// Brings a registered pattern into the form paths are compared in:
/// patterns written as a bare fragment (`#/active`) become hash paths.
#[must_use]
pub fn normalize_pattern(pattern: &str) -> String {
    if pattern.starts_with('#') {
        normalize_hash(pattern).unwrap_or_else(|| pattern.to_owned())
    } else {
        pattern.to_owned()
    }
}

/// The path the router resolves for `location`: the hash path when a fragment
/// is present, the plain path otherwise.
#[must_use]
pub fn current_path(location: &Location) -> String {
    normalize_hash(&location.hash).unwrap_or_else(|| {
        if location.path.is_empty() {
            "/".to_owned()
        } else {
            location.path.clone()
        }
    })
}

/// Where a navigation address leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Push a history entry for this path.
    Path(String),
    /// Replace the hash fragment with this value (leading `#` included).
    Hash(String),
}

/// Classifies an address accepted by `navigate`: `/foo`, `#/foo`, `/#/foo` or `/`.
#[must_use]
pub fn parse_address(address: &str) -> Option<Target> {
    if address.is_empty() {
        return None;
    }
    if address.starts_with('#') {
        return Some(Target::Hash(address.to_owned()));
    }
    if let Some(hash) = address.strip_prefix('/')
        && hash.starts_with('#')
    {
        return Some(Target::Hash(hash.to_owned()));
    }
    Some(Target::Path(address.to_owned()))
}

/// Matches `path` against `pattern`.
///
/// A pattern matches when it equals the path, when it is `/` and the path is
/// the root hash, or when it contains `:name` segments, has as many segments
/// as the path, and every literal segment is equal. Parameter segments never
/// bind an empty path segment.
#[must_use]
pub fn match_pattern(pattern: &str, path: &str) -> Option<Params> {
    if pattern == path {
        return Some(Params::new());
    }
    if pattern == "/" && (path == ROOT_HASH_PATH || path.is_empty()) {
        return Some(Params::new());
    }
    if !pattern.contains(':') {
        return None;
    }

    let pattern_segments: Vec<&str> = pattern.split('/').collect();
    let path_segments: Vec<&str> = path.split('/').collect();
    if pattern_segments.len() != path_segments.len() {
        return None;
    }

    let mut params = Params::new();
    for (expected, actual) in pattern_segments.iter().zip(&path_segments) {
        match expected.strip_prefix(':') {
            Some(name) if !actual.is_empty() => {
                params.insert(name.to_owned(), (*actual).to_owned());
            }
            Some(_) => return None,
            None if expected == actual => {}
            None => return None,
        }
    }
    Some(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(path: &str, hash: &str) -> Location {
        Location {
            path: path.to_owned(),
            hash: hash.to_owned(),
        }
    }

    #[test]
    fn hash_is_preferred_over_path() {
        assert_eq!(current_path(&location("/app", "#/active")), "/#/active");
        assert_eq!(current_path(&location("/app", "")), "/app");
        assert_eq!(current_path(&location("", "")), "/");
    }

    #[test]
    fn hash_forms_share_one_normal_form() {
        assert_eq!(normalize_hash("#/active").as_deref(), Some("/#/active"));
        assert_eq!(normalize_hash("#active").as_deref(), Some("/#/active"));
        assert_eq!(normalize_hash("#").as_deref(), Some(ROOT_HASH_PATH));
        assert_eq!(normalize_hash("#/").as_deref(), Some(ROOT_HASH_PATH));
        assert_eq!(normalize_hash(""), None);
    }

    #[test]
    fn bare_fragment_patterns_become_hash_paths() {
        assert_eq!(normalize_pattern("#/completed"), "/#/completed");
        assert_eq!(normalize_pattern("/users/:id"), "/users/:id");
    }

    #[test]
    fn root_pattern_matches_root_hash() {
        assert!(match_pattern("/", "/").is_some());
        assert!(match_pattern("/", ROOT_HASH_PATH).is_some());
        assert!(match_pattern("/", "/#/active").is_none());
    }

    #[test]
    fn extracts_parameters() {
        let params = match_pattern("/users/:id", "/users/42").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("42"));

        let params = match_pattern("/#/posts/:post/comments/:comment", "/#/posts/7/comments/9").unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params["comment"], "9");
    }

    #[test]
    fn segment_count_must_match() {
        assert!(match_pattern("/users/:id", "/users/42/x").is_none());
        assert!(match_pattern("/users/:id", "/users").is_none());
        assert!(match_pattern("/users/:id", "/people/42").is_none());
        assert!(match_pattern("/users/:id", "/users/").is_none());
    }

    #[test]
    fn classifies_addresses() {
        assert_eq!(parse_address("/foo"), Some(Target::Path("/foo".into())));
        assert_eq!(parse_address("/"), Some(Target::Path("/".into())));
        assert_eq!(parse_address("#/foo"), Some(Target::Hash("#/foo".into())));
        assert_eq!(parse_address("/#/foo"), Some(Target::Hash("#/foo".into())));
        assert_eq!(parse_address(""), None);
    }
}
