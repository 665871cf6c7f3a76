//! Application state values.
//!
//! [`State`] is an ordered mapping from string keys to type-erased [`Value`]s.
//! Values are reference counted, so cloning a [`State`] copies the mapping but
//! shares every value: the Rust counterpart of a shallow object copy.
//!
//! A [`Patch`] is the partial mapping handed to
//! [`Store::set_state`](crate::Store::set_state); merging it overwrites
//! top-level keys and leaves every other key untouched.

use core::{any::Any, fmt};
use std::{collections::BTreeMap, rc::Rc};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value as Json};

type Encoder = fn(&dyn Any) -> Option<Json>;

/// A shared, type-erased state value.
///
/// Values created with [`Value::serde`] (and every `From` conversion offered
/// here) remember how to encode themselves as JSON, which is what the
/// persistence helpers [`State::to_json`] and [`State::decode`] rely on.
/// Values created with [`Value::new`] are opaque to serialization.
#[derive(Clone)]
pub struct Value {
    inner: Rc<dyn Any>,
    encode: Option<Encoder>,
}

fn encode_as<T: Serialize + Any>(value: &dyn Any) -> Option<Json> {
    value
        .downcast_ref::<T>()
        .and_then(|value| serde_json::to_value(value).ok())
}

impl Value {
    /// Wraps an arbitrary value. The value does not take part in JSON persistence.
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            inner: Rc::new(value),
            encode: None,
        }
    }

    /// Wraps a serializable value.
    pub fn serde<T: Serialize + Any>(value: T) -> Self {
        Self {
            inner: Rc::new(value),
            encode: Some(encode_as::<T>),
        }
    }

    /// A JSON `null`.
    #[must_use]
    pub fn null() -> Self {
        Self::serde(Json::Null)
    }

    /// Borrows the wrapped value if it has type `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }

    /// Returns `true` if the wrapped value has type `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Returns `true` if the value is a JSON `null` or a `None` of any `Option<T>` encoded as `null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self.to_json(), Some(Json::Null))
    }

    /// Encodes the value as JSON, if it was created as a serializable value.
    #[must_use]
    pub fn to_json(&self) -> Option<Json> {
        self.encode.and_then(|encode| encode(self.inner.as_ref()))
    }

    /// Returns `true` if both values share the same allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json() {
            Some(json) => write!(f, "Value({json})"),
            None => f.write_str("Value(<opaque>)"),
        }
    }
}

macro_rules! serde_value_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::serde(value)
                }
            }
        )*
    };
}

serde_value_from!(Json, String, bool, i32, i64, u32, u64, usize, f64);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::serde(value.to_owned())
    }
}

impl<T: Serialize + Any> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        Self::serde(value)
    }
}

impl<T: Serialize + Any> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::serde(value)
    }
}

/// Snapshot of the application state.
#[derive(Clone, Default)]
pub struct State {
    entries: BTreeMap<String, Value>,
}

impl State {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Borrows the value stored under `key` if it has type `T`.
    #[must_use]
    pub fn get_as<T: Any>(&self, key: &str) -> Option<&T> {
        self.get(key).and_then(Value::downcast_ref)
    }

    /// Reads the value under `key` as a `T`.
    ///
    /// Values stored as a `T` are cloned directly; other serializable values
    /// (for example JSON rehydrated by a persistence layer) are converted
    /// through their JSON form.
    #[must_use]
    pub fn decode<T: DeserializeOwned + Clone + Any>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        if let Some(typed) = value.downcast_ref::<T>() {
            return Some(typed.clone());
        }
        serde_json::from_value(value.to_json()?).ok()
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterates over the keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over the entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of top-level keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no key is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Shallow-merges `patch` into this state.
    pub fn merge(&mut self, patch: Patch) {
        self.entries.extend(patch.entries);
    }

    /// Encodes the serializable entries among `keys` as a JSON object.
    ///
    /// Missing keys and opaque values are skipped.
    #[must_use]
    pub fn to_json(&self, keys: &[&str]) -> Map<String, Json> {
        keys.iter()
            .filter_map(|key| {
                let json = self.get(key)?.to_json()?;
                Some(((*key).to_owned(), json))
            })
            .collect()
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

/// A partial state mapping applied by [`Store::set_state`](crate::Store::set_state).
#[derive(Clone, Default)]
pub struct Patch {
    entries: BTreeMap<String, Value>,
}

impl Patch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `key`, replacing an earlier value for the same key.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds `key` in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builds a patch from a JSON object, as read back by a persistence layer.
    #[must_use]
    pub fn from_json(object: Map<String, Json>) -> Self {
        object
            .into_iter()
            .map(|(key, json)| (key, Value::serde(json)))
            .collect()
    }

    /// Returns `true` if the patch sets no key.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the keys the patch sets.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl fmt::Debug for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Patch {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut patch = Self::new();
        for (key, value) in iter {
            patch.insert(key, value);
        }
        patch
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Patch {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl From<State> for Patch {
    fn from(state: State) -> Self {
        Self {
            entries: state.entries,
        }
    }
}
