use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// String-keyed JSON state for workflows that shuttle loosely structured
/// data between nodes.
///
/// The engine never inspects the state it carries, so any `Clone` type will
/// do; this one exists so small workflows don't have to define their own.
/// A node clones the incoming context, updates the clone, and returns it,
/// which keeps already-emitted states frozen. Predicates read it through the
/// typed getters: a guard like `|ctx| ctx.get_bool("approved")` routes on
/// whatever the upstream node recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowContext {
    entries: HashMap<String, Value>,
}

impl FlowContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value under `key`, replacing any previous entry. Accepts
    /// anything JSON-like: strings, numbers, bools, or a `json!` literal.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Chaining form of [`set`](Self::set), for seeding an initial state.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Drop an entry, returning it if it was present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Raw value under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Value under `key` when it holds a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Value under `key` when it holds an integer.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    /// True when `key` holds the boolean `true`; false for a missing entry
    /// or any other value. Shaped for edge predicates, which have no way to
    /// report "key absent" beyond not matching.
    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Copy every entry of `patch` into this context, replacing entries
    /// that share a key.
    pub fn merge(&mut self, patch: &FlowContext) {
        self.entries
            .extend(patch.entries.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// All entries, for callers that want to walk the state themselves.
    pub fn entries(&self) -> &HashMap<String, Value> {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FlowContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
