//! Per-workbench discovery context.

use cts_types::ServerIdentity;
use serde_json::Value;
use std::collections::BTreeMap;

/// Discovery key holding the target server's name.
pub const SERVER_NAME_KEY: &str = "server.name";

/// Discovery key holding the target server's root URL.
pub const SERVER_ROOT_URL_KEY: &str = "server.root_url";

/// Scratch space shared by the test cases of one workbench run.
///
/// Earlier test cases record what they discovered (type definitions, created
/// instance GUIDs) and later ones read it back. A context belongs to a single
/// workbench run and is dropped when the run ends.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryContext {
    entries: BTreeMap<String, Value>,
}

impl DiscoveryContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context seeded with the identity of the server under test.
    pub fn seeded(server: &ServerIdentity) -> Self {
        let mut context = Self::new();
        context.insert(SERVER_NAME_KEY, Value::String(server.name.clone()));
        context.insert(SERVER_ROOT_URL_KEY, Value::String(server.root_url.clone()));
        context
    }

    /// Record a discovery, replacing any earlier value under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
