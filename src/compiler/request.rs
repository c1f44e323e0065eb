//! Compiled request document
//!
//! A flat mapping of wire parameter names (`index`, `type`, `id`, `body`, ...)
//! to compiled sub-documents. Built fresh per operation and handed straight
//! to the transport.

use serde::Serialize;
use serde_json::{Map, Value};

/// Wire-shaped request ready for the transport boundary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CompiledRequest {
    params: Map<String, Value>,
}

impl CompiledRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a parameter, replacing any previous value under `key`
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.params.insert(key.into(), value);
    }

    /// Removes and returns a parameter
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.params.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Target index, if resolved
    pub fn index(&self) -> Option<&str> {
        self.get("index").and_then(Value::as_str)
    }

    /// Target document type, if resolved
    pub fn document_type(&self) -> Option<&str> {
        self.get("type").and_then(Value::as_str)
    }

    /// Document id for single-document operations
    pub fn id(&self) -> Option<&str> {
        self.get("id").and_then(Value::as_str)
    }

    pub fn body(&self) -> Option<&Value> {
        self.get("body")
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.params)
    }

    /// Compact JSON. Keys are emitted in sorted order, so equal requests
    /// always serialize to identical bytes.
    pub fn to_json(&self) -> String {
        Value::Object(self.params.clone()).to_string()
    }

    /// Pretty-printed JSON for humans
    pub fn to_json_pretty(&self) -> String {
        format!("{:#}", Value::Object(self.params.clone()))
    }
}

impl From<CompiledRequest> for Value {
    fn from(request: CompiledRequest) -> Self {
        request.into_value()
    }
}
