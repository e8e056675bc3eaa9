//! Typed field maps used for identifier data and profile data.
//!
//! Values are restricted to strings, numbers and booleans. Accessors fail
//! with `InvalidArgument` when a field is missing or of the wrong kind.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ServiceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            FieldValue::Bool(_) => "bool",
            FieldValue::Number(_) => "number",
            FieldValue::String(_) => "string",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self { FieldValue::String(s.to_string()) }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self { FieldValue::String(s) }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self { FieldValue::Bool(b) }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self { FieldValue::Number(n.into()) }
}

/// Key-ordered map of scalar fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<String, FieldValue>);

impl FieldMap {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> { self.0.get(key) }

    pub fn contains_key(&self, key: &str) -> bool { self.0.contains_key(key) }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> { self.0.iter() }

    pub fn keys(&self) -> impl Iterator<Item = &String> { self.0.keys() }

    pub fn get_str(&self, key: &str) -> Result<&str, ServiceError> {
        match self.0.get(key) {
            Some(FieldValue::String(s)) => Ok(s),
            Some(other) => Err(wrong_kind(key, "string", other)),
            None => Err(ServiceError::invalid_field(format!("missing field `{key}`"), key)),
        }
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, ServiceError> {
        match self.0.get(key) {
            Some(FieldValue::Bool(b)) => Ok(*b),
            Some(other) => Err(wrong_kind(key, "bool", other)),
            None => Err(ServiceError::invalid_field(format!("missing field `{key}`"), key)),
        }
    }

    pub fn get_number(&self, key: &str) -> Result<&serde_json::Number, ServiceError> {
        match self.0.get(key) {
            Some(FieldValue::Number(n)) => Ok(n),
            Some(other) => Err(wrong_kind(key, "number", other)),
            None => Err(ServiceError::invalid_field(format!("missing field `{key}`"), key)),
        }
    }

    /// `(key, value)` for every string-valued field, in key order.
    pub fn string_values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.as_str(), s)))
    }

    /// True when every entry of `self` is present with an equal value in `other`.
    pub fn is_subset_of(&self, other: &FieldMap) -> bool {
        self.0.iter().all(|(k, v)| other.0.get(k) == Some(v))
    }

    /// Merge `other` into a copy of `self`; keys of `other` win.
    pub fn merged(&self, other: &FieldMap) -> FieldMap {
        let mut out = self.clone();
        for (k, v) in other.iter() {
            out.0.insert(k.clone(), v.clone());
        }
        out
    }

    pub fn to_json(&self) -> Result<Value, ServiceError> {
        serde_json::to_value(self).map_err(|e| ServiceError::Encoding(e.to_string()))
    }

    pub fn from_json(value: Value) -> Result<Self, ServiceError> {
        serde_json::from_value(value).map_err(|e| ServiceError::Encoding(e.to_string()))
    }
}

impl FromIterator<(String, FieldValue)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        FieldMap(iter.into_iter().collect())
    }
}

fn wrong_kind(key: &str, expected: &str, got: &FieldValue) -> ServiceError {
    ServiceError::invalid_field(
        format!("field `{key}` must be a {expected}, got {}", got.kind()),
        key,
    )
}
