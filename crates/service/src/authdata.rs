//! Narrowing of client-supplied identifier data to the tenant's valid
//! key-sets.

use crate::errors::ServiceError;
use crate::fields::{FieldMap, FieldValue};

/// Upper bound, in bytes, for one identifier value. Stored shapes are
/// unique-indexed, and index entries have a hard size limit.
pub const MAX_AUTH_DATA_VALUE_BYTES: usize = 256;

/// Identifier fields of one principal, e.g. `{"email": "a@b.com"}`.
pub type AuthData = FieldMap;

/// For every key-set whose keys are all present in `input` with a
/// non-empty string value, emit a map holding exactly those keys.
///
/// Output follows `key_sets` order. Empty key-sets never match, and a
/// key-set that yields a map identical to an earlier one is skipped.
pub fn to_valid_auth_data_list(key_sets: &[Vec<String>], input: &AuthData) -> Vec<AuthData> {
    let mut out: Vec<AuthData> = Vec::new();
    for keys in key_sets {
        if keys.is_empty() {
            continue;
        }
        let picked: Option<AuthData> = keys
            .iter()
            .map(|k| match input.get(k) {
                Some(FieldValue::String(s)) if !s.is_empty() => Some((k.clone(), FieldValue::String(s.clone()))),
                _ => None,
            })
            .collect();
        if let Some(data) = picked {
            if !out.contains(&data) {
                out.push(data);
            }
        }
    }
    out
}

/// Reject `data` when any string value is longer than
/// [`MAX_AUTH_DATA_VALUE_BYTES`]; the error names the first such key.
pub fn check_value_lengths(data: &AuthData) -> Result<(), ServiceError> {
    match data.string_values().find(|(_, v)| v.len() > MAX_AUTH_DATA_VALUE_BYTES) {
        Some((key, _)) => Err(ServiceError::invalid_field(
            format!("{key} longer than {MAX_AUTH_DATA_VALUE_BYTES} bytes"),
            key,
        )),
        None => Ok(()),
    }
}

/// Resolver bound to one tenant's configured key-sets.
#[derive(Debug, Clone, Default)]
pub struct AuthDataResolver {
    key_sets: Vec<Vec<String>>,
}

impl AuthDataResolver {
    pub fn new(key_sets: Vec<Vec<String>>) -> Self { Self { key_sets } }

    pub fn key_sets(&self) -> &[Vec<String>] { &self.key_sets }

    pub fn resolve(&self, input: &AuthData) -> Vec<AuthData> {
        to_valid_auth_data_list(&self.key_sets, input)
    }

    /// Shapes usable for creating principals: at least one, each within
    /// the value length bound.
    pub fn resolve_for_write(&self, input: &AuthData) -> Result<Vec<AuthData>, ServiceError> {
        let shapes = self.resolve(input);
        if shapes.is_empty() {
            return Err(ServiceError::invalid_field("no valid auth data supplied", "auth_data"));
        }
        for shape in &shapes {
            check_value_lengths(shape)?;
        }
        Ok(shapes)
    }

    /// True when `input` satisfies at least one key-set.
    pub fn is_valid(&self, input: &AuthData) -> bool {
        !self.resolve(input).is_empty()
    }
}
