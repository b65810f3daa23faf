//! Decoded token payload and the coercion rules for claim values.
//!
//! Claim values are read leniently:
//! - arrays contribute each scalar element
//! - a bare string contributes itself
//! - numbers / booleans contribute their JSON text
//! - `null`, objects and nested arrays contribute nothing

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ClaimSetError;

pub const AUDIENCE: &str = "aud";
pub const AUTHORITIES: &str = "authorities";
pub const SCOPE: &str = "scope";
pub const GRANT_TYPE: &str = "grant_type";

/// One decoded token payload.
///
/// Read-only once built: there is no API to insert or remove claims.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);

impl ClaimSet {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ClaimSetError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::try_from(value)
    }

    /// `true` when the key exists, even if its value is `null`.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for ClaimSet {
    fn from(claims: Map<String, Value>) -> Self {
        Self(claims)
    }
}

impl TryFrom<Value> for ClaimSet {
    type Error = ClaimSetError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(claims) => Ok(Self(claims)),
            _ => Err(ClaimSetError::NotAnObject),
        }
    }
}

impl FromStr for ClaimSet {
    type Err = ClaimSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: Value = serde_json::from_str(s)?;
        Self::try_from(value)
    }
}

/// String values carried by a claim, in document order (duplicates kept).
pub fn string_values(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    }
}

/// Like [`string_values`], but a bare string is read as a comma-separated list
/// and blank entries are dropped.
pub fn authority_values(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        other => string_values(other)
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .collect(),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_object_payload() {
        let claims: ClaimSet = r#"{"aud": ["app1"], "user_name": "alice"}"#.parse().unwrap();

        assert_eq!(claims.len(), 2);
        assert!(claims.contains("aud"));
        assert_eq!(claims.get_str("user_name"), Some("alice"));
    }

    #[test]
    fn rejects_non_object_payload() {
        let err = "[1, 2, 3]".parse::<ClaimSet>().unwrap_err();
        assert!(matches!(err, ClaimSetError::NotAnObject));

        let err = "{not json".parse::<ClaimSet>().unwrap_err();
        assert!(matches!(err, ClaimSetError::Json(_)));
    }

    #[test]
    fn null_claim_is_still_present() {
        let claims = ClaimSet::try_from(json!({ "aud": null })).unwrap();

        assert!(claims.contains("aud"));
        assert!(string_values(claims.get("aud").unwrap()).is_empty());
    }

    #[test]
    fn string_values_coerces_scalars() {
        let values = string_values(&json!(["a", 42, true, null, {"x": 1}, ["nested"], "a"]));
        assert_eq!(values, vec!["a", "42", "true", "a"]);

        assert_eq!(string_values(&json!("single")), vec!["single"]);
        assert_eq!(string_values(&json!(7)), vec!["7"]);
        assert!(string_values(&json!({"roles": ["x"]})).is_empty());
    }

    #[test]
    fn authority_values_splits_comma_separated_string() {
        let values = authority_values(&json!("ROLE_ADMIN, ROLE_USER,,"));
        assert_eq!(values, vec!["ROLE_ADMIN", "ROLE_USER"]);
    }

    #[test]
    fn authority_values_drops_blank_entries() {
        let values = authority_values(&json!(["ROLE_ADMIN", "", "  ", "ROLE_USER"]));
        assert_eq!(values, vec!["ROLE_ADMIN", "ROLE_USER"]);
    }
}
