//! Generic action payloads.
//!
//! `ActionValue` carries actions that have no typed schema. Maps keep the
//! order the caller wrote their keys in and are never re-sorted, so the same
//! logical action always encodes to the same bytes.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::{CoreError, Result};

/// Deepest nesting accepted from untyped input.
pub const MAX_DEPTH: usize = 32;

/// A canonically encodable action value.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionValue {
    Nil,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Array(Vec<ActionValue>),
    Map(Vec<(String, ActionValue)>),
}

impl ActionValue {
    /// Build a map from entries, keeping their order.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ActionValue)>,
    {
        ActionValue::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Look up a key of a map value.
    pub fn get(&self, key: &str) -> Option<&ActionValue> {
        match self {
            ActionValue::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// The `type` field of a map value, if present and a string.
    pub fn action_type(&self) -> Option<&str> {
        match self.get("type") {
            Some(ActionValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Convert untyped JSON, preserving key order.
    ///
    /// # Errors
    /// Returns `CoreError::UnsupportedValue` for non-finite numbers and for
    /// input nested deeper than [`MAX_DEPTH`].
    pub fn from_json(value: &Value) -> Result<Self> {
        Self::from_json_at(value, 0)
    }

    fn from_json_at(value: &Value, depth: usize) -> Result<Self> {
        if depth > MAX_DEPTH {
            return Err(CoreError::UnsupportedValue(format!(
                "nesting deeper than {MAX_DEPTH} levels"
            )));
        }
        Ok(match value {
            Value::Null => ActionValue::Nil,
            Value::Bool(b) => ActionValue::Bool(*b),
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    ActionValue::UInt(u)
                } else if let Some(i) = n.as_i64() {
                    ActionValue::Int(i)
                } else {
                    match n.as_f64() {
                        Some(f) if f.is_finite() => ActionValue::Float(f),
                        _ => {
                            return Err(CoreError::UnsupportedValue(format!(
                                "number {n} has no canonical encoding"
                            )))
                        }
                    }
                }
            }
            Value::String(s) => ActionValue::Str(s.clone()),
            Value::Array(items) => ActionValue::Array(
                items
                    .iter()
                    .map(|item| Self::from_json_at(item, depth + 1))
                    .collect::<Result<_>>()?,
            ),
            Value::Object(entries) => ActionValue::Map(
                entries
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), Self::from_json_at(v, depth + 1)?)))
                    .collect::<Result<_>>()?,
            ),
        })
    }

    /// Check that every float is finite.
    ///
    /// Values built in code bypass [`ActionValue::from_json`], so the
    /// serializer re-checks before encoding.
    ///
    /// # Errors
    /// Returns `CoreError::UnsupportedValue` on the first offending value.
    pub fn validate(&self) -> Result<()> {
        self.validate_at(0)
    }

    fn validate_at(&self, depth: usize) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(CoreError::UnsupportedValue(format!(
                "nesting deeper than {MAX_DEPTH} levels"
            )));
        }
        match self {
            ActionValue::Float(f) if !f.is_finite() => Err(CoreError::UnsupportedValue(format!(
                "float {f} has no canonical encoding"
            ))),
            ActionValue::Array(items) => items.iter().try_for_each(|v| v.validate_at(depth + 1)),
            ActionValue::Map(entries) => {
                for (i, (key, value)) in entries.iter().enumerate() {
                    if entries[..i].iter().any(|(k, _)| k == key) {
                        return Err(CoreError::UnsupportedValue(format!(
                            "duplicate key \"{key}\""
                        )));
                    }
                    value.validate_at(depth + 1)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl TryFrom<Value> for ActionValue {
    type Error = CoreError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_json(&value)
    }
}

impl From<bool> for ActionValue {
    fn from(b: bool) -> Self {
        ActionValue::Bool(b)
    }
}

impl From<u64> for ActionValue {
    fn from(n: u64) -> Self {
        ActionValue::UInt(n)
    }
}

impl From<i64> for ActionValue {
    fn from(n: i64) -> Self {
        ActionValue::Int(n)
    }
}

impl From<&str> for ActionValue {
    fn from(s: &str) -> Self {
        ActionValue::Str(s.to_string())
    }
}

impl From<String> for ActionValue {
    fn from(s: String) -> Self {
        ActionValue::Str(s)
    }
}

impl Serialize for ActionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ActionValue::Nil => serializer.serialize_unit(),
            ActionValue::Bool(b) => serializer.serialize_bool(*b),
            ActionValue::Int(i) => serializer.serialize_i64(*i),
            ActionValue::UInt(u) => serializer.serialize_u64(*u),
            ActionValue::Float(f) => serializer.serialize_f64(*f),
            ActionValue::Str(s) => serializer.serialize_str(s),
            ActionValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ActionValue::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_key_order_is_preserved() {
        let value = ActionValue::from_json(&json!({
            "type": "subAccountTransfer",
            "subAccountUser": "0xabc",
            "isDeposit": true,
            "usd": 1_000_000
        }))
        .unwrap();

        let keys: Vec<&str> = match &value {
            ActionValue::Map(entries) => entries.iter().map(|(k, _)| k.as_str()).collect(),
            _ => panic!("expected map"),
        };
        assert_eq!(keys, ["type", "subAccountUser", "isDeposit", "usd"]);
        assert_eq!(value.action_type(), Some("subAccountTransfer"));
    }

    #[test]
    fn test_numeric_kinds_survive_conversion() {
        let value = ActionValue::from_json(&json!({"i": -5, "u": 7, "f": 1.5})).unwrap();
        assert_eq!(value.get("i"), Some(&ActionValue::Int(-5)));
        assert_eq!(value.get("u"), Some(&ActionValue::UInt(7)));
        assert_eq!(value.get("f"), Some(&ActionValue::Float(1.5)));
    }

    #[test]
    fn test_rejects_excessive_nesting() {
        let mut nested = json!(1);
        for _ in 0..=MAX_DEPTH {
            nested = json!([nested]);
        }
        assert!(matches!(
            ActionValue::from_json(&nested),
            Err(CoreError::UnsupportedValue(_))
        ));
    }

    #[test]
    fn test_validate_rejects_non_finite_float() {
        let value = ActionValue::map([("px", ActionValue::Float(f64::NAN))]);
        assert!(matches!(
            value.validate(),
            Err(CoreError::UnsupportedValue(_))
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_keys() {
        let value = ActionValue::map([("a", ActionValue::from(1u64)), ("a", ActionValue::from(2u64))]);
        assert!(matches!(
            value.validate(),
            Err(CoreError::UnsupportedValue(_))
        ));
    }

    #[test]
    fn test_json_output_matches_input() {
        let input = json!({"type": "createSubAccount", "name": "Sub1"});
        let value = ActionValue::from_json(&input).unwrap();
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"{"type":"createSubAccount","name":"Sub1"}"#
        );
    }
}
