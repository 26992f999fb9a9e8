//! # Value Normalization
//!
//! Converts a parsed YAML value into the value tree the schema evaluator
//! accepts: arrays, string-keyed objects, strings, numbers, booleans and null.
//!
//! YAML allows mapping keys of any type (`1: one`, `true: yes`,
//! `? [a, b] : c`). JSON Schema only talks about string-keyed objects, so a
//! non-string key is a data-integrity failure rather than a validation
//! finding, and normalization stops at the first one it meets. Traversal is
//! depth-first in document order, which makes "the first one" deterministic.
//!
//! Object key order is preserved (`serde_json` is built with
//! `preserve_order`), so issues are later reported in document order.

use serde_json::Value;

use crate::error::NormalizationError;
use crate::pointer;

/// Anything that can be turned into a schema-comparable value tree.
pub trait ToValueTree {
    /// Produce the normalized tree.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizationError`] if the value contains a non-string map
    /// key or a number JSON cannot represent.
    fn to_value_tree(&self) -> Result<Value, NormalizationError>;
}

impl ToValueTree for serde_yaml::Value {
    fn to_value_tree(&self) -> Result<Value, NormalizationError> {
        yaml_to_value_tree(self, pointer::ROOT)
    }
}

/// An already-normalized tree is a fixed point.
impl ToValueTree for Value {
    fn to_value_tree(&self) -> Result<Value, NormalizationError> {
        Ok(self.clone())
    }
}

/// Normalize a parsed YAML document.
///
/// # Errors
///
/// See [`ToValueTree::to_value_tree`].
pub fn normalize(raw: &serde_yaml::Value) -> Result<Value, NormalizationError> {
    raw.to_value_tree()
}

fn yaml_to_value_tree(yaml: &serde_yaml::Value, path: &str) -> Result<Value, NormalizationError> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| NormalizationError::UnrepresentableNumber {
                        path: path.to_string(),
                        value: n.to_string(),
                    })
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let mut items = Vec::with_capacity(seq.len());
            for (index, item) in seq.iter().enumerate() {
                items.push(yaml_to_value_tree(item, &pointer::join_index(path, index))?);
            }
            Ok(Value::Array(items))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut object = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                let serde_yaml::Value::String(key) = k else {
                    return Err(NormalizationError::NonStringKey {
                        path: path.to_string(),
                        key: describe_key(k),
                    });
                };
                let value = yaml_to_value_tree(v, &pointer::join(path, key))?;
                object.insert(key.clone(), value);
            }
            Ok(Value::Object(object))
        }
        // Tags carry no meaning for schema validation.
        serde_yaml::Value::Tagged(tagged) => yaml_to_value_tree(&tagged.value, path),
    }
}

fn describe_key(key: &serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::Null => "null".to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Sequence(_) => "of type sequence".to_string(),
        serde_yaml::Value::Mapping(_) => "of type mapping".to_string(),
        serde_yaml::Value::Tagged(tagged) => {
            format!("{} {}", tagged.tag, describe_key(&tagged.value))
        }
        serde_yaml::Value::String(s) => s.clone(),
    }
}
