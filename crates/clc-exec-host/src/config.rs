//! Resource configuration handed to a provisioner

use crate::error::{HostError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Declarative key-value configuration of one provisioner block
///
/// `raw` holds the configuration as written, `config` the values the host has
/// already interpolated. Typed values take precedence over raw ones when the
/// two are merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub raw: Map<String, Value>,

    #[serde(default)]
    pub config: Map<String, Value>,

    /// Keys whose values are not known until apply time
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub computed_keys: Vec<String>,
}

impl ResourceConfig {
    /// Build a config whose raw and typed maps hold the same values
    pub fn new(raw: Map<String, Value>) -> Self {
        Self {
            config: raw.clone(),
            raw,
            computed_keys: Vec::new(),
        }
    }

    /// Build a config from a JSON object
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self::new(map)),
            other => Err(HostError::InvalidConfig(format!(
                "expected an object, got {}",
                type_name(&other)
            ))),
        }
    }

    /// Raw values overlaid with typed values
    pub fn merged(&self) -> Map<String, Value> {
        let mut merged = self.raw.clone();
        for (k, v) in &self.config {
            merged.insert(k.clone(), v.clone());
        }
        merged
    }

    /// Look up a dotted key such as `parameters.foo`, typed values first
    pub fn get(&self, key: &str) -> Option<&Value> {
        lookup(&self.config, key).or_else(|| lookup(&self.raw, key))
    }

    /// Whether a key carries a non-null value
    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_null())
    }

    pub fn is_computed(&self, key: &str) -> bool {
        self.computed_keys
            .iter()
            .any(|k| k == key || key.starts_with(&format!("{}.", k)))
    }

    /// Return a copy with `key` set in both the raw and typed maps
    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        self.raw.insert(key.clone(), value.clone());
        self.config.insert(key, value);
        self
    }

    pub fn with_computed(mut self, key: impl Into<String>) -> Self {
        self.computed_keys.push(key.into());
        self
    }
}

fn lookup<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    let mut parts = key.split('.');
    let mut current = map.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Value::Object(inner) => inner.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}
