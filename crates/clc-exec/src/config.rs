//! Provisioner configuration decoding
//!
//! Decoding is strict about keys and loose about types: unknown keys are
//! rejected, while numbers and booleans are accepted wherever a string is
//! expected.

use crate::env::{EnvReader, merge_env_overrides};
use crate::error::{ProvisionError, Result};
use clc_exec_host::ResourceConfig;
use clc_exec_sdk::{Credentials, Package};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

pub const PROVISIONER_NAME: &str = "clc_exec";

const KNOWN_KEYS: [&str; 5] = ["username", "password", "account", "package", "parameters"];

/// Decoded `clc_exec` configuration
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProvisionerConfig {
    #[serde(deserialize_with = "weak::string")]
    pub username: String,

    #[serde(deserialize_with = "weak::string")]
    pub password: String,

    /// Account alias
    #[serde(deserialize_with = "weak::string")]
    pub account: String,

    /// Package id to execute
    #[serde(deserialize_with = "weak::string")]
    pub package: String,

    #[serde(default, deserialize_with = "weak::string_map")]
    pub parameters: HashMap<String, String>,
}

impl ProvisionerConfig {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.username, &self.password, &self.account)
    }

    pub fn package_request(&self) -> Package {
        Package::new(&self.package).with_parameters(self.parameters.clone())
    }

    fn check_required(&self) -> Result<()> {
        let fields = [
            ("username", &self.username),
            ("password", &self.password),
            ("account", &self.account),
            ("package", &self.package),
        ];
        match fields.into_iter().find(|(_, value)| value.is_empty()) {
            Some((name, _)) => Err(ProvisionError::EmptyField(name)),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for ProvisionerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisionerConfig")
            .field("username", &self.username)
            .field("password", &"********")
            .field("account", &self.account)
            .field("package", &self.package)
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Merge raw and typed values, apply the env fallback, and decode
pub fn decode_config(config: &ResourceConfig, env: &dyn EnvReader) -> Result<ProvisionerConfig> {
    let merged = merge_env_overrides(config, env).merged();

    let mut unknown: Vec<String> = merged
        .keys()
        .filter(|k| !KNOWN_KEYS.contains(&k.as_str()))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        unknown.sort();
        return Err(ProvisionError::UnknownKeys(unknown));
    }

    let decoded: ProvisionerConfig = serde_json::from_value(Value::Object(merged))
        .map_err(|e| ProvisionError::Decode(e.to_string()))?;
    decoded.check_required()?;

    tracing::debug!("Decoded configuration: {:?}", decoded);
    Ok(decoded)
}

/// Weakly typed deserializers
mod weak {
    use serde::de::{Deserializer, Error};
    use serde::Deserialize;
    use serde_json::Value;
    use std::collections::HashMap;

    pub(super) fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        coerce(&value)
            .ok_or_else(|| D::Error::custom(format!("expected a string, got {}", kind(&value))))
    }

    pub(super) fn string_map<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let maps = match &value {
            Value::Null => return Ok(HashMap::new()),
            Value::Object(map) => vec![map],
            // Map blocks are commonly encoded as a list of maps
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_object().ok_or_else(|| {
                        D::Error::custom(format!("expected a list of maps, found {}", kind(item)))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            other => {
                return Err(D::Error::custom(format!("expected a map, got {}", kind(other))));
            }
        };

        let mut result = HashMap::new();
        for (key, v) in maps.into_iter().flatten() {
            let s = coerce(v).ok_or_else(|| {
                D::Error::custom(format!("parameter '{}': expected a string, got {}", key, kind(v)))
            })?;
            result.insert(key.clone(), s);
        }
        Ok(result)
    }

    fn coerce(value: &Value) -> Option<String> {
        match value {
            Value::Null => Some(String::new()),
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(true) => Some("1".to_string()),
            Value::Bool(false) => Some("0".to_string()),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    fn kind(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "list",
            Value::Object(_) => "map",
        }
    }
}
