//! Key-level validation of resource configuration
//!
//! Keys are declared as required or optional. A trailing `.*` declares a map
//! whose entries are free-form string values, e.g. `parameters.*`.

use crate::config::{ResourceConfig, type_name};
use crate::error::ValidationError;
use serde_json::Value;

/// Declarative validator over the top-level keys of a resource config
#[derive(Debug, Clone, Default)]
pub struct Validator {
    pub required: Vec<String>,
    pub optional: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn optional<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Validate `config`, returning warnings and errors
    pub fn validate(&self, config: &ResourceConfig) -> (Vec<String>, Vec<ValidationError>) {
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        for key in &self.required {
            let (name, _) = split_key(key);
            if config.is_computed(name) {
                continue;
            }
            if !config.is_set(name) {
                errors.push(ValidationError::new(name, "required field is not set"));
            } else if config.get(name).and_then(Value::as_str) == Some("") {
                errors.push(ValidationError::new(name, "required field is empty"));
            }
        }

        for (key, value) in config.merged() {
            if value.is_null() {
                continue;
            }
            match self.lookup(&key) {
                None => errors.push(ValidationError::new(&key, "invalid or unknown key")),
                Some(true) => check_map(&key, &value, &mut warnings, &mut errors),
                Some(false) => check_scalar(&key, &value, &mut errors),
            }
        }

        tracing::debug!(
            warnings = warnings.len(),
            errors = errors.len(),
            "validated resource config"
        );
        (warnings, errors)
    }

    /// Find the declaration for a top-level key; `Some(true)` for map keys
    fn lookup(&self, key: &str) -> Option<bool> {
        self.required
            .iter()
            .chain(&self.optional)
            .map(|k| split_key(k))
            .find(|(name, _)| *name == key)
            .map(|(_, is_map)| is_map)
    }
}

fn split_key(key: &str) -> (&str, bool) {
    match key.strip_suffix(".*") {
        Some(name) => (name, true),
        None => (key, false),
    }
}

fn check_scalar(key: &str, value: &Value, errors: &mut Vec<ValidationError>) {
    if matches!(value, Value::Array(_) | Value::Object(_)) {
        errors.push(ValidationError::new(
            key,
            format!("expected a string, got {}", type_name(value)),
        ));
    }
}

fn check_map(
    key: &str,
    value: &Value,
    warnings: &mut Vec<String>,
    errors: &mut Vec<ValidationError>,
) {
    let maps: Vec<_> = match value {
        Value::Object(map) => vec![map],
        Value::Array(items) if items.iter().all(Value::is_object) => {
            items.iter().filter_map(Value::as_object).collect()
        }
        other => {
            errors.push(ValidationError::new(
                key,
                format!("expected a map, got {}", type_name(other)),
            ));
            return;
        }
    };

    for (entry, v) in maps.into_iter().flatten() {
        let path = format!("{}.{}", key, entry);
        match v {
            Value::String(_) | Value::Null => {}
            Value::Bool(_) | Value::Number(_) => {
                warnings.push(format!(
                    "{}: {} value will be converted to a string",
                    path,
                    type_name(v)
                ));
            }
            other => errors.push(ValidationError::new(
                path,
                format!("expected a string, got {}", type_name(other)),
            )),
        }
    }
}
