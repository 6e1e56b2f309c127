//! Environment fallback for credentials

use clc_exec_host::ResourceConfig;
use serde_json::Value;
use std::collections::HashMap;

/// Environment variables that can supply a configuration key
pub const ENV_OVERRIDES: [(&str, &str); 3] = [
    ("CLC_USERNAME", "username"),
    ("CLC_PASSWORD", "password"),
    ("CLC_ACCOUNT", "account"),
];

/// Endpoint override for the CLC API
pub const BASE_URL_ENV: &str = "CLC_BASE_URL";

/// Read access to environment variables
pub trait EnvReader: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// The process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl EnvReader for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvReader for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Fill credentials missing from `config` with values from `env`
///
/// A key is filled when it is absent, null or an empty string and the
/// variable is set to a non-empty value. The value is written to both the
/// raw and typed maps of the returned copy; `config` is left untouched.
pub fn merge_env_overrides(config: &ResourceConfig, env: &dyn EnvReader) -> ResourceConfig {
    let mut merged = config.clone();

    for (var, key) in ENV_OVERRIDES {
        let Some(value) = env.var(var).filter(|v| !v.is_empty()) else {
            continue;
        };
        if is_present(config, key) {
            tracing::debug!("Ignoring {}: '{}' is already configured", var, key);
            continue;
        }

        tracing::debug!("Using {} for '{}'", var, key);
        merged = merged.with_value(key, Value::String(value));
    }

    merged
}

fn is_present(config: &ResourceConfig, key: &str) -> bool {
    match config.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}
