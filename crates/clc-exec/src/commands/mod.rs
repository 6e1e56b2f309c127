pub mod apply;
pub mod validate;

use anyhow::Context;
use clc_exec_host::ResourceConfig;
use std::path::Path;

/// Load a resource configuration from a JSON or YAML file
pub fn load_resource_config(path: &Path) -> anyhow::Result<ResourceConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let value: serde_json::Value = if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse {} as YAML", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {} as JSON", path.display()))?
    };

    ResourceConfig::from_value(value)
        .with_context(|| format!("invalid config in {}", path.display()))
}
