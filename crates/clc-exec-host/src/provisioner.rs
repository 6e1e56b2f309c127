//! Resource provisioner trait definition

use crate::config::ResourceConfig;
use crate::error::ValidationError;
use crate::output::UiOutput;
use crate::state::InstanceState;
use async_trait::async_trait;

/// Resource provisioner abstraction trait
///
/// A provisioner runs once against a freshly created resource. The host
/// validates the configuration first and only calls `apply` for configs that
/// produced no errors.
#[async_trait]
pub trait ResourceProvisioner: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the provisioner name as used in configuration (e.g., "clc_exec")
    fn name(&self) -> &str;

    /// Check a configuration, returning warnings and errors
    fn validate(&self, config: &ResourceConfig) -> (Vec<String>, Vec<ValidationError>);

    /// Run the provisioner to completion against `state`
    async fn apply(
        &self,
        output: &dyn UiOutput,
        state: &InstanceState,
        config: &ResourceConfig,
    ) -> Result<(), Self::Error>;
}
