use clc_exec::ClcExecProvisioner;
use clc_exec_host::{InstanceState, ResourceProvisioner, UiOutput};
use clc_exec_sdk::{HttpConnector, PollConfig};
use colored::Colorize;
use std::path::Path;
use std::time::Duration;

/// Prints provisioner progress to stdout
struct ConsoleOutput;

impl UiOutput for ConsoleOutput {
    fn output(&self, message: &str) {
        println!("{} {}", "clc_exec:".cyan(), message);
    }
}

/// Timing knobs for `apply`, all in seconds
pub struct ApplyOptions {
    pub poll_interval: u64,
    pub request_timeout: Option<u64>,
    pub timeout: Option<u64>,
}

pub async fn handle(
    config_path: &Path,
    server_id: &str,
    options: &ApplyOptions,
) -> anyhow::Result<()> {
    let config = super::load_resource_config(config_path)?;

    let poll_config =
        PollConfig::default().with_interval(Duration::from_secs(options.poll_interval));
    let mut connector = HttpConnector::new().with_poll_config(poll_config);
    if let Some(secs) = options.request_timeout {
        connector = connector.with_request_timeout(Duration::from_secs(secs));
    }

    let mut provisioner = ClcExecProvisioner::http(connector);
    if let Some(secs) = options.timeout {
        provisioner = provisioner.with_poll_timeout(Duration::from_secs(secs));
    }

    let (warnings, errors) = provisioner.validate(&config);
    for warning in &warnings {
        println!("{} {}", "warning:".yellow().bold(), warning);
    }
    if !errors.is_empty() {
        eprintln!("{}", "✗ Configuration errors".red().bold());
        for error in &errors {
            eprintln!("  {}", error);
        }
        std::process::exit(1);
    }

    let state = InstanceState::new(server_id);
    if let Err(e) = provisioner.apply(&ConsoleOutput, &state, &config).await {
        eprintln!("{} {}", "✗".red().bold(), e);
        std::process::exit(1);
    }

    println!("{}", "✓ Done".green().bold());
    Ok(())
}
