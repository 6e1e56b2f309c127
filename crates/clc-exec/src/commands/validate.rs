use clc_exec::ClcExecProvisioner;
use clc_exec_host::ResourceProvisioner;
use colored::Colorize;
use std::path::Path;

pub fn handle(config_path: &Path) -> anyhow::Result<()> {
    println!("{}", "Validating configuration...".blue());

    let config = super::load_resource_config(config_path)?;
    let provisioner = ClcExecProvisioner::from_env();
    let (warnings, errors) = provisioner.validate(&config);

    for warning in &warnings {
        println!("{} {}", "warning:".yellow().bold(), warning);
    }

    if !errors.is_empty() {
        eprintln!();
        eprintln!("{}", "✗ Configuration errors".red().bold());
        for error in &errors {
            eprintln!("  {}", error);
        }
        std::process::exit(1);
    }

    println!("{}", "✓ Configuration is valid".green().bold());
    Ok(())
}
