mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "clc-exec")]
#[command(about = "Execute a CenturyLink Cloud package on a server and wait for it to finish", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a provisioner configuration file
    Validate {
        /// Resource configuration (JSON or YAML)
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Execute the configured package on a server
    Apply {
        /// Resource configuration (JSON or YAML)
        #[arg(short, long)]
        config: PathBuf,
        /// Target server id
        #[arg(short, long, env = "CLC_SERVER_ID")]
        server_id: String,
        /// Seconds between status reads
        #[arg(long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
        poll_interval: u64,
        /// Seconds before a single API request is abandoned
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        request_timeout: Option<u64>,
        /// Give up waiting for the operation after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so progress output stays readable
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Validate { config } => commands::validate::handle(&config),
        Commands::Apply {
            config,
            server_id,
            poll_interval,
            request_timeout,
            timeout,
        } => {
            let options = commands::apply::ApplyOptions {
                poll_interval,
                request_timeout,
                timeout,
            };
            commands::apply::handle(&config, &server_id, &options).await
        }
        Commands::Version => {
            println!("clc-exec {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
