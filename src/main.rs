//! etcd key space backup/restore tool
//!
//! Dumps the v2 key tree of an etcd cluster to a JSON file and replays such
//! a file against a (possibly different) cluster.

// etcd-dump/src/main.rs
mod batch;
mod config;
mod dump;
mod errors;
mod etcd;
mod restore;
mod tree;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::{AppConfig, GlobalArgs, Operation, OperationConfig};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Parser)]
#[command(
    name = "etcd-dump",
    version,
    about = "Dump and restore the key space of an etcd cluster",
    arg_required_else_help = true
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Dump keys to backup file
    Dump,
    /// Restore keys from backup file
    Restore,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("etcd_dump=warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Main entry point for the dump/restore tool
#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run_app(cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_app(cli: Cli) -> Result<()> {
    let operation = match cli.command {
        Commands::Dump => Operation::Dump,
        Commands::Restore => Operation::Restore {
            concurrency: cli.global.concurrency,
        },
    };
    let app_config = AppConfig::resolve(&cli.global, operation)?;

    match &app_config.operation {
        OperationConfig::Dump(_) => dump::run_dump_flow(&app_config).await,
        OperationConfig::Restore(_) => restore::run_restore_flow(&app_config).await,
    }
}
