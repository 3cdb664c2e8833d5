mod logic;

use anyhow::Result;
use crate::config::AppConfig;

/// Public entry point for the dump process.
pub async fn run_dump_flow(app_config: &AppConfig) -> Result<()> {
    let dump_config = match &app_config.operation {
        crate::config::OperationConfig::Dump(cfg) => cfg,
        _ => anyhow::bail!("Dump operation selected but no dump configuration found."),
    };

    logic::perform_dump(&app_config.etcd, dump_config).await?;
    Ok(())
}
