mod logic;

use anyhow::Result;
use crate::config::AppConfig;

/// Public entry point for the restore process.
pub async fn run_restore_flow(app_config: &AppConfig) -> Result<()> {
    let restore_config = match &app_config.operation {
        crate::config::OperationConfig::Restore(cfg) => cfg,
        _ => anyhow::bail!("Restore operation selected but no restore configuration found."),
    };

    let restored = logic::perform_restore(&app_config.etcd, restore_config).await?;
    println!("✅ Dump restored ({} keys)", restored);
    Ok(())
}
