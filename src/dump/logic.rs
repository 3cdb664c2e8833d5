// etcd-dump/src/dump/logic.rs
use anyhow::{Context, Result};
use tracing::info;

use crate::config::{DumpConfig, EtcdConfig};
use crate::errors::AppError;
use crate::etcd::EtcdClient;

/// Fetches the full key tree and writes the listing, pretty printed, to the
/// backup file. The listing is stored as returned; nothing is flattened.
///
/// Returns the number of bytes written.
pub(super) async fn perform_dump(etcd: &EtcdConfig, dump: &DumpConfig) -> Result<usize> {
    let client = EtcdClient::new(etcd)?;
    println!("📥 Fetching key tree from {}", client.base_url());

    let tree = client
        .fetch_tree()
        .await
        .with_context(|| format!("Failed to fetch key tree from {}", client.base_url()))?;

    let data = serde_json::to_string_pretty(&tree).context("Failed to serialize key tree")?;

    tokio::fs::write(&dump.file, &data)
        .await
        .map_err(|e| AppError::filesystem(&dump.file, e))
        .context("Failed to write backup file")?;

    info!(path = %dump.file.display(), bytes = data.len(), "backup written");
    println!(
        "✅ Dumped key tree to {} ({} bytes)",
        dump.file.display(),
        data.len()
    );
    Ok(data.len())
}
