// etcd-dump/src/restore/logic.rs
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::batch::{BoundedBatch, Dispatch};
use crate::config::{EtcdConfig, RestoreConfig};
use crate::errors::AppError;
use crate::etcd::{EtcdClient, WriteRequest};
use crate::tree::{BackupDocument, FlatEntry, TreeNode, normalize};

/// Reads and parses a backup file written by the dump flow.
pub(crate) async fn read_backup(path: &Path) -> crate::errors::Result<TreeNode> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::filesystem(path, e))?;
    let document: BackupDocument =
        serde_json::from_str(&raw).map_err(|source| AppError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(document.into_root())
}

fn progress_line(entry: &FlatEntry, outstanding: usize) -> String {
    match entry {
        FlatEntry::Key { key, value } => {
            format!("{} -> {} ({} requests left)", key, value, outstanding)
        }
        FlatEntry::Dir { key } => format!("{} -> DIR ({} requests left)", key, outstanding),
    }
}

/// Replays every leaf of the backup against the store, at most
/// `concurrency` writes at a time. Stops at the first failed write.
///
/// Returns the number of entries written.
pub(super) async fn perform_restore(etcd: &EtcdConfig, restore: &RestoreConfig) -> Result<usize> {
    let root = read_backup(&restore.file)
        .await
        .context("Failed to load backup file")?;
    let entries = normalize(&root);
    info!(
        file = %restore.file.display(),
        entries = entries.len(),
        concurrency = restore.concurrency.get(),
        "restoring backup"
    );

    let client = EtcdClient::new(etcd)?;
    let batch = BoundedBatch::new(restore.concurrency);

    let operations = entries.iter().map(|entry| {
        let client = &client;
        move |dispatch: Dispatch| {
            debug!(index = dispatch.index, total = dispatch.total, key = entry.key(), "dispatching write");
            println!("{}", progress_line(entry, dispatch.outstanding));
            let request = WriteRequest::for_entry(client.base_url(), entry);
            async move { client.put(request?).await }
        }
    });

    let written = batch.run(operations).await.map_err(|failure| {
        let key = entries[failure.index].key().to_string();
        anyhow::Error::new(failure.source).context(format!("Failed to restore key {}", key))
    })?;

    Ok(written.len())
}
