//! Prefix-to-directory sync
//!
//! Mirrors every object under a prefix into a local directory. Objects whose
//! local copy already has the same size are left alone, and keys that would
//! resolve outside the directory are skipped.

use std::path::{Component, Path, PathBuf};

use crate::error::Result;
use crate::path::StorageUrl;
use crate::traits::{ObjectStore, SyncSummary};

/// Download everything under `prefix` into `local_dir`
pub async fn sync_prefix<S>(store: &S, prefix: &StorageUrl, local_dir: &Path) -> Result<SyncSummary>
where
    S: ObjectStore + ?Sized,
{
    tokio::fs::create_dir_all(local_dir).await?;

    let mut summary = SyncSummary::default();
    for item in store.list(prefix, true).await? {
        if item.is_dir || item.key.ends_with('/') {
            continue;
        }

        let Some(target) = local_target(local_dir, prefix, &item.key) else {
            tracing::warn!(key = %item.key, "Skipping object with unsafe key");
            continue;
        };

        let size = item.size_bytes.unwrap_or(0).max(0) as u64;
        if is_up_to_date(&target, size).await {
            tracing::debug!(key = %item.key, "Already present, skipping");
            summary.skipped += 1;
            continue;
        }

        let object = StorageUrl::new(prefix.bucket.clone(), item.key.clone());
        let written = store.download(&object, &target).await?;
        tracing::info!(key = %item.key, bytes = written, "Downloaded");
        summary.downloaded += 1;
        summary.bytes += written;
    }

    Ok(summary)
}

/// Local destination for an object key under a synced prefix
///
/// Returns None for keys outside the prefix or containing `.`/`..`
/// components, so a listing can never write outside `local_dir`.
pub fn local_target(local_dir: &Path, prefix: &StorageUrl, key: &str) -> Option<PathBuf> {
    let relative = prefix.relative_key(key)?;
    let relative = Path::new(relative.trim_start_matches('/'));
    if relative.as_os_str().is_empty() {
        return None;
    }
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(local_dir.join(relative))
}

async fn is_up_to_date(target: &Path, size: u64) -> bool {
    match tokio::fs::metadata(target).await {
        Ok(meta) => meta.is_file() && meta.len() == size,
        Err(_) => false,
    }
}
