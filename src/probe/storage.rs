//! Storage estimate probe (eager).

use crate::signal::SignalResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use sysinfo::Disks;

/// Estimate of the disk backing the data directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageEstimate {
    pub mount_point: String,
    pub total_bytes: u64,
    pub available_bytes: u64,
    pub used_bytes: u64,
}

/// Collect the storage estimate for the default data location.
pub async fn probe() -> SignalResult<StorageEstimate> {
    let path = dirs::data_local_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
    probe_at(&path).await
}

/// Collect the storage estimate for the disk containing `path`.
pub async fn probe_at(path: &Path) -> SignalResult<StorageEstimate> {
    // The path itself may not exist yet; estimate against its closest
    // existing ancestor.
    let mut target = path.to_path_buf();
    while !target.exists() {
        match target.parent() {
            Some(parent) => target = parent.to_path_buf(),
            None => break,
        }
    }
    let target = target.canonicalize().unwrap_or(target);

    let disks = Disks::new_with_refreshed_list();
    let best = disks
        .list()
        .iter()
        .filter(|disk| target.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len());

    match best {
        Some(disk) => {
            let total = disk.total_space();
            let available = disk.available_space();
            SignalResult::collected(StorageEstimate {
                mount_point: disk.mount_point().to_string_lossy().to_string(),
                total_bytes: total,
                available_bytes: available,
                used_bytes: total.saturating_sub(available),
            })
        }
        None => SignalResult::unsupported_with("no disk information for data path"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_storage_probe_shape() {
        // Either this host exposes disk information or it does not; both
        // are legal outcomes, but a collected estimate must be coherent.
        let result = probe_at(Path::new("/")).await;
        match result {
            SignalResult::Collected { value } => {
                assert!(value.total_bytes >= value.available_bytes);
                assert_eq!(
                    value.used_bytes,
                    value.total_bytes - value.available_bytes
                );
                assert!(!value.mount_point.is_empty());
            }
            SignalResult::Unsupported { .. } => {}
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
