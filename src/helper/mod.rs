//! In-process implementation of the privileged channel.
//!
//! Everything destructive funnels through [`HelperEndpoint`]: enumeration,
//! deletion (with optional quarantine), memory reclaim, threat handling and
//! stats sampling. Blocking filesystem work runs on the blocking pool so the
//! channel methods stay honest async.

pub mod enumerate;
pub mod memory;
pub mod stats;
pub mod threats;

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::task::spawn_blocking;

use crate::channel::{ChannelError, PrivilegedChannel};
use crate::common::config::Config;
use crate::common::safety;
use crate::model::{
    CleanableItem, CleanupCategory, CleanupReport, MemoryReport, QuarantinePolicy, SecurityThreat,
    SystemStats,
};
use crate::quarantine::QuarantineStore;

pub struct HelperEndpoint {
    config: Config,
    store: QuarantineStore,
}

impl HelperEndpoint {
    pub fn new(config: Config) -> Self {
        Self {
            store: QuarantineStore::open_default(),
            config,
        }
    }

    /// Endpoint with an explicit quarantine store location
    pub fn with_store(config: Config, store: QuarantineStore) -> Self {
        Self { config, store }
    }
}

#[async_trait]
impl PrivilegedChannel for HelperEndpoint {
    async fn ping(&self) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn scan_cleanable_files(
        &self,
        categories: &[CleanupCategory],
    ) -> Result<Vec<CleanableItem>, ChannelError> {
        let config = self.config.clone();
        let categories = categories.to_vec();
        spawn_blocking(move || {
            let mut items = Vec::new();
            for category in categories {
                items.extend(enumerate::scan_category(&config, category)?);
            }
            tracing::debug!(items = items.len(), "scan finished");
            Ok(items)
        })
        .await
        .map_err(task_panic)?
    }

    async fn delete_files(
        &self,
        paths: &[PathBuf],
        policy: QuarantinePolicy,
    ) -> Result<CleanupReport, ChannelError> {
        let config = self.config.clone();
        let store = self.store.clone();
        let paths = paths.to_vec();
        tracing::info!(count = paths.len(), %policy, "delete requested");
        spawn_blocking(move || match policy {
            QuarantinePolicy::Quarantine => quarantine_paths(&config, &store, &paths),
            QuarantinePolicy::Purge => purge_paths(&paths),
        })
        .await
        .map_err(task_panic)?
    }

    async fn optimize_memory(&self) -> Result<MemoryReport, ChannelError> {
        spawn_blocking(memory::optimize).await.map_err(task_panic)?
    }

    async fn scan_for_malware(&self) -> Result<Vec<SecurityThreat>, ChannelError> {
        spawn_blocking(threats::scan).await.map_err(task_panic)?
    }

    async fn remove_threat(&self, threat: &SecurityThreat) -> Result<(), ChannelError> {
        let threat = threat.clone();
        spawn_blocking(move || threats::remove(&threat))
            .await
            .map_err(task_panic)?
    }

    async fn system_stats(&self) -> Result<SystemStats, ChannelError> {
        spawn_blocking(|| Ok(stats::sample())).await.map_err(task_panic)?
    }
}

fn task_panic(e: tokio::task::JoinError) -> ChannelError {
    ChannelError::Internal(format!("helper task panicked: {e}"))
}

// ─── Deletion ─────────────────────────────────────────────────────────────────

/// Move each path into a fresh quarantine session. Per-path failures land
/// in the report; only a session that cannot be opened fails the call.
fn quarantine_paths(
    config: &Config,
    store: &QuarantineStore,
    paths: &[PathBuf],
) -> Result<CleanupReport, ChannelError> {
    let mut report = CleanupReport::empty();
    let mut session = store
        .begin_session(config.quarantine_retention_days)
        .map_err(|e| ChannelError::Internal(format!("could not open quarantine session: {e:#}")))?;

    for path in paths {
        if safety::is_protected(path) {
            report
                .errors
                .push(format!("Refusing to delete protected path: {}", path.display()));
            continue;
        }
        if !path.exists() {
            // already gone, nothing to do
            continue;
        }
        let size = enumerate::dir_size(path);
        match session.stage(path, size) {
            Ok(()) => {
                report.deleted_count += 1;
                report.freed_bytes += size;
            }
            Err(e) => report
                .errors
                .push(format!("Failed to remove '{}': {e:#}", path.display())),
        }
    }

    match session.finish() {
        Ok(id) => report.session_id = id,
        Err(e) => report
            .errors
            .push(format!("Quarantine manifest not saved: {e:#}")),
    }
    Ok(report)
}

/// Delete each path permanently, no staging
fn purge_paths(paths: &[PathBuf]) -> Result<CleanupReport, ChannelError> {
    let mut report = CleanupReport::empty();

    for path in paths {
        if safety::is_protected(path) {
            report
                .errors
                .push(format!("Refusing to delete protected path: {}", path.display()));
            continue;
        }
        if !path.exists() {
            continue;
        }
        let size = enumerate::dir_size(path);
        let removed = if path.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        };
        match removed {
            Ok(()) => {
                report.deleted_count += 1;
                report.freed_bytes += size;
            }
            Err(e) => report
                .errors
                .push(format!("Failed to remove '{}': {e}", path.display())),
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn endpoint(tmp: &TempDir) -> HelperEndpoint {
        let store = QuarantineStore::new(
            tmp.path().join("quarantine"),
            tmp.path().join("logs"),
        );
        HelperEndpoint::with_store(Config::default(), store)
    }

    #[tokio::test]
    async fn delete_skips_missing_paths() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("gone.txt");

        let report = endpoint(&tmp)
            .delete_files(&[target], QuarantinePolicy::Purge)
            .await
            .unwrap();

        assert_eq!(report.deleted_count, 0);
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn delete_refuses_protected_paths() {
        let tmp = TempDir::new().unwrap();

        let report = endpoint(&tmp)
            .delete_files(&[PathBuf::from("/etc")], QuarantinePolicy::Purge)
            .await
            .unwrap();

        assert_eq!(report.deleted_count, 0);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("protected"));
    }

    #[tokio::test]
    async fn quarantine_delete_stages_and_reports() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("junk.log");
        fs::write(&target, vec![0u8; 2048]).unwrap();

        let report = endpoint(&tmp)
            .delete_files(&[target.clone()], QuarantinePolicy::Quarantine)
            .await
            .unwrap();

        assert_eq!(report.deleted_count, 1);
        assert!(report.freed_bytes > 0);
        assert!(report.session_id.is_some());
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn mixed_outcome_keeps_successes() {
        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("good.tmp");
        fs::write(&good, b"x").unwrap();

        let report = endpoint(&tmp)
            .delete_files(
                &[good.clone(), PathBuf::from("/usr")],
                QuarantinePolicy::Purge,
            )
            .await
            .unwrap();

        assert_eq!(report.deleted_count, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(!good.exists());
    }
}
