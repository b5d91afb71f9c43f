//! The privileged operation channel: the sole conduit through which
//! destructive or elevated operations are requested. The core depends on
//! this contract, never on a transport; authentication lives on the far
//! side of the boundary.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::{
    CleanableItem, CleanupCategory, CleanupReport, MemoryReport, QuarantinePolicy, SecurityThreat,
    SystemStats,
};

/// Failure crossing the privileged boundary
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("privileged endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("not authorized for privileged operations")]
    NotAuthorized,

    #[error("enumerating {category} failed: {message}")]
    Enumeration {
        category: CleanupCategory,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Internal(String),
}

/// Contract for the privileged endpoint. Every method is one logical
/// request/response; the caller never assumes ordering or atomicity across
/// two separate calls. A scan result may be stale by the time a delete
/// runs; the endpoint is the sole source of truth for what exists.
#[async_trait::async_trait]
pub trait PrivilegedChannel: Send + Sync {
    /// Liveness check, no side effects
    async fn ping(&self) -> Result<(), ChannelError>;

    /// Enumerate cleanable items for the requested categories. Fails
    /// wholesale if any requested category's enumerator errors; one call
    /// never yields partial results.
    async fn scan_cleanable_files(
        &self,
        categories: &[CleanupCategory],
    ) -> Result<Vec<CleanableItem>, ChannelError>;

    /// Delete exactly the given paths, under one policy for all of them.
    /// Paths that cannot be removed are reported in the result's `errors`,
    /// never silently dropped. Already-absent paths are not failures, so
    /// the call is safe to retry.
    async fn delete_files(
        &self,
        paths: &[PathBuf],
        policy: QuarantinePolicy,
    ) -> Result<CleanupReport, ChannelError>;

    /// Reclaim inactive memory. Fails independently of cleanup.
    async fn optimize_memory(&self) -> Result<MemoryReport, ChannelError>;

    /// Scan known locations against the threat signature table.
    async fn scan_for_malware(&self) -> Result<Vec<SecurityThreat>, ChannelError>;

    /// Remove one previously reported threat. Per-threat, independently
    /// fallible.
    async fn remove_threat(&self, threat: &SecurityThreat) -> Result<(), ChannelError>;

    /// Point-in-time system snapshot; display-only, never gates deletes.
    async fn system_stats(&self) -> Result<SystemStats, ChannelError>;
}
