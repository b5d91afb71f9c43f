use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ─── Categories ───────────────────────────────────────────────────────────────

/// Classification tag for cleanable disk space
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupCategory {
    SystemCaches,
    UserCaches,
    Logs,
    Trash,
    Downloads,
    DeveloperCaches,
    BrowserData,
    ApplicationSupport,
}

impl CleanupCategory {
    /// Every category, in canonical scan order
    pub const ALL: [CleanupCategory; 8] = [
        CleanupCategory::SystemCaches,
        CleanupCategory::UserCaches,
        CleanupCategory::Logs,
        CleanupCategory::Trash,
        CleanupCategory::Downloads,
        CleanupCategory::DeveloperCaches,
        CleanupCategory::BrowserData,
        CleanupCategory::ApplicationSupport,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CleanupCategory::SystemCaches => "System Caches",
            CleanupCategory::UserCaches => "User Caches",
            CleanupCategory::Logs => "Log Files",
            CleanupCategory::Trash => "Trash",
            CleanupCategory::Downloads => "Downloads",
            CleanupCategory::DeveloperCaches => "Developer Caches",
            CleanupCategory::BrowserData => "Browser Data",
            CleanupCategory::ApplicationSupport => "Application Support",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CleanupCategory::SystemCaches => "System-wide cache files",
            CleanupCategory::UserCaches => "User application caches",
            CleanupCategory::Logs => "Application and system logs",
            CleanupCategory::Trash => "Deleted files in trash",
            CleanupCategory::Downloads => "Downloaded files",
            CleanupCategory::DeveloperCaches => "npm, cargo, gradle, Xcode caches",
            CleanupCategory::BrowserData => "Browser caches and site data",
            CleanupCategory::ApplicationSupport => "Leftover application support files",
        }
    }

    /// Stable CLI/serde identifier, e.g. `user_caches`
    pub fn slug(&self) -> &'static str {
        match self {
            CleanupCategory::SystemCaches => "system_caches",
            CleanupCategory::UserCaches => "user_caches",
            CleanupCategory::Logs => "logs",
            CleanupCategory::Trash => "trash",
            CleanupCategory::Downloads => "downloads",
            CleanupCategory::DeveloperCaches => "developer_caches",
            CleanupCategory::BrowserData => "browser_data",
            CleanupCategory::ApplicationSupport => "application_support",
        }
    }

    pub fn parse_slug(s: &str) -> Result<Self, String> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        CleanupCategory::ALL
            .iter()
            .find(|c| c.slug() == normalized)
            .copied()
            .ok_or_else(|| {
                let valid: Vec<&str> = CleanupCategory::ALL.iter().map(|c| c.slug()).collect();
                format!("unknown category '{}' (valid: {})", s, valid.join(", "))
            })
    }
}

impl std::fmt::Display for CleanupCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for CleanupCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CleanupCategory::parse_slug(s)
    }
}

// ─── Scan results ─────────────────────────────────────────────────────────────

/// One deletable entry found by a scan. Identity is the path; paths are
/// unique within a single scan pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanableItem {
    pub category: CleanupCategory,
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

// ─── Security threats ─────────────────────────────────────────────────────────

/// Threat severity drives remediation: low-severity threats may be removed
/// automatically, everything else is left for manual review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatSeverity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for ThreatSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThreatSeverity::Low => write!(f, "low"),
            ThreatSeverity::Medium => write!(f, "medium"),
            ThreatSeverity::High => write!(f, "high"),
        }
    }
}

/// Where a threat was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatKind {
    SuspiciousFile,
    LaunchAgent,
    LaunchDaemon,
    BrowserExtension,
    KernelExtension,
}

impl std::fmt::Display for ThreatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThreatKind::SuspiciousFile => write!(f, "Suspicious File"),
            ThreatKind::LaunchAgent => write!(f, "Launch Agent"),
            ThreatKind::LaunchDaemon => write!(f, "Launch Daemon"),
            ThreatKind::BrowserExtension => write!(f, "Browser Extension"),
            ThreatKind::KernelExtension => write!(f, "Kernel Extension"),
        }
    }
}

/// A single finding from a malware scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityThreat {
    /// Signature family name, e.g. "MacKeeper"
    pub name: String,
    pub kind: ThreatKind,
    pub severity: ThreatSeverity,
    pub path: PathBuf,
}

// ─── Deletion policy ──────────────────────────────────────────────────────────

/// Disposition of removed files; applies uniformly to every path in one
/// delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuarantinePolicy {
    /// Move into the recoverable quarantine area (default)
    Quarantine,
    /// Remove permanently, bypassing quarantine
    Purge,
}

impl std::fmt::Display for QuarantinePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuarantinePolicy::Quarantine => write!(f, "quarantine"),
            QuarantinePolicy::Purge => write!(f, "purge"),
        }
    }
}

// ─── Operation reports ────────────────────────────────────────────────────────

/// Immutable summary of one delete operation. `errors` may be non-empty
/// while `deleted_count > 0`: a partial cleanup is still a success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupReport {
    /// Paths actually removed
    pub deleted_count: usize,

    /// Bytes reclaimed, measured per successfully deleted path
    pub freed_bytes: u64,

    /// Quarantine session holding the removed files, when quarantined
    pub session_id: Option<String>,

    /// One human-readable entry per path that could not be removed
    pub errors: Vec<String>,
}

impl CleanupReport {
    /// Zero-valued report for a run that had nothing to clean
    pub fn empty() -> Self {
        Self {
            deleted_count: 0,
            freed_bytes: 0,
            session_id: None,
            errors: Vec::new(),
        }
    }
}

/// Summary of one memory-optimization pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryReport {
    pub used_before: u64,
    pub used_after: u64,
    /// Saturating difference; zero when the pass freed nothing
    pub freed: u64,
}

/// Combined outcome of a Smart Care run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareReport {
    /// Absent when the cleanup phase failed outright
    pub cleanup: Option<CleanupReport>,

    /// Absent when memory optimization was skipped or failed
    pub memory: Option<MemoryReport>,

    /// Threats left for manual review (never auto-removed, or removal failed)
    pub unresolved_threats: Vec<SecurityThreat>,

    /// Aggregated failure messages from all phases
    pub errors: Vec<String>,
}

impl CareReport {
    pub fn is_clean(&self) -> bool {
        self.unresolved_threats.is_empty() && self.errors.is_empty()
    }
}

// ─── System stats ─────────────────────────────────────────────────────────────

/// Point-in-time system snapshot from the privileged endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStats {
    pub cpu_usage: f32,
    pub memory_used: u64,
    pub memory_total: u64,
    pub disk_used: u64,
    pub disk_total: u64,
    pub sampled_at: DateTime<Utc>,
}

impl SystemStats {
    pub fn memory_percentage(&self) -> f64 {
        if self.memory_total == 0 {
            0.0
        } else {
            (self.memory_used as f64 / self.memory_total as f64) * 100.0
        }
    }

    pub fn disk_percentage(&self) -> f64 {
        if self.disk_total == 0 {
            0.0
        } else {
            (self.disk_used as f64 / self.disk_total as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_categories_have_unique_slugs() {
        let mut slugs: Vec<&str> = CleanupCategory::ALL.iter().map(|c| c.slug()).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), CleanupCategory::ALL.len());
    }

    #[test]
    fn parse_slug_roundtrip() {
        for cat in CleanupCategory::ALL {
            assert_eq!(CleanupCategory::parse_slug(cat.slug()), Ok(cat));
        }
    }

    #[test]
    fn parse_slug_accepts_dashes_and_case() {
        assert_eq!(
            CleanupCategory::parse_slug("User-Caches"),
            Ok(CleanupCategory::UserCaches)
        );
        assert_eq!(
            CleanupCategory::parse_slug(" trash "),
            Ok(CleanupCategory::Trash)
        );
    }

    #[test]
    fn parse_slug_rejects_unknown() {
        let err = CleanupCategory::parse_slug("junk").unwrap_err();
        assert!(err.contains("unknown category"));
        assert!(err.contains("user_caches"));
    }

    #[test]
    fn severity_ordering() {
        assert!(ThreatSeverity::Low < ThreatSeverity::Medium);
        assert!(ThreatSeverity::Medium < ThreatSeverity::High);
    }

    #[test]
    fn stats_percentages_handle_zero_totals() {
        let stats = SystemStats {
            cpu_usage: 0.0,
            memory_used: 0,
            memory_total: 0,
            disk_used: 0,
            disk_total: 0,
            sampled_at: Utc::now(),
        };
        assert_eq!(stats.memory_percentage(), 0.0);
        assert_eq!(stats.disk_percentage(), 0.0);
    }
}
