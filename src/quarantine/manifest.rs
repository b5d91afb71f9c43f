use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Record of one quarantine session: everything staged by one delete call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarantineManifest {
    /// Timestamp-based session identifier
    pub session_id: String,

    /// When the delete ran
    pub timestamp: DateTime<Utc>,

    /// Bytes successfully staged
    pub total_bytes: u64,

    /// Paths successfully staged
    pub total_files: usize,

    /// When the session may be purged
    pub expires_at: Option<DateTime<Utc>>,

    /// Whether this session has been restored via undo
    pub restored: bool,

    /// One entry per requested path, success or not
    pub entries: Vec<QuarantineEntry>,

    /// Staging failures, one message per failed path
    pub errors: Vec<String>,
}

/// A single staged path within a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarantineEntry {
    /// Where the path lived before the delete
    pub original_path: PathBuf,

    /// Location inside the session's files directory, when staging worked
    pub staged_path: Option<PathBuf>,

    pub size_bytes: u64,
    pub is_dir: bool,
    pub success: bool,
    pub error: Option<String>,
}

impl QuarantineManifest {
    pub fn new(retention_days: u32) -> Self {
        let now = Utc::now();
        Self {
            session_id: now.format("%Y-%m-%dT%H-%M-%S").to_string(),
            timestamp: now,
            total_bytes: 0,
            total_files: 0,
            expires_at: Some(now + Duration::days(retention_days as i64)),
            restored: false,
            entries: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Record an entry; only successful ones count toward the totals
    pub fn add_entry(&mut self, entry: QuarantineEntry) {
        if entry.success {
            self.total_bytes += entry.size_bytes;
            self.total_files += 1;
        }
        self.entries.push(entry);
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() > at)
    }

    /// Write `manifest.json` into the session directory and append the
    /// session to the daily JSONL activity log
    pub fn save(&self, session_dir: &Path, logs_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(session_dir)
            .with_context(|| format!("Failed to create session dir: {}", session_dir.display()))?;

        let manifest_path = session_dir.join("manifest.json");
        let json = serde_json::to_string_pretty(self).context("Failed to serialize manifest")?;
        std::fs::write(&manifest_path, &json)
            .with_context(|| format!("Failed to write manifest: {}", manifest_path.display()))?;

        std::fs::create_dir_all(logs_dir)
            .with_context(|| format!("Failed to create logs dir: {}", logs_dir.display()))?;
        let log_path = logs_dir.join(format!(
            "sessions-{}.jsonl",
            self.timestamp.format("%Y-%m-%d")
        ));
        let log_entry = serde_json::to_string(self).context("Failed to serialize log entry")?;

        use std::io::Write;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open log: {}", log_path.display()))?;
        writeln!(file, "{}", log_entry)?;

        Ok(())
    }

    pub fn load(session_dir: &Path) -> Result<Self> {
        let manifest_path = session_dir.join("manifest.json");
        if !manifest_path.exists() {
            anyhow::bail!("No manifest in {}", session_dir.display());
        }

        let contents = std::fs::read_to_string(&manifest_path)
            .with_context(|| format!("Failed to read manifest: {}", manifest_path.display()))?;
        let manifest: QuarantineManifest = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse manifest: {}", manifest_path.display()))?;
        Ok(manifest)
    }
}

/// Listing line for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub total_bytes: u64,
    pub total_files: usize,
    /// Bytes the session currently occupies on disk
    pub staged_size: u64,
    pub expires_at: Option<DateTime<Utc>>,
    pub restored: bool,
    pub is_expired: bool,
}
