use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::manifest::{QuarantineEntry, QuarantineManifest, SessionSummary};
use crate::common::config::Config;
use crate::helper::enumerate::dir_size;

/// The recoverable holding area. One directory per session, each holding a
/// `manifest.json` and the staged files under numeric names.
#[derive(Debug, Clone)]
pub struct QuarantineStore {
    root: PathBuf,
    logs_dir: PathBuf,
}

impl QuarantineStore {
    pub fn new(root: PathBuf, logs_dir: PathBuf) -> Self {
        Self { root, logs_dir }
    }

    /// Store at the configured default location (~/.maccare/quarantine)
    pub fn open_default() -> Self {
        Self::new(Config::quarantine_dir(), Config::logs_dir())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn session_dir(&self, session_id: &str) -> PathBuf {
        self.root.join(session_id)
    }

    /// Open a fresh session for one delete call
    pub fn begin_session(&self, retention_days: u32) -> Result<QuarantineSession> {
        let manifest = QuarantineManifest::new(retention_days);
        let session_dir = self.session_dir(&manifest.session_id);
        let files_dir = session_dir.join("files");
        std::fs::create_dir_all(&files_dir)
            .with_context(|| format!("Failed to create session dir: {}", files_dir.display()))?;

        Ok(QuarantineSession {
            manifest,
            session_dir,
            files_dir,
            logs_dir: self.logs_dir.clone(),
            counter: 0,
        })
    }

    /// All sessions, most recent first
    pub fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut sessions = Vec::new();
        for entry in std::fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read quarantine dir: {}", self.root.display()))?
        {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            let Ok(manifest) = QuarantineManifest::load(&path) else {
                continue;
            };
            sessions.push(SessionSummary {
                staged_size: dir_size(&path),
                is_expired: manifest.is_expired(),
                session_id: manifest.session_id,
                timestamp: manifest.timestamp,
                total_bytes: manifest.total_bytes,
                total_files: manifest.total_files,
                expires_at: manifest.expires_at,
                restored: manifest.restored,
            });
        }

        sessions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(sessions)
    }

    pub fn most_recent_session(&self) -> Result<Option<String>> {
        let sessions = self.list_sessions()?;
        Ok(sessions
            .into_iter()
            .find(|s| !s.restored)
            .map(|s| s.session_id))
    }

    /// Move a session's files back to their original locations. Refuses to
    /// overwrite paths that exist again, and refuses a second restore.
    pub fn restore_session(&self, session_id: &str) -> Result<RestoreReport> {
        let session_dir = self.session_dir(session_id);
        if !session_dir.exists() {
            anyhow::bail!("Session '{}' not found", session_id);
        }
        let mut manifest = QuarantineManifest::load(&session_dir)?;

        if manifest.restored {
            anyhow::bail!("Session '{}' has already been restored", session_id);
        }

        let restorable: Vec<QuarantineEntry> = manifest
            .entries
            .iter()
            .filter(|e| e.success && e.staged_path.is_some())
            .cloned()
            .collect();
        if restorable.is_empty() {
            anyhow::bail!("No restorable items in session '{}'", session_id);
        }

        let mut report = RestoreReport {
            session_id: session_id.to_string(),
            restored_count: 0,
            restored_bytes: 0,
            errors: Vec::new(),
        };

        for entry in &restorable {
            let staged = entry.staged_path.as_ref().unwrap();
            match restore_single_path(staged, &entry.original_path) {
                Ok(()) => {
                    report.restored_count += 1;
                    report.restored_bytes += entry.size_bytes;
                }
                Err(e) => {
                    report.errors.push(format!(
                        "Failed to restore '{}': {}",
                        entry.original_path.display(),
                        e
                    ));
                }
            }
        }

        manifest.restored = true;
        manifest.save(&session_dir, &self.logs_dir)?;
        let _ = remove_empty_dirs(&session_dir.join("files"));

        Ok(report)
    }

    /// Remove every session past its retention window
    pub fn purge_expired(&self) -> Result<PurgeReport> {
        let mut report = PurgeReport::default();

        for session in self.list_sessions()? {
            if !session.is_expired {
                continue;
            }
            let session_dir = self.session_dir(&session.session_id);

            // Restored sessions hold no files; just drop the record
            if session.restored {
                if session_dir.exists() {
                    let _ = std::fs::remove_dir_all(&session_dir);
                }
                continue;
            }
            if !session_dir.exists() {
                continue;
            }

            let size = dir_size(&session_dir);
            match std::fs::remove_dir_all(&session_dir) {
                Ok(()) => {
                    report.purged_sessions.push(PurgedSession {
                        session_id: session.session_id,
                        bytes_freed: size,
                        file_count: session.total_files,
                    });
                    report.total_bytes_freed += size;
                }
                Err(e) => {
                    report.errors.push(format!(
                        "Failed to purge session '{}': {}",
                        session.session_id, e
                    ));
                }
            }
        }

        Ok(report)
    }

    /// Remove one session regardless of expiry; returns bytes freed
    pub fn purge_session(&self, session_id: &str) -> Result<u64> {
        let session_dir = self.session_dir(session_id);
        if !session_dir.exists() {
            anyhow::bail!("Session '{}' not found", session_id);
        }

        let size = dir_size(&session_dir);
        std::fs::remove_dir_all(&session_dir)
            .with_context(|| format!("Failed to purge session: {}", session_id))?;
        Ok(size)
    }

    /// Remove every session, expired or not
    pub fn purge_all(&self) -> Result<PurgeReport> {
        let mut report = PurgeReport::default();
        if !self.root.exists() {
            return Ok(report);
        }

        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            let session_id = path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            let size = dir_size(&path);

            match std::fs::remove_dir_all(&path) {
                Ok(()) => {
                    report.purged_sessions.push(PurgedSession {
                        session_id,
                        bytes_freed: size,
                        file_count: 0,
                    });
                    report.total_bytes_freed += size;
                }
                Err(e) => {
                    report
                        .errors
                        .push(format!("Failed to purge '{}': {}", session_id, e));
                }
            }
        }

        Ok(report)
    }

    pub fn health(&self) -> Result<QuarantineHealth> {
        let sessions = self.list_sessions()?;
        Ok(QuarantineHealth {
            session_count: sessions.len(),
            staged_bytes: sessions.iter().map(|s| s.staged_size).sum(),
            expired_count: sessions.iter().filter(|s| s.is_expired).count(),
            restored_count: sessions.iter().filter(|s| s.restored).count(),
        })
    }
}

/// In-flight session handle: stage paths, then `finish` to persist the
/// manifest
pub struct QuarantineSession {
    manifest: QuarantineManifest,
    session_dir: PathBuf,
    files_dir: PathBuf,
    logs_dir: PathBuf,
    counter: usize,
}

impl QuarantineSession {
    pub fn id(&self) -> &str {
        &self.manifest.session_id
    }

    pub fn staged_files(&self) -> usize {
        self.manifest.total_files
    }

    pub fn staged_bytes(&self) -> u64 {
        self.manifest.total_bytes
    }

    /// Move one path into the session. Records the entry either way and
    /// propagates the failure so the caller can report it.
    pub fn stage(&mut self, original: &Path, size_bytes: u64) -> Result<()> {
        self.counter += 1;
        let staged_path = self.files_dir.join(format!("{:06}", self.counter));
        let is_dir = original.is_dir();

        match move_path(original, &staged_path) {
            Ok(()) => {
                self.manifest.add_entry(QuarantineEntry {
                    original_path: original.to_path_buf(),
                    staged_path: Some(staged_path),
                    size_bytes,
                    is_dir,
                    success: true,
                    error: None,
                });
                Ok(())
            }
            Err(e) => {
                let msg = format!("Failed to stage '{}': {}", original.display(), e);
                self.manifest.add_entry(QuarantineEntry {
                    original_path: original.to_path_buf(),
                    staged_path: None,
                    size_bytes,
                    is_dir,
                    success: false,
                    error: Some(msg.clone()),
                });
                self.manifest.add_error(msg);
                Err(e)
            }
        }
    }

    /// Persist the manifest. A session that staged nothing is deleted and
    /// yields no id.
    pub fn finish(self) -> Result<Option<String>> {
        if self.manifest.total_files == 0 {
            let _ = std::fs::remove_dir_all(&self.session_dir);
            return Ok(None);
        }
        self.manifest.save(&self.session_dir, &self.logs_dir)?;
        Ok(Some(self.manifest.session_id))
    }
}

/// Move with rename, falling back to copy + remove across filesystems
fn move_path(original: &Path, staged: &Path) -> Result<()> {
    if !original.exists() {
        anyhow::bail!("Path does not exist: {}", original.display());
    }

    if std::fs::rename(original, staged).is_ok() {
        return Ok(());
    }

    if original.is_dir() {
        copy_dir_recursive(original, staged)?;
        std::fs::remove_dir_all(original).with_context(|| {
            format!(
                "Staged copy successful but failed to remove original: {}",
                original.display()
            )
        })?;
    } else {
        if let Some(parent) = staged.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(original, staged)
            .with_context(|| format!("Failed to copy '{}' to quarantine", original.display()))?;
        std::fs::remove_file(original).with_context(|| {
            format!(
                "Staged copy successful but failed to remove original: {}",
                original.display()
            )
        })?;
    }

    Ok(())
}

fn restore_single_path(staged: &Path, original: &Path) -> Result<()> {
    if !staged.exists() {
        anyhow::bail!("Staged file no longer exists: {}", staged.display());
    }
    if original.exists() {
        anyhow::bail!(
            "Original path already exists (won't overwrite): {}",
            original.display()
        );
    }

    if let Some(parent) = original.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create parent dir: {}", parent.display()))?;
    }

    if std::fs::rename(staged, original).is_ok() {
        return Ok(());
    }

    if staged.is_dir() {
        copy_dir_recursive(staged, original)?;
        std::fs::remove_dir_all(staged)?;
    } else {
        std::fs::copy(staged, original)?;
        std::fs::remove_file(staged)?;
    }

    Ok(())
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Drop directories left empty after a restore
fn remove_empty_dirs(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            remove_empty_dirs(&path)?;
        }
    }
    if std::fs::read_dir(dir)?.next().is_none() {
        std::fs::remove_dir(dir)?;
    }
    Ok(())
}

/// Outcome of restoring one session
#[derive(Debug, Clone)]
pub struct RestoreReport {
    pub session_id: String,
    pub restored_count: usize,
    pub restored_bytes: u64,
    pub errors: Vec<String>,
}

/// Outcome of a purge pass
#[derive(Debug, Clone, Default)]
pub struct PurgeReport {
    pub purged_sessions: Vec<PurgedSession>,
    pub total_bytes_freed: u64,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PurgedSession {
    pub session_id: String,
    pub bytes_freed: u64,
    pub file_count: usize,
}

/// Snapshot of the store for `status`
#[derive(Debug, Clone)]
pub struct QuarantineHealth {
    pub session_count: usize,
    pub staged_bytes: u64,
    pub expired_count: usize,
    pub restored_count: usize,
}
