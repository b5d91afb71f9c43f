//! Cleanup orchestration on the unprivileged side of the channel.
//!
//! [`CleanupCoordinator`] owns the working set of scanned items and the
//! category selection, and drives scans and deletions over the privileged
//! channel one call at a time. State lives behind a mutex so a UI task can
//! poll phase and progress while an operation is in flight; the lock is
//! never held across an await.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::channel::PrivilegedChannel;
use crate::model::{CleanableItem, CleanupCategory, CleanupReport, QuarantinePolicy};

// ─── Phases ───────────────────────────────────────────────────────────────────

/// Lifecycle of the coordinator. `Ready` means a scan has completed and
/// its results (possibly empty) are published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Scanning,
    Ready,
    Deleting,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Scanning => write!(f, "scanning"),
            Phase::Ready => write!(f, "ready"),
            Phase::Deleting => write!(f, "deleting"),
        }
    }
}

/// Outcome of a [`CleanupCoordinator::scan`] call
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// Scan ran to completion over every selected category
    Finished { item_count: usize, total_bytes: u64 },
    /// A category failed; partial results were discarded
    Aborted { message: String },
    /// Another operation was in flight, nothing happened
    Rejected,
}

// ─── Coordinator ──────────────────────────────────────────────────────────────

struct Inner {
    phase: Phase,
    items: Vec<CleanableItem>,
    selected: BTreeSet<CleanupCategory>,
    progress: f64,
    last_error: Option<String>,
    last_report: Option<CleanupReport>,
}

pub struct CleanupCoordinator {
    channel: Arc<dyn PrivilegedChannel>,
    inner: Mutex<Inner>,
}

impl CleanupCoordinator {
    /// New coordinator with every category selected
    pub fn new(channel: Arc<dyn PrivilegedChannel>) -> Self {
        Self {
            channel,
            inner: Mutex::new(Inner {
                phase: Phase::Idle,
                items: Vec::new(),
                selected: CleanupCategory::ALL.into_iter().collect(),
                progress: 0.0,
                last_error: None,
                last_report: None,
            }),
        }
    }

    // ─── Scanning ─────────────────────────────────────────────────────────

    /// Scan the selected categories, one channel call per category in
    /// canonical order. Re-entrant calls and calls during a deletion are
    /// rejected without side effects. A failing category aborts the whole
    /// scan and discards everything found so far.
    pub async fn scan(&self) -> ScanOutcome {
        let categories: Vec<CleanupCategory> = {
            let mut inner = self.inner.lock().unwrap();
            if !matches!(inner.phase, Phase::Idle | Phase::Ready) {
                return ScanOutcome::Rejected;
            }
            inner.phase = Phase::Scanning;
            inner.items.clear();
            inner.progress = 0.0;
            inner.last_error = None;
            CleanupCategory::ALL
                .iter()
                .filter(|c| inner.selected.contains(c))
                .copied()
                .collect()
        };

        let total = categories.len().max(1);
        for (index, category) in categories.iter().enumerate() {
            match self
                .channel
                .scan_cleanable_files(std::slice::from_ref(category))
                .await
            {
                Ok(found) => {
                    let mut inner = self.inner.lock().unwrap();
                    inner.items.extend(found);
                    inner.progress = (index + 1) as f64 / total as f64;
                }
                Err(e) => {
                    let message = e.to_string();
                    let mut inner = self.inner.lock().unwrap();
                    inner.items.clear();
                    inner.progress = 0.0;
                    inner.last_error = Some(message.clone());
                    inner.phase = Phase::Ready;
                    return ScanOutcome::Aborted { message };
                }
            }
        }

        let mut inner = self.inner.lock().unwrap();
        inner.phase = Phase::Ready;
        inner.progress = 1.0;
        ScanOutcome::Finished {
            item_count: inner.items.len(),
            total_bytes: inner.items.iter().map(|i| i.size).sum(),
        }
    }

    // ─── Deletion ─────────────────────────────────────────────────────────

    /// Delete the currently selected items in a single channel call.
    /// Returns `None` without doing anything when no scan results are
    /// published, a deletion is already running, or the selection is empty.
    pub async fn cleanup(&self, policy: QuarantinePolicy) -> Option<CleanupReport> {
        let paths: Vec<PathBuf> = {
            let mut inner = self.inner.lock().unwrap();
            if inner.phase != Phase::Ready {
                return None;
            }
            let paths: Vec<PathBuf> = inner
                .items
                .iter()
                .filter(|i| inner.selected.contains(&i.category))
                .map(|i| i.path.clone())
                .collect();
            if paths.is_empty() {
                return None;
            }
            inner.phase = Phase::Deleting;
            inner.last_error = None;
            paths
        };

        match self.channel.delete_files(&paths, policy).await {
            Ok(report) => {
                let requested: HashSet<&Path> = paths.iter().map(|p| p.as_path()).collect();
                let mut inner = self.inner.lock().unwrap();
                // Requested paths leave the working set whatever their
                // individual outcome; a rescan rediscovers survivors.
                inner.items.retain(|i| !requested.contains(i.path.as_path()));
                inner.last_report = Some(report.clone());
                inner.phase = Phase::Ready;
                Some(report)
            }
            Err(e) => {
                let mut inner = self.inner.lock().unwrap();
                inner.last_error = Some(e.to_string());
                inner.phase = Phase::Ready;
                None
            }
        }
    }

    // ─── Selection ────────────────────────────────────────────────────────

    pub fn toggle_category(&self, category: CleanupCategory) {
        let mut inner = self.inner.lock().unwrap();
        if !inner.selected.remove(&category) {
            inner.selected.insert(category);
        }
    }

    pub fn select_all_categories(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.selected = CleanupCategory::ALL.into_iter().collect();
    }

    pub fn deselect_all_categories(&self) {
        self.inner.lock().unwrap().selected.clear();
    }

    /// Replace the selection wholesale
    pub fn set_categories(&self, categories: &[CleanupCategory]) {
        let mut inner = self.inner.lock().unwrap();
        inner.selected = categories.iter().copied().collect();
    }

    // ─── Observation ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.inner.lock().unwrap().phase
    }

    /// Fraction of the current or last scan completed, in `0.0..=1.0`
    pub fn progress(&self) -> f64 {
        self.inner.lock().unwrap().progress
    }

    pub fn items(&self) -> Vec<CleanableItem> {
        self.inner.lock().unwrap().items.clone()
    }

    pub fn selected_categories(&self) -> Vec<CleanupCategory> {
        self.inner.lock().unwrap().selected.iter().copied().collect()
    }

    /// Items whose category is currently selected. Always derived from the
    /// live selection, never cached.
    pub fn selected_items(&self) -> Vec<CleanableItem> {
        let inner = self.inner.lock().unwrap();
        inner
            .items
            .iter()
            .filter(|i| inner.selected.contains(&i.category))
            .cloned()
            .collect()
    }

    pub fn selected_bytes(&self) -> u64 {
        let inner = self.inner.lock().unwrap();
        inner
            .items
            .iter()
            .filter(|i| inner.selected.contains(&i.category))
            .map(|i| i.size)
            .sum()
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.lock().unwrap().last_error.clone()
    }

    pub fn last_report(&self) -> Option<CleanupReport> {
        self.inner.lock().unwrap().last_report.clone()
    }
}
