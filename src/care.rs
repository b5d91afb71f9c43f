//! One-shot maintenance pass: cleanup, memory, threats.
//!
//! The three phases run in order and fail independently; a phase that goes
//! wrong contributes an error message and the pass moves on. The report at
//! the end reflects whatever actually happened.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::channel::PrivilegedChannel;
use crate::coordinator::{CleanupCoordinator, ScanOutcome};
use crate::model::{CareReport, CleanupReport, QuarantinePolicy, ThreatSeverity};

/// Progress milestones for the three phases
const AFTER_SCAN: f64 = 0.35;
const AFTER_CLEANUP: f64 = 0.45;
const AFTER_MEMORY: f64 = 0.70;
const AFTER_THREATS: f64 = 0.95;

/// Lets the UI show the finished bar before the pass hands back control
const WRAP_UP_PAUSE: Duration = Duration::from_millis(400);

struct CareInner {
    running: bool,
    progress: f64,
    last_report: Option<CareReport>,
}

pub struct SmartCare {
    channel: Arc<dyn PrivilegedChannel>,
    coordinator: Arc<CleanupCoordinator>,
    inner: Mutex<CareInner>,
}

impl SmartCare {
    pub fn new(channel: Arc<dyn PrivilegedChannel>, coordinator: Arc<CleanupCoordinator>) -> Self {
        Self {
            channel,
            coordinator,
            inner: Mutex::new(CareInner {
                running: false,
                progress: 0.0,
                last_report: None,
            }),
        }
    }

    /// Run the full pass. A second call while one is in flight is a silent
    /// no-op returning `None`. The running flag is always cleared on the
    /// way out; the phases aggregate their failures instead of raising.
    pub async fn run(&self) -> Option<CareReport> {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.running {
                return None;
            }
            inner.running = true;
            inner.progress = 0.0;
        }

        let report = self.run_phases().await;

        let mut inner = self.inner.lock().unwrap();
        inner.last_report = Some(report.clone());
        inner.running = false;
        Some(report)
    }

    async fn run_phases(&self) -> CareReport {
        let mut report = CareReport {
            cleanup: None,
            memory: None,
            unresolved_threats: Vec::new(),
            errors: Vec::new(),
        };

        // Phase 1: scan everything, then delete what was found.
        self.coordinator.select_all_categories();
        match self.coordinator.scan().await {
            ScanOutcome::Finished { item_count: 0, .. } => {
                // nothing to clean still counts as a completed phase
                report.cleanup = Some(CleanupReport::empty());
            }
            ScanOutcome::Finished { .. } => {
                self.set_progress(AFTER_SCAN);
                match self.coordinator.cleanup(QuarantinePolicy::Quarantine).await {
                    Some(cleanup) => {
                        report.errors.extend(cleanup.errors.iter().cloned());
                        report.cleanup = Some(cleanup);
                    }
                    None => {
                        let message = self
                            .coordinator
                            .last_error()
                            .unwrap_or_else(|| "cleanup did not run".to_string());
                        report.errors.push(message);
                    }
                }
            }
            ScanOutcome::Aborted { message } => report.errors.push(message),
            ScanOutcome::Rejected => report
                .errors
                .push("cleanup skipped: another operation is in progress".to_string()),
        }
        self.set_progress(AFTER_CLEANUP);

        // Phase 2: memory. Failure costs the report its memory section,
        // nothing else.
        match self.channel.optimize_memory().await {
            Ok(memory) => report.memory = Some(memory),
            Err(e) => report.errors.push(format!("Memory optimization failed: {e}")),
        }
        self.set_progress(AFTER_MEMORY);

        // Phase 3: threats. Low severity is removed on the spot; anything
        // stronger is surfaced for the user to decide.
        match self.channel.scan_for_malware().await {
            Ok(threats) => {
                for threat in threats {
                    if threat.severity == ThreatSeverity::Low {
                        match self.channel.remove_threat(&threat).await {
                            Ok(()) => {}
                            Err(e) => {
                                report.errors.push(format!(
                                    "Could not remove threat '{}': {e}",
                                    threat.name
                                ));
                                report.unresolved_threats.push(threat);
                            }
                        }
                    } else {
                        report.unresolved_threats.push(threat);
                    }
                }
            }
            Err(e) => report.errors.push(format!("Malware scan failed: {e}")),
        }
        self.set_progress(AFTER_THREATS);

        self.set_progress(1.0);
        tokio::time::sleep(WRAP_UP_PAUSE).await;
        report
    }

    /// Progress only moves forward
    fn set_progress(&self, value: f64) {
        let mut inner = self.inner.lock().unwrap();
        inner.progress = inner.progress.max(value);
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().unwrap().running
    }

    pub fn progress(&self) -> f64 {
        self.inner.lock().unwrap().progress
    }

    pub fn last_report(&self) -> Option<CareReport> {
        self.inner.lock().unwrap().last_report.clone()
    }
}
