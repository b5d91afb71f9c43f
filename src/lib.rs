//! # MacCare
//!
//! Privilege-separated system cleanup and maintenance.
//!
//! All destructive work happens behind the [`channel::PrivilegedChannel`]
//! trait, modeled after an XPC connection to a root helper; the in-process
//! [`helper::HelperEndpoint`] implements it end to end. On the unprivileged
//! side, [`coordinator::CleanupCoordinator`] drives scans and deletions as
//! an explicit state machine and [`care::SmartCare`] chains cleanup, memory
//! optimization, and threat handling into a single pass. Features:
//!
//! - **Category Scans**: caches, logs, trash, downloads, developer and browser data
//! - **Safety-First**: protected-path tables, quarantine with 7-day undo window
//! - **Smart Care**: one-shot maintenance covering cleanup, memory, and malware
//! - **CLI as Unix Citizen**: JSON output, pipe-friendly, cron-schedulable
//! - **100% Offline**: zero telemetry, no accounts, no cloud

pub mod care;
pub mod channel;
pub mod cli;
pub mod common;
pub mod coordinator;
pub mod helper;
pub mod model;
pub mod quarantine;
