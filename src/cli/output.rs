use colored::*;

use crate::common::format::{
    self, format_path, format_severity, format_size, format_size_colored,
};
use crate::model::{
    CareReport, CleanableItem, CleanupCategory, CleanupReport, MemoryReport, QuarantinePolicy,
    SecurityThreat, SystemStats,
};
use crate::quarantine::{PurgeReport, QuarantineHealth, RestoreReport, SessionSummary};

fn category_icon(category: CleanupCategory) -> &'static str {
    match category {
        CleanupCategory::SystemCaches | CleanupCategory::UserCaches => "📁",
        CleanupCategory::Logs => "📋",
        CleanupCategory::Trash => "🗑️",
        CleanupCategory::Downloads => "💿",
        CleanupCategory::DeveloperCaches => "🔧",
        CleanupCategory::BrowserData => "🌐",
        CleanupCategory::ApplicationSupport => "📎",
    }
}

// ─── Scan ─────────────────────────────────────────────────────────────────────

/// Print scan results grouped by category
pub fn print_scan_results(items: &[CleanableItem], duration_secs: f64, detailed: bool) {
    let total: u64 = items.iter().map(|i| i.size).sum();

    println!();
    println!("  {} MacCare Scan Results", "🧹");
    println!("{}", "─".repeat(60).dimmed());
    println!(
        "  Scanned in {}  •  {} reclaimable  •  {}",
        format::format_duration(duration_secs).cyan(),
        format_size_colored(total),
        format::format_count(items.len(), "item").dimmed()
    );
    println!("{}", "─".repeat(60).dimmed());
    println!();

    if items.is_empty() {
        println!("  {} Nothing to clean!", "✨");
        println!();
        return;
    }

    for category in CleanupCategory::ALL {
        let in_category: Vec<&CleanableItem> =
            items.iter().filter(|i| i.category == category).collect();
        if in_category.is_empty() {
            continue;
        }
        let category_total: u64 = in_category.iter().map(|i| i.size).sum();

        println!(
            "  {} {} ({})",
            category_icon(category),
            category.name().bold(),
            format_size_colored(category_total)
        );
        for item in &in_category {
            println!(
                "    {:<52} {:>10}",
                format_path(&item.path),
                format_size(item.size)
            );
            if detailed {
                if let Some(modified) = item.modified {
                    println!(
                        "      {} modified {}",
                        "↳".dimmed(),
                        modified.format("%Y-%m-%d %H:%M").to_string().dimmed()
                    );
                }
            }
        }
        println!();
    }

    println!("{}", "─".repeat(60).dimmed());
    println!(
        "  {} Total reclaimable: {}",
        "💾",
        format_size_colored(total)
    );
    println!("  {} Run {} to clean safely", "💡", "maccare clean".cyan());
    println!();
}

pub fn print_scan_json(items: &[CleanableItem]) {
    let total: u64 = items.iter().map(|i| i.size).sum();
    let json = serde_json::json!({
        "item_count": items.len(),
        "total_bytes": total,
        "items": items,
    });
    match serde_json::to_string_pretty(&json) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Error serializing results: {}", e),
    }
}

pub fn print_scan_quiet(items: &[CleanableItem]) {
    let total: u64 = items.iter().map(|i| i.size).sum();
    println!("{}  {}", format_size(total), items.len());
}

// ─── Clean ────────────────────────────────────────────────────────────────────

/// Print a delete operation report
pub fn print_clean_report(report: &CleanupReport, policy: QuarantinePolicy) {
    println!();
    let (icon, label) = match policy {
        QuarantinePolicy::Quarantine => ("✓".green().to_string(), "Quarantined"),
        QuarantinePolicy::Purge => ("🔥".to_string(), "Purged"),
    };

    println!(
        "  {} {} {}, {}",
        icon,
        label.bold(),
        format::format_count(report.deleted_count, "item").cyan(),
        format_size_colored(report.freed_bytes),
    );

    if let Some(ref sid) = report.session_id {
        println!("  {} Session: {}", "💾", sid.cyan());
        println!(
            "  {} Undo with: {}",
            "💡",
            format!("maccare undo --session {}", sid).cyan()
        );
    }

    print_error_list(&report.errors);
    println!();
}

fn print_error_list(errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    println!();
    println!(
        "  {} {}",
        "⚠".yellow(),
        format!("{}:", format::format_count(errors.len(), "error")).yellow()
    );
    for (i, err) in errors.iter().enumerate().take(10) {
        println!("    {} {}", format!("{}.", i + 1).dimmed(), err.dimmed());
    }
    if errors.len() > 10 {
        println!(
            "    ... and {} more",
            (errors.len() - 10).to_string().dimmed()
        );
    }
}

// ─── Smart Care ───────────────────────────────────────────────────────────────

/// Print the report of a full Smart Care pass
pub fn print_care_report(report: &CareReport) {
    println!();
    println!("  {} Smart Care Report", "🩺");
    println!("{}", "─".repeat(60).dimmed());
    println!();

    match report.cleanup {
        Some(ref cleanup) => println!(
            "  {} Cleanup: {}, {} freed",
            "✓".green(),
            format::format_count(cleanup.deleted_count, "item"),
            format_size_colored(cleanup.freed_bytes)
        ),
        None => println!("  {} Cleanup: did not complete", "✗".red()),
    }
    if let Some(sid) = report.cleanup.as_ref().and_then(|c| c.session_id.as_deref()) {
        println!(
            "    {} undo with {}",
            "↳".dimmed(),
            format!("maccare undo --session {}", sid).cyan()
        );
    }

    match report.memory {
        Some(ref memory) => print_memory_line(memory),
        None => println!("  {} Memory: not optimized", "✗".red()),
    }

    if report.unresolved_threats.is_empty() {
        println!("  {} Threats: none need attention", "✓".green());
    } else {
        println!(
            "  {} Threats: {} need attention",
            "⚠".yellow(),
            report.unresolved_threats.len().to_string().yellow().bold()
        );
        for threat in &report.unresolved_threats {
            print_threat_row(threat);
        }
    }

    print_error_list(&report.errors);

    println!();
    if report.is_clean() {
        println!("  {} All done, no follow-up needed", "✨");
    } else {
        println!("  {} Finished with findings above", "ℹ️");
    }
    println!();
}

pub fn print_care_json(report: &CareReport) {
    match serde_json::to_string_pretty(report) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Error serializing report: {}", e),
    }
}

// ─── Memory ───────────────────────────────────────────────────────────────────

fn print_memory_line(report: &MemoryReport) {
    println!(
        "  {} Memory: freed {} ({} now in use)",
        "✓".green(),
        format_size_colored(report.freed),
        format_size(report.used_after)
    );
}

pub fn print_memory_report(report: &MemoryReport) {
    println!();
    println!(
        "  {} Memory optimized: {} freed",
        "🧠",
        format_size_colored(report.freed)
    );
    println!(
        "    {} {} in use before, {} after",
        "↳".dimmed(),
        format_size(report.used_before).dimmed(),
        format_size(report.used_after).dimmed()
    );
    println!();
}

// ─── Threats ──────────────────────────────────────────────────────────────────

fn print_threat_row(threat: &SecurityThreat) {
    println!(
        "    {} [{}] {:<24} {}",
        "•".dimmed(),
        format_severity(threat.severity),
        format::truncate(&threat.name, 24),
        format_path(&threat.path).dimmed()
    );
}

/// Print malware scan findings
pub fn print_threats(threats: &[SecurityThreat]) {
    println!();
    println!("  {} Threat Scan", "🛡️");
    println!("{}", "─".repeat(60).dimmed());
    println!();

    if threats.is_empty() {
        println!("  {} No known threats found", "✨");
        println!();
        return;
    }

    println!(
        "  {} {} found:",
        "⚠".yellow(),
        format::format_count(threats.len(), "threat").yellow().bold()
    );
    println!();
    for threat in threats {
        print_threat_row(threat);
        println!(
            "        {} {}",
            "↳".dimmed(),
            format!("{}", threat.kind).dimmed()
        );
    }
    println!();
}

// ─── Stats ────────────────────────────────────────────────────────────────────

pub fn print_stats(stats: &SystemStats) {
    format::print_kv("CPU", &format::format_percent(stats.cpu_usage as f64));
    format::print_kv(
        "Memory",
        &format!(
            "{} of {} ({})",
            format_size(stats.memory_used),
            format_size(stats.memory_total),
            format::format_percent(stats.memory_percentage())
        ),
    );
    format::print_kv(
        "Disk",
        &format!(
            "{} of {} ({})",
            format_size(stats.disk_used),
            format_size(stats.disk_total),
            format::format_percent(stats.disk_percentage())
        ),
    );
}

// ─── Quarantine ───────────────────────────────────────────────────────────────

/// Print the list of quarantine sessions
pub fn print_sessions(sessions: &[SessionSummary]) {
    println!();
    println!("  {} Quarantine Sessions", "📦");
    println!("{}", "─".repeat(72).dimmed());
    println!();

    if sessions.is_empty() {
        println!("  No sessions in the quarantine area.");
        println!();
        return;
    }

    println!(
        "  {:<24} {:>10} {:>8}  {}",
        "Session ID".dimmed(),
        "Size".dimmed(),
        "Files".dimmed(),
        "Status".dimmed(),
    );
    println!("  {}", "─".repeat(68).dimmed());

    for session in sessions {
        let status = if session.restored {
            "Restored".green().to_string()
        } else if session.is_expired {
            "Expired".red().to_string()
        } else {
            session
                .expires_at
                .map(|e| {
                    let duration = e - chrono::Utc::now();
                    let days = duration.num_days();
                    let hours = duration.num_hours() % 24;
                    if days > 0 {
                        format!("{}d left", days)
                    } else {
                        format!("{}h left", hours)
                    }
                })
                .unwrap_or_else(|| "N/A".to_string())
                .yellow()
                .to_string()
        };

        println!(
            "  {:<24} {:>10} {:>8}  {}",
            session.session_id,
            format_size(session.staged_size),
            session.total_files,
            status,
        );
    }

    println!();
    println!("  {} Restore: {}", "💡", "maccare undo --session <ID>".cyan());
    println!("  {} Purge expired: {}", "💡", "maccare purge --expired".cyan());
    println!();
}

/// Print restore report
pub fn print_restore_report(report: &RestoreReport) {
    println!();
    println!(
        "  {} Restored {} ({})",
        "✓".green(),
        format::format_count(report.restored_count, "file").cyan(),
        format_size_colored(report.restored_bytes),
    );
    println!("  {} Session: {}", "📦", report.session_id.cyan());

    if !report.errors.is_empty() {
        println!();
        println!(
            "  {} {} during restore:",
            "⚠".yellow(),
            format::format_count(report.errors.len(), "error")
        );
        for err in report.errors.iter().take(5) {
            println!("    {} {}", "→".dimmed(), err.dimmed());
        }
    }
    println!();
}

/// Print purge report
pub fn print_purge_report(report: &PurgeReport) {
    println!();
    if report.purged_sessions.is_empty() {
        println!("  {} No sessions to purge.", "✓".green());
    } else {
        println!(
            "  {} Purged {}, freed {}",
            "🔥",
            format::format_count(report.purged_sessions.len(), "session").cyan(),
            format_size_colored(report.total_bytes_freed),
        );
        for session in &report.purged_sessions {
            println!(
                "    {} {} ({})",
                "✗".red(),
                session.session_id,
                format_size(session.bytes_freed),
            );
        }
    }

    if !report.errors.is_empty() {
        println!();
        for err in &report.errors {
            println!("    {} {}", "⚠".yellow(), err.dimmed());
        }
    }
    println!();
}

/// Print quarantine health, with a nudge when sessions have expired
pub fn print_quarantine_health(health: &QuarantineHealth) {
    println!(
        "  {} Quarantine: {}, {} staged",
        "📦",
        format::format_count(health.session_count, "session"),
        format_size(health.staged_bytes)
    );
    if health.expired_count > 0 {
        println!(
            "  {} {} expired, run {}",
            "⚠".yellow(),
            format::format_count(health.expired_count, "session").yellow(),
            "maccare purge --expired".cyan()
        );
    }
}
