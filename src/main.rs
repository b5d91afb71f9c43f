use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::{Duration, Instant};

use maccare::care::SmartCare;
use maccare::channel::PrivilegedChannel;
use maccare::cli::args::{Cli, Commands, ConfigAction, OutputFormat};
use maccare::cli::output;
use maccare::common::config::Config;
use maccare::common::format;
use maccare::common::safety;
use maccare::coordinator::{CleanupCoordinator, ScanOutcome};
use maccare::helper::HelperEndpoint;
use maccare::model::{CleanupCategory, QuarantinePolicy, ThreatSeverity};
use maccare::quarantine::{QuarantineManifest, QuarantineStore};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("maccare=debug")
            .init();
    }

    match cli.command {
        Commands::Scan {
            detailed,
            ref categories,
        } => cmd_scan(&cli, detailed, categories.as_deref()).await,

        Commands::Clean {
            purge,
            yes,
            ref categories,
            dry_run,
        } => cmd_clean(&cli, purge, yes, categories.as_deref(), dry_run).await,

        Commands::Care => cmd_care(&cli).await,

        Commands::Threats { fix, yes } => cmd_threats(&cli, fix, yes).await,

        Commands::Optimize => cmd_optimize(&cli).await,

        Commands::Undo {
            last,
            ref session,
            list,
        } => cmd_undo(&cli, last, session.clone(), list),

        Commands::Purge {
            expired,
            all,
            ref session,
            yes,
        } => cmd_purge(expired, all, session.clone(), yes),

        Commands::Config { action } => cmd_config(action),

        Commands::Status => cmd_status(&cli).await,

        Commands::Completions { shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            let shell = match shell {
                maccare::cli::args::CompletionShell::Bash => clap_complete::Shell::Bash,
                maccare::cli::args::CompletionShell::Zsh => clap_complete::Shell::Zsh,
                maccare::cli::args::CompletionShell::Fish => clap_complete::Shell::Fish,
            };
            clap_complete::generate(shell, &mut cmd, "maccare", &mut std::io::stdout());
            Ok(())
        }
    }
}

// ─── Wiring ───────────────────────────────────────────────────────────────────

fn open_channel(config: Config) -> Arc<dyn PrivilegedChannel> {
    Arc::new(HelperEndpoint::new(config))
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("\n  {} {} [y/N] ", "❓", prompt);
    use std::io::Write;
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Drive a scan to completion while a progress bar tracks the coordinator
async fn run_scan_with_progress(
    coordinator: Arc<CleanupCoordinator>,
    show_progress: bool,
) -> Result<ScanOutcome> {
    let task = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.scan().await })
    };

    if show_progress {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template("  {spinner:.green} Scanning [{bar:40.cyan/blue}] {pos}%")?
                .progress_chars("█▓░"),
        );
        while !task.is_finished() {
            bar.set_position((coordinator.progress() * 100.0) as u64);
            tokio::time::sleep(Duration::from_millis(80)).await;
        }
        bar.finish_and_clear();
    }

    Ok(task.await?)
}

// ─── Scan ─────────────────────────────────────────────────────────────────────

async fn cmd_scan(
    cli: &Cli,
    detailed: bool,
    categories: Option<&[CleanupCategory]>,
) -> Result<()> {
    let config = Config::load()?;
    let coordinator = Arc::new(CleanupCoordinator::new(open_channel(config)));
    if let Some(categories) = categories {
        coordinator.set_categories(categories);
    }

    let show_progress = !cli.quiet && matches!(cli.format, OutputFormat::Human);
    let started = Instant::now();
    let outcome = run_scan_with_progress(coordinator.clone(), show_progress).await?;
    let duration = started.elapsed().as_secs_f64();

    match outcome {
        ScanOutcome::Finished { .. } => {
            let items = coordinator.items();
            match cli.format {
                OutputFormat::Human => output::print_scan_results(&items, duration, detailed),
                OutputFormat::Json => output::print_scan_json(&items),
                OutputFormat::Quiet => output::print_scan_quiet(&items),
            }
            Ok(())
        }
        ScanOutcome::Aborted { message } => anyhow::bail!("Scan failed: {}", message),
        ScanOutcome::Rejected => anyhow::bail!("Another operation is already in progress"),
    }
}

// ─── Clean ────────────────────────────────────────────────────────────────────

async fn cmd_clean(
    cli: &Cli,
    purge: bool,
    yes: bool,
    categories: Option<&[CleanupCategory]>,
    dry_run: bool,
) -> Result<()> {
    let config = Config::load()?;
    let policy = if purge {
        QuarantinePolicy::Purge
    } else {
        config.default_policy
    };

    // Quarantine health is worth a look before adding to it
    if policy == QuarantinePolicy::Quarantine && !dry_run && !cli.quiet {
        let store = QuarantineStore::open_default();
        if let Ok(health) = store.health() {
            println!();
            output::print_quarantine_health(&health);
        }
    }

    let coordinator = Arc::new(CleanupCoordinator::new(open_channel(config)));
    if let Some(categories) = categories {
        coordinator.set_categories(categories);
    }

    let show_progress = !cli.quiet && matches!(cli.format, OutputFormat::Human);
    let started = Instant::now();
    let outcome = run_scan_with_progress(coordinator.clone(), show_progress).await?;
    let duration = started.elapsed().as_secs_f64();

    match outcome {
        ScanOutcome::Finished { .. } => {}
        ScanOutcome::Aborted { message } => anyhow::bail!("Scan failed: {}", message),
        ScanOutcome::Rejected => anyhow::bail!("Another operation is already in progress"),
    }

    let items = coordinator.selected_items();
    if items.is_empty() {
        println!("  {} Nothing to clean!", "✨");
        return Ok(());
    }

    if matches!(cli.format, OutputFormat::Human) {
        output::print_scan_results(&items, duration, false);
    }

    let total = coordinator.selected_bytes();
    if dry_run {
        println!(
            "  {} Dry run: would delete {} ({}). No files modified.",
            "ℹ️",
            format::format_count(items.len(), "item"),
            format::format_size(total)
        );
        return Ok(());
    }

    if safety::exceeds_warning_threshold(total) {
        println!(
            "  {} Unusually large selection: {}",
            "⚠".yellow(),
            format::format_size_colored(total)
        );
    }

    if !yes {
        let label = match policy {
            QuarantinePolicy::Purge => "PERMANENTLY DELETE",
            QuarantinePolicy::Quarantine => "Quarantine",
        };
        let prompt = format!(
            "{} {} ({})?",
            label,
            format::format_count(items.len(), "item"),
            format::format_size(total)
        );
        if !confirm(&prompt)? {
            println!("  {} Cancelled", "✗".red());
            return Ok(());
        }
    }

    let Some(report) = coordinator.cleanup(policy).await else {
        let message = coordinator
            .last_error()
            .unwrap_or_else(|| "nothing was selected".to_string());
        anyhow::bail!("Cleanup did not run: {}", message);
    };

    match cli.format {
        OutputFormat::Human => output::print_clean_report(&report, policy),
        OutputFormat::Json => {
            let json = serde_json::json!({
                "policy": policy,
                "deleted_count": report.deleted_count,
                "freed_bytes": report.freed_bytes,
                "session_id": report.session_id,
                "errors": report.errors,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Quiet => {
            println!(
                "{}  {}  {}",
                format::format_size(report.freed_bytes),
                report.deleted_count,
                report.session_id.as_deref().unwrap_or("none")
            );
        }
    }

    Ok(())
}

// ─── Smart Care ───────────────────────────────────────────────────────────────

async fn cmd_care(cli: &Cli) -> Result<()> {
    let config = Config::load()?;
    let channel = open_channel(config);
    let coordinator = Arc::new(CleanupCoordinator::new(channel.clone()));
    let care = Arc::new(SmartCare::new(channel, coordinator));

    if !cli.quiet && matches!(cli.format, OutputFormat::Human) {
        println!();
        println!("  {} Running Smart Care: cleanup, memory, threats...", "🩺");
    }

    let runner = {
        let care = care.clone();
        tokio::spawn(async move { care.run().await })
    };

    if !cli.quiet && matches!(cli.format, OutputFormat::Human) {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template(
                "  {spinner:.green} Smart Care [{bar:40.cyan/blue}] {pos}%",
            )?
            .progress_chars("█▓░"),
        );
        while !runner.is_finished() {
            bar.set_position((care.progress() * 100.0) as u64);
            tokio::time::sleep(Duration::from_millis(80)).await;
        }
        bar.set_position(100);
        bar.finish_and_clear();
    }

    let report = runner
        .await?
        .ok_or_else(|| anyhow::anyhow!("Smart Care is already running"))?;

    match cli.format {
        OutputFormat::Human => output::print_care_report(&report),
        OutputFormat::Json => output::print_care_json(&report),
        OutputFormat::Quiet => {
            let freed = report.cleanup.as_ref().map(|c| c.freed_bytes).unwrap_or(0);
            println!(
                "{}  {}  {}",
                format::format_size(freed),
                report.unresolved_threats.len(),
                report.errors.len()
            );
        }
    }

    Ok(())
}

// ─── Threats ──────────────────────────────────────────────────────────────────

async fn cmd_threats(cli: &Cli, fix: bool, yes: bool) -> Result<()> {
    let config = Config::load()?;
    let channel = open_channel(config);

    if !cli.quiet && matches!(cli.format, OutputFormat::Human) {
        println!();
        println!("  {} Scanning for known threats...", "🛡️");
    }

    let threats = channel
        .scan_for_malware()
        .await
        .map_err(|e| anyhow::anyhow!("Threat scan failed: {}", e))?;

    match cli.format {
        OutputFormat::Human => output::print_threats(&threats),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&threats)?),
        OutputFormat::Quiet => println!("{}", threats.len()),
    }

    if !fix || threats.is_empty() {
        return Ok(());
    }

    for threat in &threats {
        let approved = threat.severity == ThreatSeverity::Low
            || yes
            || confirm(&format!(
                "Remove {} threat '{}' at {}?",
                threat.severity,
                threat.name,
                format::format_path(&threat.path)
            ))?;
        if !approved {
            println!("  {} Skipped '{}'", "→".dimmed(), threat.name);
            continue;
        }

        match channel.remove_threat(threat).await {
            Ok(()) => println!("  {} Removed '{}'", "✓".green(), threat.name),
            Err(e) => println!("  {} Could not remove '{}': {}", "✗".red(), threat.name, e),
        }
    }
    println!();

    Ok(())
}

// ─── Optimize ─────────────────────────────────────────────────────────────────

async fn cmd_optimize(cli: &Cli) -> Result<()> {
    let config = Config::load()?;
    let channel = open_channel(config);

    if !cli.quiet && matches!(cli.format, OutputFormat::Human) {
        println!();
        println!("  {} Optimizing memory...", "🧠");
    }

    let report = channel
        .optimize_memory()
        .await
        .map_err(|e| anyhow::anyhow!("Memory optimization failed: {}", e))?;

    match cli.format {
        OutputFormat::Human => output::print_memory_report(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Quiet => println!("{}", format::format_size(report.freed)),
    }

    Ok(())
}

// ─── Undo ─────────────────────────────────────────────────────────────────────

fn cmd_undo(cli: &Cli, last: bool, session: Option<String>, list: bool) -> Result<()> {
    let store = QuarantineStore::open_default();

    if list {
        let sessions = store.list_sessions()?;
        match cli.format {
            OutputFormat::Human => output::print_sessions(&sessions),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&sessions)?),
            OutputFormat::Quiet => {
                for s in &sessions {
                    let status = if s.restored {
                        "restored"
                    } else if s.is_expired {
                        "expired"
                    } else {
                        "active"
                    };
                    println!(
                        "{}  {}  {}",
                        s.session_id,
                        format::format_size(s.staged_size),
                        status
                    );
                }
            }
        }
        return Ok(());
    }

    let session_id = if last {
        store
            .most_recent_session()?
            .ok_or_else(|| anyhow::anyhow!("No sessions found in quarantine"))?
    } else if let Some(sid) = session {
        sid
    } else {
        println!();
        println!("  {} Undo a previous cleanup", "↩️");
        println!();
        println!("  Usage:");
        println!("    {} Restore last session", "maccare undo --last".cyan());
        println!("    {} Restore specific", "maccare undo --session <ID>".cyan());
        println!("    {} List all", "maccare undo --list".cyan());
        println!();

        let sessions = store.list_sessions()?;
        let active: Vec<_> = sessions
            .iter()
            .filter(|s| !s.restored && !s.is_expired)
            .collect();
        if !active.is_empty() {
            println!("  Active sessions:");
            for s in active.iter().take(5) {
                println!(
                    "    {} {} ({}, {} files)",
                    "•".dimmed(),
                    s.session_id,
                    format::format_size(s.staged_size),
                    s.total_files
                );
            }
            println!();
        }
        return Ok(());
    };

    let manifest = QuarantineManifest::load(&store.root().join(&session_id))?;
    if manifest.restored {
        println!("  {} Session '{}' was already restored.", "ℹ️", session_id);
        return Ok(());
    }

    println!();
    println!(
        "  {} Restoring session '{}' ({})",
        "↩️",
        session_id.cyan(),
        format::format_size(manifest.total_bytes)
    );

    let report = store.restore_session(&session_id)?;

    match cli.format {
        OutputFormat::Human => output::print_restore_report(&report),
        OutputFormat::Json => {
            let json = serde_json::json!({
                "session_id": report.session_id,
                "restored_count": report.restored_count,
                "restored_bytes": report.restored_bytes,
                "errors": report.errors,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Quiet => {
            println!(
                "{}  {}  {}",
                report.session_id,
                report.restored_count,
                format::format_size(report.restored_bytes)
            );
        }
    }

    Ok(())
}

// ─── Purge ────────────────────────────────────────────────────────────────────

fn cmd_purge(expired: bool, all: bool, session: Option<String>, yes: bool) -> Result<()> {
    let store = QuarantineStore::open_default();

    if let Some(sid) = session {
        if !yes && !confirm(&format!("Permanently purge session '{}'?", sid))? {
            println!("  {} Cancelled", "✗".red());
            return Ok(());
        }
        let freed = store.purge_session(&sid)?;
        println!(
            "  {} Purged '{}', freed {}",
            "🔥",
            sid,
            format::format_size(freed)
        );
        return Ok(());
    }

    if all {
        let sessions = store.list_sessions()?;
        let total: u64 = sessions.iter().map(|s| s.staged_size).sum();

        if !yes {
            let prompt = format!(
                "Permanently purge ALL {} ({})?",
                format::format_count(sessions.len(), "session"),
                format::format_size(total)
            );
            if !confirm(&prompt)? {
                println!("  {} Cancelled", "✗".red());
                return Ok(());
            }
        }

        let report = store.purge_all()?;
        output::print_purge_report(&report);
        return Ok(());
    }

    if expired {
        let report = store.purge_expired()?;
        output::print_purge_report(&report);
        return Ok(());
    }

    println!();
    println!("  {} Purge quarantine sessions", "🔥");
    println!();
    println!("  Usage:");
    println!("    {} Expired only", "maccare purge --expired".cyan());
    println!("    {} ALL sessions", "maccare purge --all".cyan());
    println!("    {} Specific session", "maccare purge --session <ID>".cyan());
    println!();

    let health = store.health()?;
    output::print_quarantine_health(&health);
    println!();

    Ok(())
}

// ─── Config ───────────────────────────────────────────────────────────────────

fn cmd_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init => {
            Config::init_dirs()?;
            let config = Config::default();
            config.save()?;
            println!("  {} MacCare initialized at ~/.maccare", "✓".green());
            println!("  Created: config.toml, quarantine/, logs/");
            Ok(())
        }
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!("  {} Configuration reset to defaults", "✓".green());
            Ok(())
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            match key.as_str() {
                "default_policy" => {
                    config.default_policy = match value.as_str() {
                        "quarantine" => QuarantinePolicy::Quarantine,
                        "purge" => QuarantinePolicy::Purge,
                        _ => anyhow::bail!("default_policy must be 'quarantine' or 'purge'"),
                    }
                }
                "quarantine_retention_days" => config.quarantine_retention_days = value.parse()?,
                "min_item_size_kb" => config.min_item_size_kb = value.parse()?,
                "scan_depth" => config.scan_depth = value.parse()?,
                _ => anyhow::bail!("Unknown config key: {}", key),
            }
            config.save()?;
            println!("  {} Set {} = {}", "✓".green(), key, value);
            Ok(())
        }
    }
}

// ─── Status ───────────────────────────────────────────────────────────────────

async fn cmd_status(cli: &Cli) -> Result<()> {
    let config = Config::load()?;

    println!();
    println!("  {} MacCare Status", "📊");
    println!("{}", "─".repeat(60).dimmed());
    println!();

    println!("  {} Default policy: {}", "⚙️", config.default_policy);
    println!(
        "  {} Quarantine retention: {} days",
        "⚙️", config.quarantine_retention_days
    );
    println!(
        "  {} Minimum item size: {} KB",
        "⚙️", config.min_item_size_kb
    );
    println!();

    let store = QuarantineStore::open_default();
    let health = store.health()?;
    output::print_quarantine_health(&health);

    let sessions = store.list_sessions()?;
    if !sessions.is_empty() {
        println!("  {} Recent sessions:", "📋");
        for s in sessions.iter().take(5) {
            let status = if s.restored {
                "restored".green().to_string()
            } else if s.is_expired {
                "expired".red().to_string()
            } else {
                "active".yellow().to_string()
            };
            println!(
                "    {} {} ({}, {} files) [{}]",
                "•".dimmed(),
                s.session_id,
                format::format_size(s.staged_size),
                s.total_files,
                status
            );
        }
    }
    println!();

    if !cli.quiet {
        let channel = open_channel(config);
        match channel.ping().await {
            Ok(()) => println!("  {} Helper endpoint: reachable", "🔌"),
            Err(e) => println!("  {} Helper endpoint: {}", "⚠".yellow(), e),
        }
        match channel.system_stats().await {
            Ok(stats) => {
                println!("  {} System:", "🖥️");
                output::print_stats(&stats);
            }
            Err(e) => println!("  {} System stats unavailable: {}", "⚠".yellow(), e),
        }
    }
    println!();

    Ok(())
}
