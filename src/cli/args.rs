use clap::{Parser, Subcommand, ValueEnum};

use crate::model::CleanupCategory;

/// MacCare: privilege-separated cleanup and maintenance
#[derive(Parser, Debug)]
#[command(
    name = "maccare",
    version,
    about = "System cleanup, memory optimization, and threat scanning",
    long_about = "MacCare scans for cleanable caches, logs, and leftover data, deletes\n\
                  with quarantine-backed undo, and runs a one-shot Smart Care pass\n\
                  covering cleanup, memory, and malware checks.",
    after_help = "EXAMPLES:\n  \
        maccare scan                             Scan every category\n  \
        maccare scan --categories trash,logs     Scan selected categories\n  \
        maccare clean --yes                      Clean with quarantine (default)\n  \
        maccare clean --purge                    Permanent deletion\n  \
        maccare care                             Full maintenance pass\n  \
        maccare threats --fix                    Scan for malware and remediate\n  \
        maccare optimize                         Reclaim inactive memory\n  \
        maccare undo --last                      Restore the last cleanup\n  \
        maccare purge --expired                  Drop expired quarantine sessions\n  \
        maccare status                           Quarantine and system status"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Quiet mode, minimal output
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan for cleanable files
    Scan {
        /// Show individual paths in results
        #[arg(long)]
        detailed: bool,

        /// Only scan specific categories
        #[arg(long, value_delimiter = ',', value_parser = CleanupCategory::parse_slug)]
        categories: Option<Vec<CleanupCategory>>,
    },

    /// Scan and delete cleanable files
    Clean {
        /// Delete permanently instead of quarantining
        #[arg(long)]
        purge: bool,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,

        /// Only clean specific categories
        #[arg(long, value_delimiter = ',', value_parser = CleanupCategory::parse_slug)]
        categories: Option<Vec<CleanupCategory>>,

        /// Show what would be deleted without touching anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Run the full Smart Care pass: cleanup, memory, threats
    Care,

    /// Scan for known malware and adware
    Threats {
        /// Remove what the scan finds (asks per threat above low severity)
        #[arg(long)]
        fix: bool,

        /// Skip confirmation prompts
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Reclaim inactive memory
    Optimize,

    /// Restore quarantined files
    Undo {
        /// Restore the most recent session
        #[arg(long)]
        last: bool,

        /// Specific session ID to restore
        #[arg(long)]
        session: Option<String>,

        /// List all quarantine sessions
        #[arg(long)]
        list: bool,
    },

    /// Purge expired or all quarantine sessions
    Purge {
        /// Only purge expired sessions
        #[arg(long)]
        expired: bool,

        /// Purge ALL sessions (frees maximum space)
        #[arg(long)]
        all: bool,

        /// Purge a specific session by ID
        #[arg(long)]
        session: Option<String>,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show quarantine health and system stats
    Status,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset to default configuration
    Reset,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },

    /// Initialize MacCare directories and default config
    Init,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Quiet,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
