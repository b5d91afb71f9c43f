use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::model::QuarantinePolicy;

/// Global MacCare configuration, loaded from `~/.maccare/config.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Disposition of removed files when `clean` is run without a flag
    #[serde(default = "default_policy")]
    pub default_policy: QuarantinePolicy,

    /// Days a quarantine session is kept before it may be purged
    #[serde(default = "default_retention_days")]
    pub quarantine_retention_days: u32,

    /// Smallest entry the enumerator reports, in KB
    #[serde(default = "default_min_item_kb")]
    pub min_item_size_kb: u64,

    /// How deep the enumerator walks under each category root
    #[serde(default = "default_scan_depth")]
    pub scan_depth: usize,

    /// Paths the enumerator must skip
    #[serde(default)]
    pub exclude_paths: Vec<String>,
}

fn default_policy() -> QuarantinePolicy {
    QuarantinePolicy::Quarantine
}
fn default_retention_days() -> u32 {
    7
}
fn default_min_item_kb() -> u64 {
    100
}
fn default_scan_depth() -> usize {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_policy: default_policy(),
            quarantine_retention_days: default_retention_days(),
            min_item_size_kb: default_min_item_kb(),
            scan_depth: default_scan_depth(),
            exclude_paths: Vec::new(),
        }
    }
}

impl Config {
    /// The MacCare data directory (~/.maccare)
    pub fn data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".maccare")
    }

    pub fn config_path() -> PathBuf {
        Self::data_dir().join("config.toml")
    }

    /// Default root of the recoverable quarantine area
    pub fn quarantine_dir() -> PathBuf {
        Self::data_dir().join("quarantine")
    }

    pub fn logs_dir() -> PathBuf {
        Self::data_dir().join("logs")
    }

    /// Load config from disk, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        let dir = path.parent().unwrap();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config dir: {}", dir.display()))?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Create the data, quarantine, and logs directories
    pub fn init_dirs() -> Result<()> {
        for dir in [Self::data_dir(), Self::quarantine_dir(), Self::logs_dir()] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }

    pub fn min_item_size_bytes(&self) -> u64 {
        self.min_item_size_kb * 1024
    }

    /// Whether the enumerator must skip this path
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path_str = path.display().to_string();
        self.exclude_paths.iter().any(|p| path_str.contains(p))
    }
}
