use std::path::PathBuf;

use crate::channel::ChannelError;
use crate::common::safety;
use crate::model::{SecurityThreat, ThreatKind, ThreatSeverity};

// ─── Signatures ───────────────────────────────────────────────────────────────

struct Signature {
    family: &'static str,
    pattern: &'static str,
    severity: ThreatSeverity,
}

/// Known adware and PUP families, matched case-insensitively against
/// file names in the scanned locations
const SIGNATURES: &[Signature] = &[
    Signature { family: "MacKeeper", pattern: "mackeeper", severity: ThreatSeverity::Low },
    Signature { family: "Conduit", pattern: "conduit", severity: ThreatSeverity::Low },
    Signature { family: "InstallMac", pattern: "installmac", severity: ThreatSeverity::Low },
    Signature { family: "Genieo", pattern: "genieo", severity: ThreatSeverity::Medium },
    Signature { family: "VSearch", pattern: "vsearch", severity: ThreatSeverity::Medium },
    Signature { family: "Bundlore", pattern: "bundlore", severity: ThreatSeverity::Medium },
    Signature { family: "Pirrit", pattern: "pirrit", severity: ThreatSeverity::Medium },
    Signature { family: "Mughthesec", pattern: "mughthesec", severity: ThreatSeverity::Medium },
    Signature { family: "Shlayer", pattern: "shlayer", severity: ThreatSeverity::High },
    Signature { family: "CoinMiner", pattern: "mshelper", severity: ThreatSeverity::High },
];

fn match_signature(file_name: &str) -> Option<&'static Signature> {
    let lowered = file_name.to_lowercase();
    SIGNATURES.iter().find(|s| lowered.contains(s.pattern))
}

/// Persistence mechanisms are worse than loose files, whatever the family
fn floor_for(kind: ThreatKind) -> ThreatSeverity {
    match kind {
        ThreatKind::LaunchDaemon | ThreatKind::KernelExtension => ThreatSeverity::High,
        ThreatKind::LaunchAgent | ThreatKind::BrowserExtension => ThreatSeverity::Medium,
        ThreatKind::SuspiciousFile => ThreatSeverity::Low,
    }
}

// ─── Locations ────────────────────────────────────────────────────────────────

#[cfg(target_os = "macos")]
fn threat_locations() -> Vec<(PathBuf, ThreatKind)> {
    let mut locations = vec![
        (PathBuf::from("/Library/LaunchDaemons"), ThreatKind::LaunchDaemon),
        (PathBuf::from("/Library/LaunchAgents"), ThreatKind::LaunchAgent),
        (PathBuf::from("/Library/Extensions"), ThreatKind::KernelExtension),
    ];
    if let Some(home) = dirs::home_dir() {
        locations.push((home.join("Library/LaunchAgents"), ThreatKind::LaunchAgent));
        locations.push((
            home.join("Library/Application Support"),
            ThreatKind::SuspiciousFile,
        ));
    }
    locations
}

#[cfg(not(target_os = "macos"))]
fn threat_locations() -> Vec<(PathBuf, ThreatKind)> {
    let mut locations = vec![
        (PathBuf::from("/etc/systemd/system"), ThreatKind::LaunchDaemon),
        (PathBuf::from("/etc/xdg/autostart"), ThreatKind::LaunchAgent),
    ];
    if let Some(home) = dirs::home_dir() {
        locations.push((home.join(".config/autostart"), ThreatKind::LaunchAgent));
        locations.push((home.join(".local/share"), ThreatKind::SuspiciousFile));
    }
    locations
}

// ─── Scan and removal ─────────────────────────────────────────────────────────

/// Walk the known persistence and drop locations, matching file names
/// against the signature table. Locations that do not exist or cannot be
/// read are skipped; a threat scan reports what it can see.
pub fn scan() -> Result<Vec<SecurityThreat>, ChannelError> {
    let mut threats = Vec::new();

    for (location, kind) in threat_locations() {
        let Ok(entries) = std::fs::read_dir(&location) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(signature) = match_signature(file_name) else {
                continue;
            };
            threats.push(SecurityThreat {
                name: signature.family.to_string(),
                kind,
                severity: signature.severity.max(floor_for(kind)),
                path,
            });
        }
    }

    threats.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(threats)
}

/// Delete the file or directory behind a threat. Only paths inside the
/// scanned locations are eligible; anything else is refused.
pub fn remove(threat: &SecurityThreat) -> Result<(), ChannelError> {
    let path = &threat.path;

    if safety::is_protected(path) {
        return Err(ChannelError::Internal(format!(
            "refusing to remove protected path: {}",
            path.display()
        )));
    }
    if !threat_locations().iter().any(|(root, _)| path.starts_with(root)) {
        return Err(ChannelError::Internal(format!(
            "path is outside known threat locations: {}",
            path.display()
        )));
    }
    if !path.exists() {
        return Ok(());
    }

    if path.is_dir() {
        std::fs::remove_dir_all(path)?;
    } else {
        std::fs::remove_file(path)?;
    }
    tracing::info!(path = %path.display(), family = %threat.name, "removed threat");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signatures_match_case_insensitively() {
        assert_eq!(match_signature("com.MacKeeper.plist").unwrap().family, "MacKeeper");
        assert_eq!(match_signature("GENIEO.agent").unwrap().family, "Genieo");
        assert!(match_signature("com.apple.Safari.plist").is_none());
    }

    #[test]
    fn daemons_are_at_least_high_severity() {
        // MacKeeper is Low on its own, but a daemon slot escalates it
        let base = match_signature("mackeeper").unwrap().severity;
        assert_eq!(base, ThreatSeverity::Low);
        assert_eq!(base.max(floor_for(ThreatKind::LaunchDaemon)), ThreatSeverity::High);
        assert_eq!(base.max(floor_for(ThreatKind::SuspiciousFile)), ThreatSeverity::Low);
    }

    #[test]
    fn removal_refuses_paths_outside_threat_locations() {
        let threat = SecurityThreat {
            name: "MacKeeper".into(),
            kind: ThreatKind::SuspiciousFile,
            severity: ThreatSeverity::Low,
            path: PathBuf::from("/definitely/not/a/threat/location"),
        };
        assert!(remove(&threat).is_err());
    }
}
