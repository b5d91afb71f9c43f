use std::path::Path;

/// Roots that must never be an explicit delete target, on any platform.
/// Last line of defense against bad paths reaching the privileged side.
const PROTECTED_ROOTS: &[&str] = &[
    "/",
    "/System",
    "/Applications",
    "/Users",
    "/Library",
    "/usr",
    "/bin",
    "/sbin",
    "/var",
    "/etc",
    "/opt",
    "/private",
    "/Volumes",
    "/home",
    "/root",
    "/boot",
    "/proc",
    "/sys",
    "/dev",
];

/// Home subdirectories holding user data or credentials
const PROTECTED_HOME_DIRS: &[&str] = &[
    "Desktop",
    "Documents",
    "Downloads",
    "Pictures",
    "Music",
    "Movies",
    "Library",
    "Applications",
    ".ssh",
    ".gnupg",
    ".config",
];

/// Whether a path may never be deleted. Matches the path itself, not its
/// descendants: items inside a protected root are legitimate targets, the
/// root is not.
pub fn is_protected(path: &Path) -> bool {
    let path_str = path.to_string_lossy();

    if PROTECTED_ROOTS.iter().any(|p| path_str == *p) {
        return true;
    }

    if let Some(home) = dirs::home_dir() {
        if path == home {
            return true;
        }
        if PROTECTED_HOME_DIRS.iter().any(|d| path == home.join(d)) {
            return true;
        }
    }

    false
}

/// Bytes above which a cleanup asks for an extra confirmation (50 GB)
pub const BYTES_WARNING_THRESHOLD: u64 = 50 * 1024 * 1024 * 1024;

pub fn exceeds_warning_threshold(total_bytes: u64) -> bool {
    total_bytes > BYTES_WARNING_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_protected() {
        assert!(is_protected(Path::new("/")));
    }

    #[test]
    fn system_roots_protected() {
        assert!(is_protected(Path::new("/System")));
        assert!(is_protected(Path::new("/Users")));
        assert!(is_protected(Path::new("/Library")));
        assert!(is_protected(Path::new("/etc")));
    }

    #[test]
    fn home_dirs_protected() {
        if let Some(home) = dirs::home_dir() {
            assert!(is_protected(&home));
            assert!(is_protected(&home.join("Documents")));
            assert!(is_protected(&home.join(".ssh")));
        }
    }

    #[test]
    fn cache_entries_not_protected() {
        if let Some(home) = dirs::home_dir() {
            assert!(!is_protected(&home.join("Library/Caches/com.example.app")));
            assert!(!is_protected(&home.join(".Trash/old.dmg")));
        }
        assert!(!is_protected(Path::new("/tmp/scratch")));
    }

    #[test]
    fn warning_threshold_boundary() {
        assert!(!exceeds_warning_threshold(BYTES_WARNING_THRESHOLD));
        assert!(exceeds_warning_threshold(BYTES_WARNING_THRESHOLD + 1));
    }
}
