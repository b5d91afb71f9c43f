use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use walkdir::WalkDir;

use crate::channel::ChannelError;
use crate::common::config::Config;
use crate::model::{CleanableItem, CleanupCategory};

// ─── Category roots ───────────────────────────────────────────────────────────

/// Filesystem roots enumerated for a category
#[cfg(target_os = "macos")]
pub fn category_roots(category: CleanupCategory) -> Vec<PathBuf> {
    let home = dirs::home_dir();
    match category {
        CleanupCategory::SystemCaches => vec![
            PathBuf::from("/Library/Caches"),
            PathBuf::from("/private/var/folders"),
        ],
        CleanupCategory::UserCaches => home_paths(home, &["Library/Caches"]),
        CleanupCategory::Logs => {
            let mut roots = vec![PathBuf::from("/Library/Logs"), PathBuf::from("/private/var/log")];
            roots.extend(home_paths(home, &["Library/Logs"]));
            roots
        }
        CleanupCategory::Trash => home_paths(home, &[".Trash"]),
        CleanupCategory::Downloads => home_paths(home, &["Downloads"]),
        CleanupCategory::DeveloperCaches => home_paths(
            home,
            &[
                ".npm",
                ".yarn/cache",
                ".cargo/registry",
                ".gradle/caches",
                "Library/Developer/Xcode/DerivedData",
                "Library/Developer/CoreSimulator/Caches",
            ],
        ),
        CleanupCategory::BrowserData => home_paths(
            home,
            &[
                "Library/Caches/Google/Chrome",
                "Library/Caches/Firefox",
                "Library/Caches/com.apple.Safari",
            ],
        ),
        CleanupCategory::ApplicationSupport => {
            home_paths(home, &["Library/Application Support/CrashReporter"])
        }
    }
}

/// Linux-flavored equivalents, also used on any other non-mac unix
#[cfg(not(target_os = "macos"))]
pub fn category_roots(category: CleanupCategory) -> Vec<PathBuf> {
    let home = dirs::home_dir();
    match category {
        CleanupCategory::SystemCaches => vec![PathBuf::from("/var/cache")],
        CleanupCategory::UserCaches => home_paths(home, &[".cache"]),
        CleanupCategory::Logs => vec![PathBuf::from("/var/log")],
        CleanupCategory::Trash => home_paths(home, &[".local/share/Trash"]),
        CleanupCategory::Downloads => home_paths(home, &["Downloads"]),
        CleanupCategory::DeveloperCaches => home_paths(
            home,
            &[
                ".npm",
                ".yarn/cache",
                ".cargo/registry",
                ".gradle/caches",
                ".cache/pip",
            ],
        ),
        CleanupCategory::BrowserData => home_paths(
            home,
            &[".cache/google-chrome", ".cache/chromium", ".cache/mozilla"],
        ),
        CleanupCategory::ApplicationSupport => home_paths(home, &[".local/share/recently-used.xbel.bak"]),
    }
}

fn home_paths(home: Option<PathBuf>, relative: &[&str]) -> Vec<PathBuf> {
    match home {
        Some(home) => relative.iter().map(|r| home.join(r)).collect(),
        None => Vec::new(),
    }
}

// ─── Enumeration ──────────────────────────────────────────────────────────────

/// Enumerate cleanable items for one category. Roots are walked in
/// parallel; a missing root yields nothing, an unreadable one fails the
/// whole category.
pub fn scan_category(
    config: &Config,
    category: CleanupCategory,
) -> Result<Vec<CleanableItem>, ChannelError> {
    let roots: Vec<PathBuf> = category_roots(category)
        .into_iter()
        .filter(|r| r.exists())
        .collect();

    let collected = Mutex::new(Vec::new());
    let failure = Mutex::new(None::<String>);

    roots.par_iter().for_each(|root| match scan_root(config, category, root) {
        Ok(mut items) => collected.lock().unwrap().append(&mut items),
        Err(e) => {
            let mut failure = failure.lock().unwrap();
            failure.get_or_insert(format!("{}: {}", root.display(), e));
        }
    });

    if let Some(message) = failure.into_inner().unwrap() {
        return Err(ChannelError::Enumeration { category, message });
    }

    let mut items = collected.into_inner().unwrap();
    items.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
    Ok(items)
}

/// One candidate item per immediate child of the root, so every reported
/// path can be deleted as a unit
fn scan_root(
    config: &Config,
    category: CleanupCategory,
    root: &Path,
) -> std::io::Result<Vec<CleanableItem>> {
    let mut items = Vec::new();

    for entry in std::fs::read_dir(root)? {
        let Ok(entry) = entry else { continue };
        let path = entry.path();
        if config.is_excluded(&path) {
            continue;
        }

        let size = walk_size(&path, config.scan_depth);
        if size < config.min_item_size_bytes() {
            continue;
        }

        let modified = entry
            .metadata()
            .ok()
            .and_then(|m| m.modified().ok())
            .map(DateTime::<Utc>::from);

        items.push(CleanableItem {
            category,
            path,
            size,
            modified,
        });
    }

    Ok(items)
}

// ─── Sizing ───────────────────────────────────────────────────────────────────

/// Physical size of everything under a path, bounded by depth
pub fn walk_size(path: &Path, max_depth: usize) -> u64 {
    WalkDir::new(path)
        .max_depth(max_depth)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.metadata().map(|m| physical_size(&m)).unwrap_or(0))
        .sum()
}

/// Full physical size of a file or directory tree
pub fn dir_size(path: &Path) -> u64 {
    walk_size(path, usize::MAX)
}

#[cfg(unix)]
fn physical_size(metadata: &std::fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.blocks() * 512
}

#[cfg(not(unix))]
fn physical_size(metadata: &std::fs::Metadata) -> u64 {
    metadata.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn dir_size_counts_nested_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.bin"), vec![0u8; 4096]).unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("sub/b.bin"), vec![0u8; 4096]).unwrap();

        assert!(dir_size(tmp.path()) >= 8192);
    }

    #[test]
    fn dir_size_of_missing_path_is_zero() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(dir_size(&tmp.path().join("nope")), 0);
    }

    #[test]
    fn scan_root_reports_large_children_only() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("big")).unwrap();
        fs::write(tmp.path().join("big/data.bin"), vec![0u8; 300 * 1024]).unwrap();
        fs::create_dir(tmp.path().join("small")).unwrap();
        fs::write(tmp.path().join("small/data.bin"), b"tiny").unwrap();

        let config = Config::default(); // 100 KB minimum
        let items =
            scan_root(&config, CleanupCategory::UserCaches, tmp.path()).unwrap();

        assert_eq!(items.len(), 1);
        assert!(items[0].path.ends_with("big"));
        assert!(items[0].size >= 300 * 1024);
        assert!(items[0].modified.is_some());
    }

    #[test]
    fn scan_root_honors_excludes() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("keepme")).unwrap();
        fs::write(tmp.path().join("keepme/data.bin"), vec![0u8; 300 * 1024]).unwrap();

        let config = Config {
            exclude_paths: vec!["keepme".into()],
            ..Config::default()
        };
        let items =
            scan_root(&config, CleanupCategory::UserCaches, tmp.path()).unwrap();
        assert!(items.is_empty());
    }
}
