use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Binary with $HOME pointed at a temp dir, so config, quarantine, and the
/// home-relative scan roots never touch the real account
fn maccare(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("maccare").unwrap();
    cmd.env("HOME", home.path());
    cmd
}

fn trash_dir(home: &Path) -> PathBuf {
    if cfg!(target_os = "macos") {
        home.join(".Trash")
    } else {
        home.join(".local/share/Trash")
    }
}

// ─── Help & version ──────────────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    maccare(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("clean"))
        .stdout(predicate::str::contains("care"))
        .stdout(predicate::str::contains("threats"))
        .stdout(predicate::str::contains("optimize"))
        .stdout(predicate::str::contains("undo"))
        .stdout(predicate::str::contains("purge"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("EXAMPLES"));
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    maccare(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("maccare"));
}

// ─── Scan command ────────────────────────────────────────────────────────────

#[test]
fn test_scan_json_with_empty_home() {
    let home = TempDir::new().unwrap();
    maccare(&home)
        .args(["scan", "--format", "json", "--categories", "trash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("item_count"))
        .stdout(predicate::str::contains("total_bytes"));
}

#[test]
fn test_scan_quiet_mode() {
    let home = TempDir::new().unwrap();
    maccare(&home)
        .args(["scan", "--quiet", "--format", "quiet", "--categories", "downloads"])
        .assert()
        .success();
}

#[test]
fn test_scan_invalid_category() {
    let home = TempDir::new().unwrap();
    maccare(&home)
        .args(["scan", "--categories", "nonexistent_xyz"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown category"));
}

// ─── Config command ──────────────────────────────────────────────────────────

#[test]
fn test_config_show() {
    let home = TempDir::new().unwrap();
    maccare(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("quarantine_retention_days"));
}

#[test]
fn test_config_set_round_trip() {
    let home = TempDir::new().unwrap();
    maccare(&home)
        .args(["config", "set", "quarantine_retention_days", "14"])
        .assert()
        .success();
    maccare(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("quarantine_retention_days = 14"));
}

#[test]
fn test_config_set_unknown_key() {
    let home = TempDir::new().unwrap();
    maccare(&home)
        .args(["config", "set", "no_such_key", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));
}

// ─── Status command ──────────────────────────────────────────────────────────

#[test]
fn test_status() {
    let home = TempDir::new().unwrap();
    maccare(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("MacCare Status"));
}

// ─── Undo command ────────────────────────────────────────────────────────────

#[test]
fn test_undo_list() {
    let home = TempDir::new().unwrap();
    maccare(&home)
        .args(["undo", "--list"])
        .assert()
        .success();
}

#[test]
fn test_undo_no_flags_shows_help() {
    let home = TempDir::new().unwrap();
    maccare(&home)
        .arg("undo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Undo"));
}

#[test]
fn test_undo_last_without_sessions_fails() {
    let home = TempDir::new().unwrap();
    maccare(&home)
        .args(["undo", "--last"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No sessions"));
}

// ─── Purge command ───────────────────────────────────────────────────────────

#[test]
fn test_purge_no_flags_shows_help() {
    let home = TempDir::new().unwrap();
    maccare(&home)
        .arg("purge")
        .assert()
        .success()
        .stdout(predicate::str::contains("Purge"));
}

#[test]
fn test_purge_expired_with_empty_store() {
    let home = TempDir::new().unwrap();
    maccare(&home)
        .args(["purge", "--expired"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No sessions to purge"));
}

// ─── Completions ─────────────────────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    maccare(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("maccare"));
}

// ─── Clean command ───────────────────────────────────────────────────────────

#[test]
fn test_clean_with_nothing_to_clean() {
    let home = TempDir::new().unwrap();
    maccare(&home)
        .args(["clean", "--yes", "--categories", "trash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to clean"));
}

#[test]
fn test_clean_dry_run_leaves_files_alone() {
    let home = TempDir::new().unwrap();
    let trash = trash_dir(home.path());
    fs::create_dir_all(trash.join("old-download")).unwrap();
    fs::write(trash.join("old-download/blob.bin"), vec![0u8; 300 * 1024]).unwrap();

    maccare(&home)
        .args(["clean", "--dry-run", "--no-color", "--categories", "trash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    assert!(trash.join("old-download/blob.bin").exists());
}

#[test]
fn test_clean_then_undo_round_trip() {
    let home = TempDir::new().unwrap();
    let trash = trash_dir(home.path());
    fs::create_dir_all(trash.join("old-download")).unwrap();
    fs::write(trash.join("old-download/blob.bin"), vec![0u8; 300 * 1024]).unwrap();

    maccare(&home)
        .args(["clean", "--yes", "--no-color", "--categories", "trash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Quarantined"))
        .stdout(predicate::str::contains("undo --session"));

    assert!(!trash.join("old-download").exists());

    maccare(&home)
        .args(["undo", "--last", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored"));

    let restored = trash.join("old-download/blob.bin");
    assert!(restored.exists());
    assert_eq!(fs::metadata(&restored).unwrap().len(), 300 * 1024);
}

#[test]
fn test_clean_purge_deletes_permanently() {
    let home = TempDir::new().unwrap();
    let trash = trash_dir(home.path());
    fs::create_dir_all(trash.join("old-download")).unwrap();
    fs::write(trash.join("old-download/blob.bin"), vec![0u8; 300 * 1024]).unwrap();

    maccare(&home)
        .args(["clean", "--yes", "--purge", "--no-color", "--categories", "trash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Purged"));

    assert!(!trash.join("old-download").exists());

    // nothing quarantined, so there is nothing to undo
    maccare(&home)
        .args(["undo", "--last"])
        .assert()
        .failure();
}

// ─── Invalid invocations ─────────────────────────────────────────────────────

#[test]
fn test_no_subcommand_shows_help() {
    let home = TempDir::new().unwrap();
    maccare(&home)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
