use chrono::Utc;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use maccare::quarantine::{QuarantineManifest, QuarantineStore};

fn store_in(tmp: &TempDir) -> QuarantineStore {
    QuarantineStore::new(tmp.path().join("quarantine"), tmp.path().join("logs"))
}

/// Plant a session directory with a hand-written manifest, so tests can
/// control ids and expiry without waiting out the clock
fn fabricate_session(store: &QuarantineStore, logs: &Path, id: &str, expired: bool) {
    let mut manifest = QuarantineManifest::new(7);
    manifest.session_id = id.to_string();
    if expired {
        manifest.expires_at = Some(Utc::now() - chrono::Duration::days(1));
    }
    manifest.total_files = 1;
    manifest.total_bytes = 512;

    let dir = store.root().join(id);
    fs::create_dir_all(dir.join("files")).unwrap();
    fs::write(dir.join("files/000001"), vec![0u8; 512]).unwrap();
    manifest.save(&dir, logs).unwrap();
}

// ─── Staging ──────────────────────────────────────────────────────────────────

#[test]
fn stage_and_finish_writes_a_manifest() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    let victim = tmp.path().join("junk.log");
    fs::write(&victim, b"old log data").unwrap();

    let mut session = store.begin_session(7).unwrap();
    session.stage(&victim, 12).unwrap();
    assert_eq!(session.staged_files(), 1);
    assert_eq!(session.staged_bytes(), 12);

    let id = session.finish().unwrap().expect("staged session keeps its id");
    assert!(!victim.exists());

    let manifest = QuarantineManifest::load(&store.root().join(&id)).unwrap();
    assert_eq!(manifest.total_files, 1);
    assert_eq!(manifest.total_bytes, 12);
    assert!(!manifest.restored);
    assert!(!manifest.is_expired());
    assert_eq!(manifest.entries.len(), 1);
    assert!(manifest.entries[0].success);
}

#[test]
fn empty_session_leaves_nothing_behind() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);

    let session = store.begin_session(7).unwrap();
    let dir = store.root().join(session.id());
    assert!(dir.exists());

    assert!(session.finish().unwrap().is_none());
    assert!(!dir.exists());
}

#[test]
fn staging_a_missing_path_records_the_failure() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);

    let mut session = store.begin_session(7).unwrap();
    let result = session.stage(&tmp.path().join("never-existed"), 0);
    assert!(result.is_err());
    assert_eq!(session.staged_files(), 0);

    // nothing staged successfully, so the session evaporates
    assert!(session.finish().unwrap().is_none());
}

// ─── Restore ──────────────────────────────────────────────────────────────────

#[test]
fn restore_puts_files_and_directories_back() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);

    let file = tmp.path().join("report.txt");
    fs::write(&file, b"quarterly numbers").unwrap();
    let dir = tmp.path().join("cache-dir");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("blob.bin"), vec![1u8; 64]).unwrap();

    let mut session = store.begin_session(7).unwrap();
    session.stage(&file, 17).unwrap();
    session.stage(&dir, 64).unwrap();
    let id = session.finish().unwrap().unwrap();
    assert!(!file.exists());
    assert!(!dir.exists());

    let report = store.restore_session(&id).unwrap();
    assert_eq!(report.restored_count, 2);
    assert_eq!(report.restored_bytes, 81);
    assert!(report.errors.is_empty());

    assert_eq!(fs::read(&file).unwrap(), b"quarterly numbers");
    assert_eq!(fs::read(dir.join("blob.bin")).unwrap(), vec![1u8; 64]);

    // a second restore of the same session is refused
    let err = store.restore_session(&id).unwrap_err();
    assert!(err.to_string().contains("already been restored"));
}

#[test]
fn restore_refuses_to_overwrite_a_recreated_path() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);

    let file = tmp.path().join("settings.toml");
    fs::write(&file, b"old contents").unwrap();

    let mut session = store.begin_session(7).unwrap();
    session.stage(&file, 12).unwrap();
    let id = session.finish().unwrap().unwrap();

    // the app recreated its file in the meantime
    fs::write(&file, b"fresh contents").unwrap();

    let report = store.restore_session(&id).unwrap();
    assert_eq!(report.restored_count, 0);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("won't overwrite"));

    assert_eq!(fs::read(&file).unwrap(), b"fresh contents");
}

#[test]
fn most_recent_session_skips_restored_ones() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    let logs = tmp.path().join("logs");

    fabricate_session(&store, &logs, "2026-01-01T10-00-00", false);
    fabricate_session(&store, &logs, "2026-01-02T10-00-00", false);

    // manifest timestamps, not directory order, decide recency
    let mut newest = QuarantineManifest::load(&store.root().join("2026-01-02T10-00-00")).unwrap();
    newest.timestamp = Utc::now();
    let mut older = QuarantineManifest::load(&store.root().join("2026-01-01T10-00-00")).unwrap();
    older.timestamp = Utc::now() - chrono::Duration::hours(2);
    newest
        .save(&store.root().join("2026-01-02T10-00-00"), &logs)
        .unwrap();
    older
        .save(&store.root().join("2026-01-01T10-00-00"), &logs)
        .unwrap();

    assert_eq!(
        store.most_recent_session().unwrap().as_deref(),
        Some("2026-01-02T10-00-00")
    );

    let mut restored = QuarantineManifest::load(&store.root().join("2026-01-02T10-00-00")).unwrap();
    restored.restored = true;
    restored
        .save(&store.root().join("2026-01-02T10-00-00"), &logs)
        .unwrap();

    assert_eq!(
        store.most_recent_session().unwrap().as_deref(),
        Some("2026-01-01T10-00-00")
    );
}

// ─── Purge ────────────────────────────────────────────────────────────────────

#[test]
fn purge_expired_leaves_active_sessions_alone() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    let logs = tmp.path().join("logs");

    fabricate_session(&store, &logs, "2020-01-01T00-00-00", true);
    fabricate_session(&store, &logs, "2026-06-01T00-00-00", false);

    let report = store.purge_expired().unwrap();
    assert_eq!(report.purged_sessions.len(), 1);
    assert_eq!(report.purged_sessions[0].session_id, "2020-01-01T00-00-00");
    assert!(report.total_bytes_freed >= 512);

    assert!(!store.root().join("2020-01-01T00-00-00").exists());
    assert!(store.root().join("2026-06-01T00-00-00").exists());
}

#[test]
fn purge_all_empties_the_store() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    let logs = tmp.path().join("logs");

    fabricate_session(&store, &logs, "2026-01-01T00-00-00", false);
    fabricate_session(&store, &logs, "2026-01-02T00-00-00", false);

    let report = store.purge_all().unwrap();
    assert_eq!(report.purged_sessions.len(), 2);
    assert!(store.list_sessions().unwrap().is_empty());
}

#[test]
fn purge_session_returns_bytes_freed() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    let logs = tmp.path().join("logs");

    fabricate_session(&store, &logs, "2026-03-01T00-00-00", false);
    let freed = store.purge_session("2026-03-01T00-00-00").unwrap();
    assert!(freed >= 512);

    assert!(store.purge_session("2026-03-01T00-00-00").is_err());
}

// ─── Listing and health ───────────────────────────────────────────────────────

#[test]
fn empty_store_lists_nothing() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);

    assert!(store.list_sessions().unwrap().is_empty());
    assert!(store.most_recent_session().unwrap().is_none());

    let health = store.health().unwrap();
    assert_eq!(health.session_count, 0);
    assert_eq!(health.staged_bytes, 0);
}

#[test]
fn health_counts_expired_and_restored() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    let logs = tmp.path().join("logs");

    fabricate_session(&store, &logs, "2020-01-01T00-00-00", true);
    fabricate_session(&store, &logs, "2026-06-01T00-00-00", false);

    let mut restored = QuarantineManifest::load(&store.root().join("2026-06-01T00-00-00")).unwrap();
    restored.restored = true;
    restored
        .save(&store.root().join("2026-06-01T00-00-00"), &logs)
        .unwrap();

    let health = store.health().unwrap();
    assert_eq!(health.session_count, 2);
    assert_eq!(health.expired_count, 1);
    assert_eq!(health.restored_count, 1);
    assert!(health.staged_bytes > 0);
}

// ─── Session log ──────────────────────────────────────────────────────────────

#[test]
fn finished_sessions_append_to_the_daily_log() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    let victim = tmp.path().join("junk.log");
    fs::write(&victim, b"x").unwrap();

    let mut session = store.begin_session(7).unwrap();
    session.stage(&victim, 1).unwrap();
    session.finish().unwrap();

    let log_path = fs::read_dir(tmp.path().join("logs"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .find(|p| {
            p.file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with("sessions-"))
        })
        .expect("finish appends to a daily log");
    let contents = fs::read_to_string(log_path).unwrap();
    assert_eq!(contents.lines().count(), 1);
    assert!(contents.contains("junk.log"));
}
