mod common;

use common::{day, harness, week};
use std::time::{Duration, Instant};
use weekly_intention_core::{
    Clock, IntentionRecord, ReachabilityMonitor, ReconcileOutcome, RemoteChange, SyncStatus,
    PLACEHOLDER_TEXT,
};

#[test]
fn saving_current_week_writes_mirror_before_returning() {
    let h = harness();
    let current = h.app.current_week();

    h.app.save(current, "  calm focus ").unwrap();

    let snapshot = h.app.mirror().read();
    assert_eq!(snapshot.week_start, current);
    assert_eq!(snapshot.text, "calm focus");
    assert_eq!(snapshot.updated_at, Some(h.clock.now()));
    assert_eq!(h.signal.count(), 1);
}

#[test]
fn saving_other_weeks_never_touches_mirror() {
    let h = harness();
    let current = h.app.current_week();

    h.app.save(current.offset(-1), "past").unwrap();
    h.app.save(current.offset(3), "future").unwrap();

    assert_eq!(h.signal.count(), 0);
    assert_eq!(h.app.mirror().read().updated_at, None);
}

#[test]
fn foreground_resume_twice_writes_once() {
    let h = harness();
    let current = h.app.current_week();
    h.app
        .store()
        .ingest_remote(&[RemoteChange::Upsert(IntentionRecord::new(
            current, "synced", 1,
        ))])
        .unwrap();

    assert_eq!(h.app.resume_foreground(), ReconcileOutcome::Written);
    assert_eq!(h.app.resume_foreground(), ReconcileOutcome::Unchanged);
    assert_eq!(h.signal.count(), 1);
    assert_eq!(h.app.mirror().read().text, "synced");
}

#[test]
fn foreground_with_empty_store_keeps_placeholder() {
    let h = harness();

    assert_eq!(h.app.intention(h.app.current_week()).unwrap(), "");
    assert_eq!(h.app.resume_foreground(), ReconcileOutcome::Unchanged);

    let snapshot = h.app.mirror().read();
    assert_eq!(snapshot.text, "");
    assert_eq!(snapshot.updated_at, None);
    assert_eq!(h.app.companion().timeline().display_text(), PLACEHOLDER_TEXT);
}

#[test]
fn whitespace_save_clears_record_and_mirror() {
    let h = harness();
    let current = h.app.current_week();
    h.app.save(current, "focus").unwrap();

    h.app.save(current, "   ").unwrap();

    assert_eq!(h.app.intention(current).unwrap(), "");
    let snapshot = h.app.mirror().read();
    assert_eq!(snapshot.text, "");
    assert!(snapshot.updated_at.is_some());
    assert_eq!(h.signal.count(), 2);
}

#[test]
fn remote_arrival_for_current_week_surfaces_without_local_save() {
    let h = harness();
    let current = h.app.current_week();
    let record = IntentionRecord::new(current, "from laptop", 10);

    let outcome = h
        .app
        .apply_remote_changes(&[RemoteChange::Upsert(record.clone())])
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::Written);
    assert_eq!(h.app.companion().timeline().display_text(), "from laptop");

    let repeat = h
        .app
        .apply_remote_changes(&[RemoteChange::Upsert(record)])
        .unwrap();
    assert_eq!(repeat, ReconcileOutcome::Unchanged);
    assert_eq!(h.signal.count(), 1);
}

#[test]
fn remote_arrival_for_other_week_is_ignored() {
    let h = harness();
    let past = IntentionRecord::new(h.app.current_week().offset(-4), "old", 10);

    let outcome = h
        .app
        .apply_remote_changes(&[RemoteChange::Upsert(past)])
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::Unchanged);
    assert_eq!(h.signal.count(), 0);
}

#[test]
fn new_week_after_long_sleep_rewrites_stale_mirror() {
    let h = harness();
    h.app.save(h.app.current_week(), "last week focus").unwrap();

    h.clock.set_day(day(2026, 10, 20));
    assert_eq!(h.app.companion().timeline().display_text(), PLACEHOLDER_TEXT);

    assert_eq!(h.app.resume_foreground(), ReconcileOutcome::Written);
    let snapshot = h.app.mirror().read();
    assert_eq!(snapshot.week_start, week(2026, 10, 19));
    assert_eq!(snapshot.text, "");
}

#[test]
fn store_read_failure_skips_the_pass() {
    let h = harness();
    h.app
        .store()
        .repo()
        .connection()
        .execute_batch("DROP TABLE intentions;")
        .unwrap();

    assert_eq!(h.app.resume_foreground(), ReconcileOutcome::Skipped);
    assert_eq!(h.signal.count(), 0);
}

#[test]
fn reachability_drives_status_label_without_touching_data() {
    let mut h = harness();
    let monitor = ReachabilityMonitor::new();
    h.app.attach_reachability(monitor.subscribe());
    let start = Instant::now();

    assert_eq!(h.app.pump_reachability(start), SyncStatus::Idle);

    monitor.publish(false);
    assert_eq!(h.app.pump_reachability(start), SyncStatus::Offline);
    assert_eq!(h.app.status_label(), Some("Offline"));
    h.app.save(h.app.current_week(), "offline edit").unwrap();

    monitor.publish(true);
    assert_eq!(h.app.pump_reachability(start), SyncStatus::Resyncing);
    assert_eq!(h.app.status_label(), Some("Syncing…"));

    let settled = start + Duration::from_millis(1200);
    assert_eq!(h.app.pump_reachability(settled), SyncStatus::Idle);
    assert_eq!(h.app.status_label(), None);
    assert_eq!(h.app.mirror().read().text, "offline edit");
}

#[test]
fn failed_remote_batch_leaves_store_and_mirror_untouched() {
    let h = harness();
    let current = h.app.current_week();
    h.app.save(current, "local focus").unwrap();
    h.app
        .store()
        .repo()
        .connection()
        .execute_batch(
            "CREATE TRIGGER reject_remote BEFORE INSERT ON intentions
             WHEN NEW.text = 'rejected'
             BEGIN SELECT RAISE(ABORT, 'rejected by test'); END;",
        )
        .unwrap();

    let batch = [
        RemoteChange::Upsert(IntentionRecord::new(current, "from laptop", 0)),
        RemoteChange::Upsert(IntentionRecord::new(current.offset(-1), "rejected", 0)),
    ];
    assert!(h.app.apply_remote_changes(&batch).is_err());

    assert_eq!(h.app.intention(current).unwrap(), "local focus");
    assert_eq!(h.app.mirror().read().text, "local focus");
    assert_eq!(h.signal.count(), 1);
}
