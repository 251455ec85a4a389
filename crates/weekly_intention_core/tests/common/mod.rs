#![allow(dead_code)]

use chrono::NaiveDate;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use weekly_intention_core::{
    Clock, FileMirrorMedium, IntentionApp, ManualClock, MirrorMedium, RefreshSignal, WeekStart,
    WidgetMirror,
};

pub const KIND: &str = "WeeklyIntentionWidget";

/// Refresh signal that counts reloads.
#[derive(Default)]
pub struct CountingSignal {
    reloads: AtomicUsize,
}

impl CountingSignal {
    pub fn count(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl RefreshSignal for CountingSignal {
    fn reload(&self, kind: &str) {
        assert_eq!(kind, KIND);
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn week(y: i32, m: u32, d: u32) -> WeekStart {
    WeekStart::containing(day(y, m, d))
}

/// Thursday 2026-10-15; current week starts Monday 2026-10-12.
pub fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::on_day(day(2026, 10, 15)))
}

pub fn file_mirror(
    root: &Path,
    clock: Arc<ManualClock>,
) -> (Arc<WidgetMirror>, Arc<CountingSignal>) {
    let signal = Arc::new(CountingSignal::default());
    let medium: Arc<dyn MirrorMedium> =
        Arc::new(FileMirrorMedium::open(root, "group.test").unwrap());
    let mirror = WidgetMirror::new(Some(medium), signal.clone(), KIND, clock as Arc<dyn Clock>);
    (Arc::new(mirror), signal)
}

pub struct Harness {
    pub app: IntentionApp,
    pub clock: Arc<ManualClock>,
    pub signal: Arc<CountingSignal>,
    pub dir: tempfile::TempDir,
}

pub fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let clock = clock();
    let (mirror, signal) = file_mirror(dir.path(), clock.clone());
    let conn = weekly_intention_core::db::open_db_in_memory().unwrap();
    let app = IntentionApp::with_parts(conn, mirror, clock.clone());
    Harness {
        app,
        clock,
        signal,
        dir,
    }
}
