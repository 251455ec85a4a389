//! Time source abstraction.
//!
//! Week membership is always derived from a fresh clock reading at call time,
//! never cached, so a process that sleeps across Monday midnight picks up the
//! new week on its next operation.

use crate::model::week::{current_week_start, WeekStart};
use chrono::{DateTime, Local, NaiveDate, Utc};
use std::sync::Mutex;

/// Source of "now" for store, mirror and reconciliation.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Local calendar day used for week membership.
    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&Local).date_naive()
    }

    fn current_week(&self) -> WeekStart {
        current_week_start(self.today())
    }
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and CLI overrides.
///
/// `today` is tracked separately from `now` so week membership does not
/// depend on the host time zone.
#[derive(Debug)]
pub struct ManualClock {
    state: Mutex<(DateTime<Utc>, NaiveDate)>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>, today: NaiveDate) -> Self {
        Self {
            state: Mutex::new((now, today)),
        }
    }

    /// Clock pinned to noon UTC of `today`.
    pub fn on_day(today: NaiveDate) -> Self {
        let now = today
            .and_hms_opt(12, 0, 0)
            .map(|naive| naive.and_utc())
            .unwrap_or_else(Utc::now);
        Self::new(now, today)
    }

    pub fn set(&self, now: DateTime<Utc>, today: NaiveDate) {
        if let Ok(mut state) = self.state.lock() {
            *state = (now, today);
        }
    }

    /// Moves to noon UTC of `today`.
    pub fn set_day(&self, today: NaiveDate) {
        let now = today
            .and_hms_opt(12, 0, 0)
            .map(|naive| naive.and_utc())
            .unwrap_or_else(Utc::now);
        self.set(now, today);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.state.lock() {
            Ok(state) => state.0,
            Err(poisoned) => poisoned.into_inner().0,
        }
    }

    fn today(&self) -> NaiveDate {
        match self.state.lock() {
            Ok(state) => state.1,
            Err(poisoned) => poisoned.into_inner().1,
        }
    }
}
