//! Companion surface read path.
//!
//! The companion (home-screen widget) runs in its own process, reads the
//! mirror only, and refreshes on its own schedule in addition to refresh
//! signals.
//!
//! # Invariants
//! - Never writes the mirror.
//! - A snapshot for a week other than the current one is shown as empty,
//!   so a surface woken after a long sleep does not show last week's text.

use crate::clock::Clock;
use crate::mirror::MirrorReader;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Shown when there is no intention for the current week.
pub const PLACEHOLDER_TEXT: &str = "Set this week’s intention";

/// Periodic refresh interval, independent of refresh signals.
pub const REFRESH_INTERVAL_MINUTES: i64 = 30;

/// One display frame for the companion surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub date: DateTime<Utc>,
    /// Current-week intention, empty when unset or stale.
    pub intention: String,
    pub next_refresh: DateTime<Utc>,
}

impl TimelineEntry {
    pub fn display_text(&self) -> &str {
        if self.intention.is_empty() {
            PLACEHOLDER_TEXT
        } else {
            &self.intention
        }
    }
}

pub struct CompanionSurface {
    reader: Arc<dyn MirrorReader>,
    clock: Arc<dyn Clock>,
}

impl CompanionSurface {
    pub fn new(reader: Arc<dyn MirrorReader>, clock: Arc<dyn Clock>) -> Self {
        Self { reader, clock }
    }

    /// Entry for the next display frame.
    pub fn timeline(&self) -> TimelineEntry {
        let now = self.clock.now();
        let snapshot = self.reader.read();
        let intention = if snapshot.week_start == self.clock.current_week() {
            snapshot.text.trim().to_string()
        } else {
            String::new()
        };

        TimelineEntry {
            date: now,
            intention,
            next_refresh: now + Duration::minutes(REFRESH_INTERVAL_MINUTES),
        }
    }
}
