//! Reconciliation between the store and the widget mirror.
//!
//! # Responsibility
//! - Refresh the mirror after a current-week save.
//! - Compare store and mirror on foreground resume and on remote arrivals,
//!   writing only on mismatch.
//!
//! # Invariants
//! - Saves to past or future weeks never touch the mirror.
//! - Compare-then-write: equal week and text means no write and no refresh
//!   signal.
//! - Store read failures skip the pass; the next trigger retries.

use crate::clock::Clock;
use crate::mirror::WidgetMirror;
use crate::model::intention::normalize_text;
use crate::model::week::WeekStart;
use crate::repo::intention_repo::IntentionRepository;
use crate::service::intention_store::{IntentionStore, SaveListener};
use log::{debug, warn};
use std::sync::Arc;

/// What one reconciliation pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The mirror was rewritten and the companion surface signaled.
    Written,
    /// Mirror already matched the store.
    Unchanged,
    /// The store could not be read, or the medium rejected the write.
    Skipped,
}

/// Trigger for a compare-then-write pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileTrigger {
    Foreground,
    RemoteChange,
}

impl ReconcileTrigger {
    fn as_str(self) -> &'static str {
        match self {
            Self::Foreground => "foreground",
            Self::RemoteChange => "remote_change",
        }
    }
}

pub struct ReconciliationDriver {
    mirror: Arc<WidgetMirror>,
    clock: Arc<dyn Clock>,
}

impl ReconciliationDriver {
    pub fn new(mirror: Arc<WidgetMirror>, clock: Arc<dyn Clock>) -> Self {
        Self { mirror, clock }
    }

    pub fn mirror(&self) -> &WidgetMirror {
        &self.mirror
    }

    /// Explicit save path.
    pub fn on_save(&self, week: WeekStart, text: &str) -> ReconcileOutcome {
        if week != self.clock.current_week() {
            debug!("event=reconcile module=reconcile status=skip trigger=save reason=not_current_week week={week}");
            return ReconcileOutcome::Unchanged;
        }
        self.write(week, text)
    }

    /// App returned to the foreground.
    pub fn on_foreground<R: IntentionRepository>(
        &self,
        store: &IntentionStore<R>,
    ) -> ReconcileOutcome {
        self.reconcile(store, ReconcileTrigger::Foreground)
    }

    /// The store's current-week text changed without a local save.
    pub fn on_store_changed<R: IntentionRepository>(
        &self,
        store: &IntentionStore<R>,
    ) -> ReconcileOutcome {
        self.reconcile(store, ReconcileTrigger::RemoteChange)
    }

    pub fn reconcile<R: IntentionRepository>(
        &self,
        store: &IntentionStore<R>,
        trigger: ReconcileTrigger,
    ) -> ReconcileOutcome {
        let week = self.clock.current_week();
        let authoritative = match store.find(week) {
            Ok(text) => text,
            Err(err) => {
                warn!(
                    "event=reconcile module=reconcile status=error trigger={} error_code=store_read_failed error={err}",
                    trigger.as_str()
                );
                return ReconcileOutcome::Skipped;
            }
        };

        let mirrored = self.mirror.read();
        if mirrored.week_start == week && normalize_text(&mirrored.text) == authoritative {
            debug!(
                "event=reconcile module=reconcile status=skip trigger={} reason=up_to_date",
                trigger.as_str()
            );
            return ReconcileOutcome::Unchanged;
        }

        debug!(
            "event=reconcile module=reconcile status=start trigger={} week={week}",
            trigger.as_str()
        );
        self.write(week, &authoritative)
    }

    fn write(&self, week: WeekStart, text: &str) -> ReconcileOutcome {
        if self.mirror.write(week, text, self.clock.now()) {
            ReconcileOutcome::Written
        } else {
            ReconcileOutcome::Skipped
        }
    }
}

impl SaveListener for ReconciliationDriver {
    fn current_week_saved(&self, week: WeekStart, text: &str) {
        self.on_save(week, text);
    }
}
