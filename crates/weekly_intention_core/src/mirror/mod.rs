//! Widget mirror: cross-process cache of the current week's intention.
//!
//! # Responsibility
//! - Write the current-week snapshot into the shared medium and ask the
//!   companion surface to re-render.
//! - Read the last snapshot, falling back to an empty placeholder.
//!
//! # Invariants
//! - Writes are value-based: each one fully replaces the previous snapshot.
//! - An unavailable medium never surfaces as an error: reads return the
//!   placeholder and writes are skipped.
//! - The refresh signal is only sent after a snapshot was stored.

pub mod medium;
pub mod snapshot;

use crate::clock::Clock;
use crate::model::intention::normalize_text;
use crate::model::week::WeekStart;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use medium::{FileMirrorMedium, MirrorMedium};
use snapshot::{MirrorRecord, MirrorSnapshot};
use std::path::Path;
use std::sync::Arc;

/// Fire-and-forget request for a display surface to recompute its output.
pub trait RefreshSignal: Send + Sync {
    fn reload(&self, kind: &str);
}

/// Read-only view of the mirror, all the companion surface may use.
pub trait MirrorReader: Send + Sync {
    fn read(&self) -> MirrorSnapshot;
}

/// Refresh signal that only records the request in the log.
///
/// Used when no display host is attached (CLI, headless runs).
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRefreshSignal;

impl RefreshSignal for LogRefreshSignal {
    fn reload(&self, kind: &str) {
        info!("event=widget_reload module=mirror status=ok kind={kind}");
    }
}

/// Mirror of the authoritative current-week value.
pub struct WidgetMirror {
    medium: Option<Arc<dyn MirrorMedium>>,
    signal: Arc<dyn RefreshSignal>,
    kind: String,
    clock: Arc<dyn Clock>,
}

impl WidgetMirror {
    pub fn new(
        medium: Option<Arc<dyn MirrorMedium>>,
        signal: Arc<dyn RefreshSignal>,
        kind: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            medium,
            signal,
            kind: kind.into(),
            clock,
        }
    }

    /// Opens the file-backed region `group` under `root`.
    ///
    /// A region that cannot be opened yields a mirror without a medium.
    pub fn open(
        root: impl AsRef<Path>,
        group: &str,
        signal: Arc<dyn RefreshSignal>,
        kind: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let medium = match FileMirrorMedium::open(root, group) {
            Ok(medium) => Some(Arc::new(medium) as Arc<dyn MirrorMedium>),
            Err(err) => {
                warn!(
                    "event=mirror_open module=mirror status=error error_code=medium_unavailable error={err}"
                );
                None
            }
        };
        Self::new(medium, signal, kind, clock)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn is_available(&self) -> bool {
        self.medium.is_some()
    }

    /// Replaces the snapshot and signals the companion surface.
    ///
    /// Returns whether the snapshot was stored.
    pub fn write(&self, week: WeekStart, text: &str, now: DateTime<Utc>) -> bool {
        let Some(medium) = &self.medium else {
            debug!("event=mirror_write module=mirror status=skip reason=medium_unavailable");
            return false;
        };

        let snapshot = MirrorSnapshot {
            week_start: week,
            text: normalize_text(text),
            updated_at: Some(now),
        };
        if let Err(err) = medium.store(&MirrorRecord::from_snapshot(&snapshot)) {
            warn!("event=mirror_write module=mirror status=error week={week} error={err}");
            return false;
        }

        info!(
            "event=mirror_write module=mirror status=ok week={week} text_len={}",
            snapshot.text.chars().count()
        );
        self.signal.reload(&self.kind);
        true
    }

    /// Returns the last snapshot, or an empty one for the current week.
    pub fn read(&self) -> MirrorSnapshot {
        let current = self.clock.current_week();
        let Some(medium) = &self.medium else {
            return MirrorSnapshot::empty(current);
        };

        match medium.load() {
            Ok(Some(record)) => record.into_snapshot(current).unwrap_or_else(|| {
                warn!("event=mirror_read module=mirror status=error error_code=schema_too_new");
                MirrorSnapshot::empty(current)
            }),
            Ok(None) => MirrorSnapshot::empty(current),
            Err(err) => {
                warn!("event=mirror_read module=mirror status=error error={err}");
                MirrorSnapshot::empty(current)
            }
        }
    }
}

impl MirrorReader for WidgetMirror {
    fn read(&self) -> MirrorSnapshot {
        WidgetMirror::read(self)
    }
}
