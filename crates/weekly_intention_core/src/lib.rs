//! Core logic for Weekly Intention.
//!
//! One intention per ISO week, stored in a replicated record set, mirrored
//! into a cross-process cache for a read-only companion surface.

pub mod app;
pub mod clock;
pub mod companion;
pub mod config;
pub mod db;
pub mod logging;
pub mod mirror;
pub mod model;
pub mod reconcile;
pub mod repo;
pub mod service;
pub mod sync;

pub use app::{AppError, IntentionApp};
pub use clock::{Clock, ManualClock, SystemClock};
pub use companion::{CompanionSurface, TimelineEntry, PLACEHOLDER_TEXT};
pub use config::AppConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use mirror::medium::{FileMirrorMedium, MirrorError, MirrorMedium};
pub use mirror::snapshot::{MirrorRecord, MirrorSnapshot};
pub use mirror::{LogRefreshSignal, MirrorReader, RefreshSignal, WidgetMirror};
pub use model::intention::{IntentionId, IntentionRecord};
pub use model::week::{current_week_start, weeks_around, WeekStart};
pub use reconcile::{ReconcileOutcome, ReconcileTrigger, ReconciliationDriver};
pub use repo::intention_repo::{
    IntentionRepository, RemoteChange, RepoError, RepoResult, SqliteIntentionRepository,
    WeekWrite,
};
pub use service::intention_store::{IntentionStore, SaveListener};
pub use sync::reachability::{PathObserver, PathStatus, ReachabilityMonitor, ReachabilitySubscription};
pub use sync::status::{SettleTimer, SyncStatus, SyncStatusCoordinator, RESYNC_SETTLE};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
