//! Main-context owner of store, mirror, reconciliation and sync status.
//!
//! # Responsibility
//! - Wire the store's save listener to the reconciliation driver.
//! - Route lifecycle events (save, foreground, remote arrival) to the
//!   reconciliation policy.
//! - Consume reachability updates on the owning context.
//!
//! # Invariants
//! - All store mutations and mirror writes go through one `IntentionApp`.
//! - Failing to open the store is the only fatal error.

use crate::clock::Clock;
use crate::companion::CompanionSurface;
use crate::config::AppConfig;
use crate::db::{open_db, DbError};
use crate::mirror::{MirrorReader, RefreshSignal, WidgetMirror};
use crate::model::intention::IntentionRecord;
use crate::model::week::WeekStart;
use crate::reconcile::{ReconcileOutcome, ReconciliationDriver};
use crate::repo::intention_repo::{RemoteChange, RepoResult, SqliteIntentionRepository, WeekWrite};
use crate::service::intention_store::IntentionStore;
use crate::sync::reachability::ReachabilitySubscription;
use crate::sync::status::{SyncStatus, SyncStatusCoordinator};
use log::{error, info};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug)]
pub enum AppError {
    /// The authoritative store could not be opened.
    StoreInit(DbError),
    DataDir(std::io::Error),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StoreInit(err) => write!(f, "cannot open intention store: {err}"),
            Self::DataDir(err) => write!(f, "cannot create data directory: {err}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StoreInit(err) => Some(err),
            Self::DataDir(err) => Some(err),
        }
    }
}

pub struct IntentionApp {
    store: IntentionStore<SqliteIntentionRepository>,
    driver: Arc<ReconciliationDriver>,
    mirror: Arc<WidgetMirror>,
    clock: Arc<dyn Clock>,
    status: SyncStatusCoordinator,
    reachability: Option<ReachabilitySubscription>,
}

impl IntentionApp {
    /// Opens the on-disk store and the shared mirror region.
    pub fn open(
        config: &AppConfig,
        clock: Arc<dyn Clock>,
        signal: Arc<dyn RefreshSignal>,
    ) -> Result<Self, AppError> {
        std::fs::create_dir_all(config.data_dir()).map_err(AppError::DataDir)?;
        let conn = open_db(config.database_path()).map_err(|err| {
            error!("event=app_open module=app status=error error_code=store_init_failed error={err}");
            AppError::StoreInit(err)
        })?;

        let mirror = Arc::new(WidgetMirror::open(
            config.mirror_root(),
            &config.mirror_group,
            signal,
            config.widget_kind.clone(),
            Arc::clone(&clock),
        ));
        info!(
            "event=app_open module=app status=ok mirror_available={}",
            mirror.is_available()
        );
        Ok(Self::with_parts(conn, mirror, clock))
    }

    /// Wires an already-open connection and mirror.
    pub fn with_parts(conn: Connection, mirror: Arc<WidgetMirror>, clock: Arc<dyn Clock>) -> Self {
        let driver = Arc::new(ReconciliationDriver::new(
            Arc::clone(&mirror),
            Arc::clone(&clock),
        ));
        let store = IntentionStore::new(SqliteIntentionRepository::new(conn), Arc::clone(&clock))
            .with_listener(driver.clone());

        Self {
            store,
            driver,
            mirror,
            clock,
            status: SyncStatusCoordinator::new(),
            reachability: None,
        }
    }

    pub fn store(&self) -> &IntentionStore<SqliteIntentionRepository> {
        &self.store
    }

    pub fn mirror(&self) -> &WidgetMirror {
        &self.mirror
    }

    pub fn current_week(&self) -> WeekStart {
        self.clock.current_week()
    }

    /// Explicit save from the edit sheet.
    pub fn save(&self, week: WeekStart, text: &str) -> RepoResult<WeekWrite> {
        self.store.upsert(week, text)
    }

    pub fn intention(&self, week: WeekStart) -> RepoResult<String> {
        self.store.find(week)
    }

    pub fn recall(&self, query: &str) -> RepoResult<Vec<IntentionRecord>> {
        self.store.recall(query)
    }

    /// App returned to the foreground.
    pub fn resume_foreground(&self) -> ReconcileOutcome {
        self.driver.on_foreground(&self.store)
    }

    /// Applies changes landed by the replication transport and reconciles
    /// the mirror when the current week's text moved.
    pub fn apply_remote_changes(&self, changes: &[RemoteChange]) -> RepoResult<ReconcileOutcome> {
        if self.store.ingest_remote(changes)? {
            Ok(self.driver.on_store_changed(&self.store))
        } else {
            Ok(ReconcileOutcome::Unchanged)
        }
    }

    /// Companion view over this app's mirror region.
    pub fn companion(&self) -> CompanionSurface {
        CompanionSurface::new(
            Arc::clone(&self.mirror) as Arc<dyn MirrorReader>,
            Arc::clone(&self.clock),
        )
    }

    pub fn attach_reachability(&mut self, subscription: ReachabilitySubscription) {
        self.reachability = Some(subscription);
    }

    /// Drains pending reachability updates and fires a due settle timer.
    pub fn pump_reachability(&mut self, now: Instant) -> SyncStatus {
        if let Some(subscription) = self.reachability.as_mut() {
            while let Some(online) = subscription.poll() {
                self.status.handle_network_change(online, now);
            }
        }
        self.status.poll(now);
        self.status.state()
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.status.state()
    }

    pub fn status_label(&self) -> Option<&'static str> {
        self.status.label()
    }
}
