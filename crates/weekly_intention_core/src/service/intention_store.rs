//! Authoritative intention store.
//!
//! # Responsibility
//! - Enforce one effective intention per week over a replicated row set.
//! - Ingest record changes delivered by the replication transport.
//! - Notify the save listener when the current week is written.
//!
//! # Invariants
//! - `upsert` is the only place duplicates are resolved.
//! - `find` and `upsert` agree on which duplicate is "first".
//! - The current week is recomputed from the clock on every call.

use crate::clock::Clock;
use crate::model::intention::{normalize_text, IntentionRecord};
use crate::model::week::WeekStart;
use crate::repo::intention_repo::{IntentionRepository, RemoteChange, RepoResult, WeekWrite};
use log::{debug, info, warn};
use std::sync::Arc;

/// Receives current-week saves synchronously from `IntentionStore::upsert`.
pub trait SaveListener: Send + Sync {
    fn current_week_saved(&self, week: WeekStart, text: &str);
}

/// Store facade over an intention repository.
pub struct IntentionStore<R: IntentionRepository> {
    repo: R,
    clock: Arc<dyn Clock>,
    listener: Option<Arc<dyn SaveListener>>,
}

impl<R: IntentionRepository> IntentionStore<R> {
    pub fn new(repo: R, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            clock,
            listener: None,
        }
    }

    /// Registers the listener notified on current-week saves.
    pub fn with_listener(mut self, listener: Arc<dyn SaveListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Saves `text` as the intention for `week`.
    ///
    /// # Contract
    /// - Text is trimmed; empty text removes every row for the week.
    /// - Non-empty text updates the first row in place and deletes the rest,
    ///   or inserts one row when none exist.
    /// - When `week` is the current week, the listener is notified before
    ///   this returns.
    pub fn upsert(&self, week: WeekStart, text: &str) -> RepoResult<WeekWrite> {
        let trimmed = normalize_text(text);
        let created_at = self.clock.now().timestamp_millis();
        let outcome = self.repo.write_week(week, &trimmed, created_at)?;

        match &outcome {
            WeekWrite::Cleared { removed } => info!(
                "event=intention_upsert module=store status=ok action=cleared week={week} removed={removed}"
            ),
            WeekWrite::Updated {
                removed_duplicates, ..
            } => {
                info!(
                    "event=intention_upsert module=store status=ok action=updated week={week} text_len={}",
                    trimmed.chars().count()
                );
                if *removed_duplicates > 0 {
                    warn!(
                        "event=intention_dedup module=store status=ok week={week} removed={removed_duplicates}"
                    );
                }
            }
            WeekWrite::Created { .. } => info!(
                "event=intention_upsert module=store status=ok action=created week={week} text_len={}",
                trimmed.chars().count()
            ),
        }

        if week == self.clock.current_week() {
            if let Some(listener) = &self.listener {
                listener.current_week_saved(week, &trimmed);
            }
        }

        Ok(outcome)
    }

    /// Returns the trimmed text for `week`, or `""` when there is none.
    pub fn find(&self, week: WeekStart) -> RepoResult<String> {
        Ok(self
            .repo
            .first_for_week(week)?
            .map(|record| normalize_text(&record.text))
            .unwrap_or_default())
    }

    /// Returns the text for the week containing the clock's today.
    pub fn find_current(&self) -> RepoResult<(WeekStart, String)> {
        let week = self.clock.current_week();
        Ok((week, self.find(week)?))
    }

    /// All rows, newest week first.
    pub fn all(&self) -> RepoResult<Vec<IntentionRecord>> {
        self.repo.list_all()
    }

    /// Recall view: newest week first, filtered by case-insensitive
    /// substring when `query` is non-blank.
    pub fn recall(&self, query: &str) -> RepoResult<Vec<IntentionRecord>> {
        let needle = query.trim().to_lowercase();
        let records = self.all()?;
        if needle.is_empty() {
            return Ok(records);
        }
        Ok(records
            .into_iter()
            .filter(|record| record.text.to_lowercase().contains(&needle))
            .collect())
    }

    /// Applies changes delivered by the replication transport.
    ///
    /// Returns `true` when the current week's effective text differs after
    /// the batch. Duplicates are left in place for the next `upsert`. A
    /// failing batch is rolled back as a whole.
    pub fn ingest_remote(&self, changes: &[RemoteChange]) -> RepoResult<bool> {
        let (week, before) = self.find_current()?;

        let batch: Vec<RemoteChange> = changes
            .iter()
            .map(|change| match change {
                RemoteChange::Upsert(record) if normalize_text(&record.text).is_empty() => {
                    RemoteChange::Delete(record.id)
                }
                other => other.clone(),
            })
            .collect();
        if let Err(err) = self.repo.apply_remote_batch(&batch) {
            warn!(
                "event=remote_ingest module=store status=error changes={} error={err}",
                changes.len()
            );
            return Err(err);
        }

        let after = self.find(week)?;
        let changed = before != after;
        debug!(
            "event=remote_ingest module=store status=ok changes={} current_week_changed={changed}",
            changes.len()
        );
        Ok(changed)
    }
}
