//! Intention record model.
//!
//! # Responsibility
//! - Define the canonical persisted record for one week's intention.
//! - Provide the text normalization shared by store, mirror and reconciler.
//!
//! # Invariants
//! - `id` is stable and never reused for another record.
//! - Multiple records may share a `week_start` transiently after a remote
//!   merge; the store collapses them on the next write.

use crate::model::week::WeekStart;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier assigned when a record is first created on any device.
pub type IntentionId = Uuid;

/// One persisted intention row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentionRecord {
    pub id: IntentionId,
    pub week_start: WeekStart,
    pub text: String,
    /// Unix epoch milliseconds of first creation. Orders duplicates.
    pub created_at: i64,
}

impl IntentionRecord {
    /// Creates a record with a generated stable ID.
    pub fn new(week_start: WeekStart, text: impl Into<String>, created_at: i64) -> Self {
        Self::with_id(Uuid::new_v4(), week_start, text, created_at)
    }

    /// Creates a record with a caller-provided ID.
    ///
    /// Used by the replication ingest path where identity exists remotely.
    pub fn with_id(
        id: IntentionId,
        week_start: WeekStart,
        text: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            week_start,
            text: text.into(),
            created_at,
        }
    }
}

/// Trims surrounding whitespace and newlines.
pub fn normalize_text(text: &str) -> String {
    text.trim().to_string()
}
