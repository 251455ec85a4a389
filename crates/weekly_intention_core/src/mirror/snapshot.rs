//! Mirror snapshot value and its key-value wire shape.

use crate::model::week::WeekStart;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Schema version written alongside every snapshot.
pub const MIRROR_SCHEMA_VERSION: u32 = 2;

/// Best-effort copy of the current week's intention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorSnapshot {
    pub week_start: WeekStart,
    pub text: String,
    /// `None` when nothing has been written yet.
    pub updated_at: Option<DateTime<Utc>>,
}

impl MirrorSnapshot {
    /// Placeholder returned on first run or when the medium is unavailable.
    pub fn empty(week_start: WeekStart) -> Self {
        Self {
            week_start,
            text: String::new(),
            updated_at: None,
        }
    }
}

/// Key-value layout of the shared region.
///
/// Unknown keys are ignored so other writers can share the region.
/// `currentWeekIntention` is the legacy two-field variant (text only, week
/// implied to be the current one); it is read as a fallback and dropped on
/// the next write. A second legacy layout (`widget_currentWeek_text`,
/// `widget_currentWeek_weekStart`, `widget_currentWeek_updatedAt` as epoch
/// seconds) is not read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorRecord {
    #[serde(
        rename = "widget.schemaVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub schema_version: Option<u32>,
    #[serde(
        rename = "widget.weekStartISO",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub week_start: Option<String>,
    #[serde(
        rename = "widget.intentionText",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub text: Option<String>,
    #[serde(
        rename = "widget.updatedAtISO",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<String>,
    #[serde(
        rename = "currentWeekIntention",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub legacy_text: Option<String>,
}

impl MirrorRecord {
    pub fn from_snapshot(snapshot: &MirrorSnapshot) -> Self {
        Self {
            schema_version: Some(MIRROR_SCHEMA_VERSION),
            week_start: Some(snapshot.week_start.to_timestamp_string()),
            text: Some(snapshot.text.clone()),
            updated_at: snapshot
                .updated_at
                .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            legacy_text: None,
        }
    }

    /// Decodes the record, filling missing fields from `current_week`.
    ///
    /// Returns `None` when the record was written by a newer schema.
    pub fn into_snapshot(self, current_week: WeekStart) -> Option<MirrorSnapshot> {
        if self.schema_version.unwrap_or(0) > MIRROR_SCHEMA_VERSION {
            return None;
        }

        if self.week_start.is_none() && self.text.is_none() {
            return Some(MirrorSnapshot {
                week_start: current_week,
                text: self.legacy_text.unwrap_or_default().trim().to_string(),
                updated_at: None,
            });
        }

        let week_start = self
            .week_start
            .as_deref()
            .and_then(WeekStart::parse_timestamp)
            .unwrap_or(current_week);
        let updated_at = self
            .updated_at
            .as_deref()
            .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
            .map(|at| at.with_timezone(&Utc));

        Some(MirrorSnapshot {
            week_start,
            text: self.text.unwrap_or_default(),
            updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{MirrorRecord, MirrorSnapshot, MIRROR_SCHEMA_VERSION};
    use crate::model::week::WeekStart;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn week(y: i32, m: u32, d: u32) -> WeekStart {
        WeekStart::containing(NaiveDate::from_ymd_opt(y, m, d).expect("valid test date"))
    }

    #[test]
    fn record_uses_shared_region_key_names() {
        let snapshot = MirrorSnapshot {
            week_start: week(2026, 10, 12),
            text: "focus".to_string(),
            updated_at: Utc.with_ymd_and_hms(2026, 10, 13, 8, 30, 0).single(),
        };
        let value = serde_json::to_value(MirrorRecord::from_snapshot(&snapshot))
            .expect("record should serialize");

        assert_eq!(value["widget.intentionText"], "focus");
        assert_eq!(value["widget.schemaVersion"], MIRROR_SCHEMA_VERSION);
        assert_eq!(value["widget.updatedAtISO"], "2026-10-13T08:30:00.000Z");
        assert!(value.get("currentWeekIntention").is_none());
    }

    #[test]
    fn legacy_text_only_record_maps_to_current_week() {
        let current = week(2026, 10, 12);
        let record: MirrorRecord =
            serde_json::from_str(r#"{"currentWeekIntention":"  old value \n"}"#)
                .expect("legacy record should parse");

        let snapshot = record
            .into_snapshot(current)
            .expect("legacy record is readable");
        assert_eq!(snapshot.week_start, current);
        assert_eq!(snapshot.text, "old value");
        assert_eq!(snapshot.updated_at, None);
    }

    #[test]
    fn timestamps_without_fractional_seconds_are_accepted() {
        let record = MirrorRecord {
            schema_version: Some(2),
            week_start: Some(week(2026, 10, 5).to_timestamp_string()),
            text: Some("rest".to_string()),
            updated_at: Some("2026-10-06T09:00:00Z".to_string()),
            legacy_text: None,
        };

        let snapshot = record
            .into_snapshot(week(2026, 10, 12))
            .expect("record is readable");
        assert_eq!(snapshot.week_start, week(2026, 10, 5));
        assert_eq!(
            snapshot.updated_at,
            Utc.with_ymd_and_hms(2026, 10, 6, 9, 0, 0).single()
        );
    }

    #[test]
    fn newer_schema_is_not_decoded() {
        let record = MirrorRecord {
            schema_version: Some(MIRROR_SCHEMA_VERSION + 1),
            text: Some("future".to_string()),
            ..MirrorRecord::default()
        };
        assert!(record.into_snapshot(week(2026, 10, 12)).is_none());
    }
}
