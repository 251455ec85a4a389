//! Monday-first ISO week identity.
//!
//! # Responsibility
//! - Normalize arbitrary dates to the Monday that begins their ISO week.
//! - Convert week identities to and from storage/wire representations.
//!
//! # Invariants
//! - A `WeekStart` always holds a Monday.
//! - Two values are equal iff they denote the same calendar day.

use chrono::{
    DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const STORAGE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Monday that begins an ISO-8601 week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekStart(NaiveDate);

impl WeekStart {
    /// Returns the week containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let delta = i64::from(date.weekday().num_days_from_monday());
        Self(date - Duration::days(delta))
    }

    /// Monday of this week.
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Sunday of this week.
    pub fn end(&self) -> NaiveDate {
        self.0 + Duration::days(6)
    }

    /// ISO week-of-year number (1..=53).
    pub fn iso_week_number(&self) -> u32 {
        self.0.iso_week().week()
    }

    /// Returns the week `weeks` away from this one (negative for past weeks).
    pub fn offset(&self, weeks: i64) -> Self {
        Self(self.0 + Duration::weeks(weeks))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::containing(date) == *self
    }

    /// Storage key, `YYYY-MM-DD`.
    pub fn to_storage_key(&self) -> String {
        self.0.format(STORAGE_DATE_FORMAT).to_string()
    }

    /// Parses a storage key and normalizes it to its Monday.
    pub fn parse_storage_key(value: &str) -> Option<Self> {
        NaiveDate::parse_from_str(value.trim(), STORAGE_DATE_FORMAT)
            .ok()
            .map(Self::containing)
    }

    /// Local midnight of the Monday, rendered as an RFC 3339 timestamp.
    ///
    /// This is the representation the companion surface reads from the
    /// mirror medium.
    pub fn to_timestamp_string(&self) -> String {
        let naive = self.0.and_time(NaiveTime::MIN);
        let instant = match Local.from_local_datetime(&naive).earliest() {
            Some(local) => local.with_timezone(&Utc),
            None => Utc.from_utc_datetime(&naive),
        };
        instant.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Parses an RFC 3339 timestamp (with or without fractional seconds)
    /// and returns the week containing its local calendar day.
    pub fn parse_timestamp(value: &str) -> Option<Self> {
        let parsed = DateTime::parse_from_rfc3339(value.trim()).ok()?;
        Some(Self::containing(
            parsed.with_timezone(&Local).date_naive(),
        ))
    }
}

impl Display for WeekStart {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(STORAGE_DATE_FORMAT))
    }
}

/// Calendar boundary function: the week that contains `today`.
pub fn current_week_start(today: NaiveDate) -> WeekStart {
    WeekStart::containing(today)
}

/// Pager window of weeks around `current`, oldest first.
pub fn weeks_around(current: WeekStart, before: u32, after: u32) -> Vec<WeekStart> {
    (-i64::from(before)..=i64::from(after))
        .map(|offset| current.offset(offset))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{current_week_start, weeks_around, WeekStart};
    use chrono::{Datelike, NaiveDate, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn every_day_of_a_week_maps_to_its_monday() {
        let monday = date(2026, 10, 12);
        for offset in 0..7 {
            let day = monday + chrono::Duration::days(offset);
            assert_eq!(WeekStart::containing(day).date(), monday);
        }
        assert_eq!(current_week_start(date(2026, 10, 18)).date(), monday);
    }

    #[test]
    fn week_spanning_new_year_starts_in_previous_year() {
        let week = WeekStart::containing(date(2027, 1, 1));
        assert_eq!(week.date(), date(2026, 12, 28));
        assert_eq!(week.date().weekday(), Weekday::Mon);
        assert_eq!(week.iso_week_number(), 53);
    }

    #[test]
    fn storage_key_normalizes_non_monday_input() {
        let week = WeekStart::parse_storage_key("2026-10-15").expect("key should parse");
        assert_eq!(week.to_storage_key(), "2026-10-12");
        assert!(WeekStart::parse_storage_key("not a date").is_none());
    }

    #[test]
    fn timestamp_round_trips_through_local_midnight() {
        let week = WeekStart::containing(date(2026, 3, 4));
        let encoded = week.to_timestamp_string();
        assert_eq!(WeekStart::parse_timestamp(&encoded), Some(week));
    }

    #[test]
    fn weeks_around_is_ordered_and_centered() {
        let current = WeekStart::containing(date(2026, 10, 14));
        let window = weeks_around(current, 2, 3);
        assert_eq!(window.len(), 6);
        assert_eq!(window[2], current);
        assert!(window.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(window[0].end() + chrono::Duration::days(1), window[1].date());
    }
}
