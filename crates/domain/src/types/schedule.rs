//! Schedule records: parsed days and grouped trip events.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::constants::TRIP_SUMMARY_PREFIX;
use crate::impl_domain_status_conversions;

/// Classification of a single schedule day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    /// Part of an active pairing.
    TripDay,
    /// No assigned duty.
    DayOff,
}

impl_domain_status_conversions!(DayKind {
    TripDay => "trip_day",
    DayOff => "day_off",
});

/// One calendar day parsed from the schedule page.
///
/// Built once per schedule row and consumed by the grouping pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub kind: DayKind,
    /// Present only for [`DayKind::TripDay`].
    pub pairing_code: Option<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub description: String,
}

impl DayRecord {
    /// A duty day belonging to `pairing_code`.
    pub fn trip_day(
        pairing_code: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind: DayKind::TripDay,
            pairing_code: Some(pairing_code.into()),
            start,
            end,
            description: description.into(),
        }
    }

    /// A day without duty, spanning the whole calendar day.
    pub fn day_off(date: NaiveDate) -> Self {
        Self {
            kind: DayKind::DayOff,
            pairing_code: None,
            start: date.and_time(NaiveTime::MIN),
            end: date.and_time(end_of_day()),
            description: String::new(),
        }
    }

    /// Calendar date the row belongs to.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    #[must_use]
    pub fn is_trip_day(&self) -> bool {
        self.kind == DayKind::TripDay
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN)
}

/// Pay and duty figures copied verbatim from the schedule text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayFigures {
    pub block: Option<String>,
    pub credit: Option<String>,
    pub value: Option<String>,
}

/// A grouped, calendar-ready trip.
///
/// `end_date` is exclusive, matching all-day event semantics of calendar
/// APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripEvent {
    pub summary: String,
    pub pairing_code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: String,
    #[serde(default)]
    pub pay: PayFigures,
    /// Number of schedule rows merged into this event.
    pub day_count: u32,
}

impl TripEvent {
    /// Display title for a pairing code.
    #[must_use]
    pub fn summary_for(pairing_code: &str) -> String {
        format!("{TRIP_SUMMARY_PREFIX} {pairing_code}")
    }
}
