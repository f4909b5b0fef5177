//! Calendar-side records used when reconciling pushed trips.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::{APP_EVENT_MARKER, TRIP_SUMMARY_PREFIX};

/// An event that already exists in the remote calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub id: String,
    pub summary: Option<String>,
    pub start_date: Option<NaiveDate>,
    /// Value of the `createdBy` private extended property, if any.
    pub created_by: Option<String>,
}

impl CalendarEntry {
    /// Whether this event was created by a previous push.
    #[must_use]
    pub fn is_app_event(&self) -> bool {
        if self.created_by.as_deref() == Some(APP_EVENT_MARKER) {
            return true;
        }
        self.summary
            .as_deref()
            .is_some_and(|summary| summary.trim_start().starts_with(TRIP_SUMMARY_PREFIX))
    }
}

/// Inclusive-start, exclusive-end date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}
