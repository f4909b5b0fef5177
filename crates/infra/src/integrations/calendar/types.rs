//! Google Calendar v3 wire types
//!
//! Only the fields the push flow reads or writes are modelled.

use std::collections::HashMap;

use chrono::NaiveDate;
use crewcal_domain::constants::{APP_EVENT_MARKER, APP_EVENT_MARKER_KEY};
use crewcal_domain::{CalendarEntry, TripEvent};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CalendarListResponse {
    #[serde(default)]
    pub items: Vec<CalendarListItem>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CalendarListItem {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewCalendar<'a> {
    pub summary: &'a str,
    pub time_zone: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedResource {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventsResponse {
    #[serde(default)]
    pub items: Vec<GoogleEvent>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GoogleEvent {
    pub id: String,
    pub summary: Option<String>,
    pub start: Option<EventDate>,
    pub extended_properties: Option<ExtendedProperties>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventDate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct ExtendedProperties {
    #[serde(default)]
    pub private: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Reminders {
    pub use_default: bool,
}

/// Body of `POST calendars/{id}/events` for an all-day trip.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventInsert<'a> {
    pub summary: &'a str,
    pub description: &'a str,
    pub start: EventDate,
    pub end: EventDate,
    pub reminders: Reminders,
    pub extended_properties: ExtendedProperties,
}

impl<'a> EventInsert<'a> {
    pub fn all_day(trip: &'a TripEvent, timezone: &str) -> Self {
        let date = |day: NaiveDate| EventDate {
            date: Some(day.format("%Y-%m-%d").to_string()),
            date_time: None,
            time_zone: Some(timezone.to_string()),
        };

        let mut private = HashMap::new();
        private.insert(APP_EVENT_MARKER_KEY.to_string(), APP_EVENT_MARKER.to_string());
        private.insert("pairingCode".to_string(), trip.pairing_code.clone());

        Self {
            summary: &trip.summary,
            description: &trip.description,
            start: date(trip.start_date),
            end: date(trip.end_date),
            reminders: Reminders { use_default: false },
            extended_properties: ExtendedProperties { private },
        }
    }
}

impl From<GoogleEvent> for CalendarEntry {
    fn from(event: GoogleEvent) -> Self {
        let start_date = event.start.and_then(|start| {
            start
                .date
                .or_else(|| start.date_time.map(|dt| dt.chars().take(10).collect()))
                .and_then(|raw| NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok())
        });
        let created_by = event
            .extended_properties
            .and_then(|mut props| props.private.remove(APP_EVENT_MARKER_KEY));

        CalendarEntry { id: event.id, summary: event.summary, start_date, created_by }
    }
}
