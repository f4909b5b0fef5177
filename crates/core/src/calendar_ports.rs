//! Calendar port interfaces
//!
//! Implemented by the Google Calendar adapter in infra and by in-memory
//! fakes in tests.

use async_trait::async_trait;
use crewcal_domain::{CalendarEntry, DateWindow, Result, TripEvent};

/// Trait for the calendar that receives pushed trips
#[async_trait]
pub trait TripCalendar: Send + Sync {
    /// Find the calendar named `name`, creating it when missing.
    ///
    /// Returns the calendar id.
    async fn ensure_calendar(&self, name: &str, timezone: &str) -> Result<String>;

    /// Events this application created that start inside `window`
    async fn list_app_events(
        &self,
        calendar_id: &str,
        window: DateWindow,
    ) -> Result<Vec<CalendarEntry>>;

    /// Remove a single event
    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<()>;

    /// Insert a trip as an all-day event, returning the new event id
    async fn insert_trip(
        &self,
        calendar_id: &str,
        trip: &TripEvent,
        timezone: &str,
    ) -> Result<String>;
}
