use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use crewcal_core::TripCalendar;
use crewcal_domain::{CalendarEntry, CrewCalError, DateWindow, Result as DomainResult, TripEvent};

/// Calendar call, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarCall {
    Ensure(String),
    List(DateWindow),
    Delete(String),
    Insert(String),
}

/// In-memory calendar that records every call.
///
/// Pre-seeded entries are returned by `list_app_events`; inserts and
/// deletes can be made to fail by pairing code or event id.
#[derive(Default, Clone)]
pub struct FakeTripCalendar {
    existing: Arc<Mutex<Vec<CalendarEntry>>>,
    calls: Arc<Mutex<Vec<CalendarCall>>>,
    inserted: Arc<Mutex<Vec<TripEvent>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl FakeTripCalendar {
    pub fn with_entry(self, entry: CalendarEntry) -> Self {
        self.existing.lock().unwrap().push(entry);
        self
    }

    /// Make deletes of this event id, or inserts of this pairing code, fail.
    pub fn failing_on(self, key: &str) -> Self {
        self.failing.lock().unwrap().insert(key.to_string());
        self
    }

    pub fn calls(&self) -> Vec<CalendarCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn inserted(&self) -> Vec<TripEvent> {
        self.inserted.lock().unwrap().clone()
    }

    fn fails(&self, key: &str) -> bool {
        self.failing.lock().unwrap().contains(key)
    }
}

#[async_trait]
impl TripCalendar for FakeTripCalendar {
    async fn ensure_calendar(&self, name: &str, _timezone: &str) -> DomainResult<String> {
        self.calls.lock().unwrap().push(CalendarCall::Ensure(name.to_string()));
        Ok(format!("cal-{name}"))
    }

    async fn list_app_events(
        &self,
        _calendar_id: &str,
        window: DateWindow,
    ) -> DomainResult<Vec<CalendarEntry>> {
        self.calls.lock().unwrap().push(CalendarCall::List(window));
        Ok(self.existing.lock().unwrap().clone())
    }

    async fn delete_event(&self, _calendar_id: &str, event_id: &str) -> DomainResult<()> {
        self.calls.lock().unwrap().push(CalendarCall::Delete(event_id.to_string()));
        if self.fails(event_id) {
            return Err(CrewCalError::Network("delete refused".into()));
        }
        Ok(())
    }

    async fn insert_trip(
        &self,
        _calendar_id: &str,
        trip: &TripEvent,
        _timezone: &str,
    ) -> DomainResult<String> {
        self.calls.lock().unwrap().push(CalendarCall::Insert(trip.pairing_code.clone()));
        if self.fails(&trip.pairing_code) {
            return Err(CrewCalError::Network("insert refused".into()));
        }
        let mut inserted = self.inserted.lock().unwrap();
        inserted.push(trip.clone());
        Ok(format!("evt-{}", inserted.len()))
    }
}
