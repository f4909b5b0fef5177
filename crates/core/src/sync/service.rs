//! Schedule sync service - core business logic
//!
//! Fetches the schedule, groups it into trips and replaces previously
//! pushed trips in the target calendar. Optionally stores the trips per
//! user so they can be pushed again later without the portal.

use std::sync::Arc;

use chrono::{Local, Months, NaiveDate};
use crewcal_domain::constants::{CLEANUP_LOOKAHEAD_MONTHS, CLEANUP_LOOKBACK_MONTHS};
use crewcal_domain::{CrewCalError, DateWindow, PairingRecord, Result, TripEvent};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::calendar_ports::TripCalendar;
use crate::pairing::ports::PairingRepository;
use crate::schedule::grouping::{group_days_with, GroupingPolicy};
use crate::schedule::ports::{ScheduleParser, ScheduleSource};

/// Per-run options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOptions {
    /// Store trips for this user when a repository is configured.
    pub user_id: Option<String>,
    /// Leave events that started before today untouched.
    pub preserve_past: bool,
    /// Push only the trips at these positions of the grouped list.
    pub selected_indices: Option<Vec<usize>>,
    /// Group and report without touching the calendar or the repository.
    pub dry_run: bool,
}

/// Grouped trips ready for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPreview {
    pub month: u32,
    pub year: i32,
    pub day_count: usize,
    pub trips: Vec<TripEvent>,
}

/// Outcome of a sync or push.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub calendar_id: Option<String>,
    pub trips_found: usize,
    pub selected: usize,
    pub persisted: usize,
    pub deleted: usize,
    pub inserted: usize,
    /// Trips not pushed because they start inside the preserved past.
    pub skipped: usize,
    pub failures: usize,
    pub dry_run: bool,
}

/// Schedule sync service
pub struct ScheduleSyncService {
    source: Arc<dyn ScheduleSource>,
    calendar: Arc<dyn TripCalendar>,
    repository: Option<Arc<dyn PairingRepository>>,
    parser: ScheduleParser,
    policy: GroupingPolicy,
    calendar_name: String,
    timezone: String,
    today: Option<NaiveDate>,
}

impl ScheduleSyncService {
    /// Create a new sync service
    pub fn new(
        source: Arc<dyn ScheduleSource>,
        calendar: Arc<dyn TripCalendar>,
        parser: ScheduleParser,
        calendar_name: impl Into<String>,
        timezone: impl Into<String>,
    ) -> Self {
        Self {
            source,
            calendar,
            repository: None,
            parser,
            policy: GroupingPolicy::default(),
            calendar_name: calendar_name.into(),
            timezone: timezone.into(),
            today: None,
        }
    }

    /// Store trips per user
    pub fn with_repository(mut self, repository: Arc<dyn PairingRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn with_policy(mut self, policy: GroupingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Pin the date used for cleanup windows.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Fetch, parse and group without side effects.
    pub async fn preview(&self) -> Result<SyncPreview> {
        let html = self.source.fetch_schedule_html().await?;
        let parsed = (self.parser)(&html)?;
        let trips = group_days_with(&parsed.days, &self.policy);
        debug!(days = parsed.days.len(), trips = trips.len(), "grouped schedule");

        Ok(SyncPreview {
            month: parsed.month,
            year: parsed.year,
            day_count: parsed.days.len(),
            trips,
        })
    }

    /// Fetch the schedule and replace pushed trips in the calendar.
    #[instrument(skip(self, options), fields(dry_run = options.dry_run))]
    pub async fn sync(&self, options: &SyncOptions) -> Result<SyncReport> {
        let preview = self.preview().await?;
        if preview.trips.is_empty() {
            return Err(CrewCalError::NotFound("no trips found".to_string()));
        }

        let trips_found = preview.trips.len();
        let selected = select(preview.trips, options.selected_indices.as_deref())?;
        let mut report = SyncReport {
            trips_found,
            selected: selected.len(),
            dry_run: options.dry_run,
            ..SyncReport::default()
        };

        if options.dry_run {
            info!(trips = trips_found, selected = report.selected, "dry run, nothing pushed");
            return Ok(report);
        }

        if let (Some(user_id), Some(repository)) = (options.user_id.as_deref(), &self.repository) {
            let records: Vec<PairingRecord> =
                selected.iter().map(|trip| PairingRecord::from_trip(user_id, trip)).collect();
            report.persisted = repository.upsert_pairings(user_id, &records).await?;
            info!(user_id, persisted = report.persisted, "stored pairings");
        }

        self.push(&selected, options.preserve_past, &mut report).await?;
        Ok(report)
    }

    /// Push trips already stored for `user_id`.
    #[instrument(skip(self, options))]
    pub async fn push_stored(&self, user_id: &str, options: &SyncOptions) -> Result<SyncReport> {
        let repository = self.repository.as_ref().ok_or_else(|| {
            CrewCalError::Config("pairing storage is not configured".to_string())
        })?;

        let mut records = repository.list_pairings(user_id).await?;
        if records.is_empty() {
            return Err(CrewCalError::NotFound(format!("no stored pairings for {user_id}")));
        }
        records.sort_by_key(|record| record.start_date);

        let trips: Vec<TripEvent> = records.iter().map(PairingRecord::to_trip).collect();
        let trips_found = trips.len();
        let selected = select(trips, options.selected_indices.as_deref())?;
        let mut report = SyncReport {
            trips_found,
            selected: selected.len(),
            dry_run: options.dry_run,
            ..SyncReport::default()
        };

        if !options.dry_run {
            self.push(&selected, options.preserve_past, &mut report).await?;
        }
        Ok(report)
    }

    /// Date window whose pushed events get replaced.
    #[must_use]
    pub fn cleanup_window(&self, preserve_past: bool) -> DateWindow {
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let start = if preserve_past {
            today
        } else {
            today.checked_sub_months(Months::new(CLEANUP_LOOKBACK_MONTHS)).unwrap_or(today)
        };
        let end = today.checked_add_months(Months::new(CLEANUP_LOOKAHEAD_MONTHS)).unwrap_or(today);
        DateWindow::new(start, end)
    }

    async fn push(
        &self,
        trips: &[TripEvent],
        preserve_past: bool,
        report: &mut SyncReport,
    ) -> Result<()> {
        let calendar_id = self.calendar.ensure_calendar(&self.calendar_name, &self.timezone).await?;
        let window = self.cleanup_window(preserve_past);

        let existing = self.calendar.list_app_events(&calendar_id, window).await?;
        for entry in existing.iter().filter(|entry| entry.is_app_event()) {
            if entry.start_date.is_some_and(|start| !window.contains(start)) {
                continue;
            }
            match self.calendar.delete_event(&calendar_id, &entry.id).await {
                Ok(()) => report.deleted += 1,
                Err(err) => {
                    warn!(event_id = %entry.id, error = %err, "failed to delete event");
                    report.failures += 1;
                }
            }
        }

        for trip in trips {
            if preserve_past && trip.start_date < window.start {
                debug!(
                    pairing = %trip.pairing_code,
                    start = %trip.start_date,
                    "skipping past trip"
                );
                report.skipped += 1;
                continue;
            }
            match self.calendar.insert_trip(&calendar_id, trip, &self.timezone).await {
                Ok(event_id) => {
                    debug!(pairing = %trip.pairing_code, event_id = %event_id, "inserted trip");
                    report.inserted += 1;
                }
                Err(err) => {
                    warn!(pairing = %trip.pairing_code, error = %err, "failed to insert trip");
                    report.failures += 1;
                }
            }
        }

        info!(
            calendar_id = %calendar_id,
            deleted = report.deleted,
            inserted = report.inserted,
            failures = report.failures,
            "calendar push finished"
        );
        report.calendar_id = Some(calendar_id);
        Ok(())
    }
}

fn select(trips: Vec<TripEvent>, indices: Option<&[usize]>) -> Result<Vec<TripEvent>> {
    let Some(indices) = indices else {
        return Ok(trips);
    };

    if let Some(bad) = indices.iter().find(|&&index| index >= trips.len()) {
        return Err(CrewCalError::InvalidInput(format!(
            "trip index {bad} out of range (found {} trips)",
            trips.len()
        )));
    }

    Ok(trips
        .into_iter()
        .enumerate()
        .filter(|(index, _)| indices.contains(index))
        .map(|(_, trip)| trip)
        .collect())
}
