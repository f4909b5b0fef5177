//! Grouping of per-day schedule records into multi-day trips.
//!
//! The pass walks the input once, in order, keeping at most one open trip.
//! A trip day extends the open trip when it carries the same pairing code
//! and falls on or right after the last day already covered. Anything else
//! (a day off, a different pairing, a gap) closes the open trip.

use chrono::{Days, NaiveDate};
use crewcal_domain::constants::{
    DEFAULT_INITIAL_SPAN_DAYS, MAX_CONTIGUOUS_GAP_DAYS, PADDED_INITIAL_SPAN_DAYS,
};
use crewcal_domain::{DayRecord, TripEvent};
use tracing::{debug, warn};

use super::description::{append_day, extract_pay_figures, opening_description};

/// Tunables for the grouping pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupingPolicy {
    /// Exclusive end offset, in days, for a freshly opened trip.
    pub initial_span_days: i64,
    /// Largest gap between the last covered day and the next trip day that
    /// still counts as contiguous.
    pub max_gap_days: i64,
}

impl Default for GroupingPolicy {
    fn default() -> Self {
        Self { initial_span_days: DEFAULT_INITIAL_SPAN_DAYS, max_gap_days: MAX_CONTIGUOUS_GAP_DAYS }
    }
}

impl GroupingPolicy {
    /// Wider two-day initial block, for calendars that were filled that way
    /// before.
    #[must_use]
    pub fn padded() -> Self {
        Self { initial_span_days: PADDED_INITIAL_SPAN_DAYS, ..Self::default() }
    }

    /// Pick the policy from the `padded_span` config flag.
    #[must_use]
    pub fn from_padded_flag(padded: bool) -> Self {
        if padded {
            Self::padded()
        } else {
            Self::default()
        }
    }
}

/// Trip under construction.
struct OpenTrip {
    event: TripEvent,
    last_day: NaiveDate,
}

impl OpenTrip {
    /// `None` when the exclusive end falls past the last representable date.
    fn start(code: &str, day: &DayRecord, policy: &GroupingPolicy) -> Option<Self> {
        let start_date = day.date();
        let span = u64::try_from(policy.initial_span_days.max(1)).unwrap_or(1);
        let end_date = start_date.checked_add_days(Days::new(span))?.max(exclusive_end(day)?);
        let pay = extract_pay_figures(&day.description);
        let description = opening_description(code, day, &pay);

        Some(Self {
            event: TripEvent {
                summary: TripEvent::summary_for(code),
                pairing_code: code.to_string(),
                start_date,
                end_date,
                description,
                pay,
                day_count: 1,
            },
            last_day: day.end.date().max(start_date),
        })
    }

    fn accepts(&self, day: &DayRecord, code: &str, policy: &GroupingPolicy) -> bool {
        if self.event.pairing_code != code {
            return false;
        }
        let gap = (day.date() - self.last_day).num_days();
        (0..=policy.max_gap_days).contains(&gap)
    }

    /// Returns `false`, leaving the trip untouched, when the row has no
    /// representable end.
    fn extend(&mut self, day: &DayRecord) -> bool {
        let Some(end) = exclusive_end(day) else {
            return false;
        };
        self.event.day_count += 1;
        self.event.end_date = self.event.end_date.max(end);
        self.last_day = self.last_day.max(day.end.date());
        append_day(&mut self.event.description, self.event.day_count, day);
        true
    }

    fn finish(self) -> TripEvent {
        debug!(
            pairing = %self.event.pairing_code,
            start = %self.event.start_date,
            end = %self.event.end_date,
            days = self.event.day_count,
            "closed trip"
        );
        self.event
    }
}

fn exclusive_end(day: &DayRecord) -> Option<NaiveDate> {
    day.end.date().checked_add_days(Days::new(1))
}

/// Group days with the default policy.
#[must_use]
pub fn group_days(days: &[DayRecord]) -> Vec<TripEvent> {
    group_days_with(days, &GroupingPolicy::default())
}

/// Group days into trips.
///
/// Input order is trusted; rows are never re-sorted. A trip day without a
/// usable pairing code is treated as a day off.
#[must_use]
pub fn group_days_with(days: &[DayRecord], policy: &GroupingPolicy) -> Vec<TripEvent> {
    let mut trips = Vec::new();
    let mut open: Option<OpenTrip> = None;

    for day in days {
        let code = match day.pairing_code.as_deref().map(str::trim) {
            Some(code) if day.is_trip_day() && !code.is_empty() => code,
            _ => {
                if day.is_trip_day() {
                    warn!(date = %day.date(), "trip day without pairing code, treating as day off");
                }
                if let Some(trip) = open.take() {
                    trips.push(trip.finish());
                }
                continue;
            }
        };

        if let Some(trip) = open.as_mut().filter(|trip| trip.accepts(day, code, policy)) {
            if !trip.extend(day) {
                warn!(
                    date = %day.date(),
                    pairing = code,
                    "skipping trip day past the calendar range"
                );
            }
            continue;
        }

        if let Some(trip) = open.take() {
            trips.push(trip.finish());
        }
        open = OpenTrip::start(code, day, policy);
        if open.is_none() {
            warn!(
                date = %day.date(),
                pairing = code,
                "skipping trip day past the calendar range"
            );
        }
    }

    if let Some(trip) = open.take() {
        trips.push(trip.finish());
    }

    trips
}
