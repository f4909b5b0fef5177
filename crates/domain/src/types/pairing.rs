//! Persisted pairings and print-view details.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::schedule::{PayFigures, TripEvent};
use crate::utils::duration::{format_minutes, parse_duration_minutes};

/// A trip as stored per user in the pairings table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub user_id: String,
    pub pairing_code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub block_minutes: Option<i64>,
    #[serde(default)]
    pub credit_minutes: Option<i64>,
    #[serde(default)]
    pub trip_value: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl PairingRecord {
    /// Build the stored form of a grouped trip.
    pub fn from_trip(user_id: impl Into<String>, trip: &TripEvent) -> Self {
        Self {
            id: None,
            user_id: user_id.into(),
            pairing_code: trip.pairing_code.clone(),
            start_date: trip.start_date,
            end_date: trip.end_date,
            block_minutes: trip.pay.block.as_deref().and_then(parse_duration_minutes),
            credit_minutes: trip.pay.credit.as_deref().and_then(parse_duration_minutes),
            trip_value: trip.pay.value.clone(),
            description: trip.description.clone(),
        }
    }

    /// Rebuild a calendar-ready trip from the stored row.
    #[must_use]
    pub fn to_trip(&self) -> TripEvent {
        let span = (self.end_date - self.start_date).num_days().max(1);
        TripEvent {
            summary: TripEvent::summary_for(&self.pairing_code),
            pairing_code: self.pairing_code.clone(),
            start_date: self.start_date,
            end_date: self
                .start_date
                .checked_add_days(Days::new(1))
                .map_or(self.end_date, |next| self.end_date.max(next)),
            description: self.description.clone(),
            pay: PayFigures {
                block: self.block_minutes.map(format_minutes),
                credit: self.credit_minutes.map(format_minutes),
                value: self.trip_value.clone(),
            },
            day_count: u32::try_from(span).unwrap_or(u32::MAX),
        }
    }

    /// Identity used to avoid storing the same trip twice.
    #[must_use]
    pub fn key(&self) -> (&str, NaiveDate) {
        (&self.pairing_code, self.start_date)
    }
}

/// One flight leg listed in the print view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightLeg {
    pub flight_number: String,
    pub departure_airport: String,
    pub arrival_airport: String,
}

/// One crew member listed in the print view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewAssignment {
    pub name: String,
    pub position: String,
    pub employee_id: String,
}

/// Detailed pairing from the portal's print view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingDetail {
    pub pairing_code: String,
    pub start_date: NaiveDate,
    pub flights: Vec<FlightLeg>,
    pub crew: Vec<CrewAssignment>,
}
