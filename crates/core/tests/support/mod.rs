//! Shared test helpers for `crewcal-core` integration tests.
//!
//! The fake schedule source hands out a JSON-encoded [`ParsedSchedule`] and
//! [`json_parser`] decodes it, so tests can describe day records directly
//! instead of writing portal HTML.

#![allow(dead_code)]

pub mod calendar;
pub mod repositories;

use async_trait::async_trait;
use chrono::NaiveDate;
use crewcal_core::{ParsedSchedule, ScheduleSource};
use crewcal_domain::{CrewCalError, DayRecord, Result as DomainResult};

pub fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).unwrap()
}

/// Trip day on 2025-07-`day`, 06:00 to 18:00.
pub fn trip_day(code: &str, day: u32, text: &str) -> DayRecord {
    let d = date(7, day);
    DayRecord::trip_day(
        code,
        d.and_hms_opt(6, 0, 0).unwrap(),
        d.and_hms_opt(18, 0, 0).unwrap(),
        text,
    )
}

pub fn day_off(day: u32) -> DayRecord {
    DayRecord::day_off(date(7, day))
}

pub fn schedule(days: Vec<DayRecord>) -> ParsedSchedule {
    ParsedSchedule { month: 7, year: 2025, days }
}

/// Decodes what [`StaticScheduleSource`] serves.
pub fn json_parser(html: &str) -> DomainResult<ParsedSchedule> {
    serde_json::from_str(html).map_err(|err| CrewCalError::Parse(err.to_string()))
}

/// Serves a fixed schedule.
pub struct StaticScheduleSource {
    body: String,
}

impl StaticScheduleSource {
    pub fn new(schedule: &ParsedSchedule) -> Self {
        Self { body: serde_json::to_string(schedule).unwrap() }
    }
}

#[async_trait]
impl ScheduleSource for StaticScheduleSource {
    async fn fetch_schedule_html(&self) -> DomainResult<String> {
        Ok(self.body.clone())
    }
}
