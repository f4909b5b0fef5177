//! Port interfaces for schedule acquisition
//!
//! The portal (or a saved page) is behind [`ScheduleSource`]; turning the
//! HTML into day records is an infrastructure concern injected as a plain
//! function.

use async_trait::async_trait;
use crewcal_domain::{DayRecord, Result};
use serde::{Deserialize, Serialize};

/// Day records parsed from one month of the master schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSchedule {
    pub month: u32,
    pub year: i32,
    pub days: Vec<DayRecord>,
}

/// HTML-to-records parser.
pub type ScheduleParser = fn(&str) -> Result<ParsedSchedule>;

/// Trait for retrieving raw schedule markup
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Fetch the master schedule page as HTML
    async fn fetch_schedule_html(&self) -> Result<String>;
}
