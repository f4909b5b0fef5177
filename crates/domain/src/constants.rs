//! Application constants
//!
//! Centralized location for domain-level constants used throughout the
//! application.

// Calendar push
pub const DEFAULT_CALENDAR_NAME: &str = "Crew Schedule";
pub const DEFAULT_TIMEZONE: &str = "America/New_York";
pub const TRIP_SUMMARY_PREFIX: &str = "Trip:";
/// Value of the private extended property that marks events we created.
pub const APP_EVENT_MARKER: &str = "crewcal";
pub const APP_EVENT_MARKER_KEY: &str = "createdBy";

// Cleanup window used when past trips are not preserved
pub const CLEANUP_LOOKBACK_MONTHS: u32 = 2;
pub const CLEANUP_LOOKAHEAD_MONTHS: u32 = 12;

// Grouping
pub const DEFAULT_INITIAL_SPAN_DAYS: i64 = 1;
pub const PADDED_INITIAL_SPAN_DAYS: i64 = 2;
pub const MAX_CONTIGUOUS_GAP_DAYS: i64 = 1;

// Portal
pub const DEFAULT_PORTAL_URL: &str = "https://ccs.ual.com/CCS/default.aspx";
