//! # CrewCal Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The schedule grouping algorithm and description synthesis
//! - Port/adapter interfaces (traits)
//! - The schedule sync use case
//!
//! ## Architecture Principles
//! - Only depends on `crewcal-domain`
//! - No HTML, HTTP, or storage code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod calendar_ports;
pub mod pairing;
pub mod schedule;
pub mod sync;

// Re-export specific items to avoid ambiguity
pub use calendar_ports::TripCalendar;
pub use pairing::ports::{AuthProvider, PairingRepository};
pub use schedule::grouping::{group_days, group_days_with, GroupingPolicy};
pub use schedule::ports::{ParsedSchedule, ScheduleParser, ScheduleSource};
pub use sync::service::{ScheduleSyncService, SyncOptions, SyncPreview, SyncReport};
