//! # CrewCal Domain
//!
//! Business domain types and models for CrewCal.
//!
//! This crate contains:
//! - Schedule records (DayRecord, TripEvent, PairingRecord, etc.)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants and small pure helpers
//!
//! ## Architecture
//! - No dependencies on other CrewCal crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::duration::parse_duration_minutes;
