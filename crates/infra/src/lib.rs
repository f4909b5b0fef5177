//! # CrewCal Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - HTML parsers for the crew portal's schedule pages
//! - HTTP client with retry and status mapping
//! - Google Calendar client, OAuth login and token storage
//! - Supabase pairing storage and accounts
//! - Configuration loading and the file schedule source
//!
//! ## Architecture
//! - Implements traits defined in `crewcal-core`
//! - Depends on `crewcal-domain` and `crewcal-core`
//! - Contains all "impure" code (I/O, network, keychain)

pub mod config;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod parsing;
pub mod sources;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use integrations::calendar::{
    token_store_for, AccessTokenProvider, GoogleCalendarClient, GoogleOAuth, GoogleOAuthSettings,
};
pub use integrations::supabase::{SupabaseAuth, SupabaseClient, SupabasePairingRepository};
pub use parsing::{parse_master_schedule, parse_print_view};
pub use sources::FileScheduleSource;
