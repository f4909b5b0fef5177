//! Supabase integration
//!
//! PostgREST storage for pairings and GoTrue email/password accounts.

pub mod auth;
pub mod client;
pub mod pairings;

pub use auth::SupabaseAuth;
pub use client::SupabaseClient;
pub use pairings::SupabasePairingRepository;
