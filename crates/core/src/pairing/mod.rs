//! Stored pairings and account access.

pub mod ports;
