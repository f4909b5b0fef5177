//! Shared HTTP plumbing for the REST integrations.

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
