//! Port interfaces for pairing persistence and user accounts

use async_trait::async_trait;
use crewcal_domain::{AuthSession, Credentials, PairingRecord, Result, SignUpRequest};

/// Trait for per-user pairing storage
#[async_trait]
pub trait PairingRepository: Send + Sync {
    /// Store pairings not already present for `user_id`.
    ///
    /// Existing rows are matched on pairing code and start date. Returns
    /// the number of rows inserted.
    async fn upsert_pairings(&self, user_id: &str, pairings: &[PairingRecord]) -> Result<usize>;

    /// All stored pairings for `user_id`, newest start date first
    async fn list_pairings(&self, user_id: &str) -> Result<Vec<PairingRecord>>;
}

/// Trait for account sign-up and sign-in
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthSession>;

    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession>;

    /// Invalidate the session behind `access_token`
    async fn sign_out(&self, access_token: &str) -> Result<()>;
}
