//! Account types for the optional hosted persistence layer.

use serde::{Deserialize, Serialize};

/// Email/password credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("email", &self.email).finish_non_exhaustive()
    }
}

/// Registration request; `username` is stored as user metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub credentials: Credentials,
    pub username: String,
}

/// Authenticated session returned by sign-up or sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user_id: String,
    pub email: Option<String>,
    pub expires_in: i64,
}
