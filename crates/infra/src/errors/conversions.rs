//! Conversions from external infrastructure errors into domain errors.

use crewcal_domain::CrewCalError;
use keyring::Error as KeyringError;
use reqwest::Error as HttpError;
use reqwest::StatusCode;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub CrewCalError);

impl From<InfraError> for CrewCalError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<CrewCalError> for InfraError {
    fn from(value: CrewCalError) -> Self {
        InfraError(value)
    }
}

trait IntoCrewCalError {
    fn into_crewcal(self) -> CrewCalError;
}

/// Map a non-success HTTP status and its body to a domain error.
///
/// The body is truncated so provider error pages do not flood logs.
pub fn status_error(status: StatusCode, body: &str) -> CrewCalError {
    let code = status.as_u16();
    let mut message =
        format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));
    let body = body.trim();
    if !body.is_empty() {
        let snippet: String = body.chars().take(300).collect();
        message.push_str(": ");
        message.push_str(&snippet);
    }

    match code {
        401 | 403 => CrewCalError::Auth(message),
        404 => CrewCalError::NotFound(message),
        429 => CrewCalError::Network(message),
        400..=499 => CrewCalError::InvalidInput(message),
        _ => CrewCalError::Network(message),
    }
}

/* -------------------------------------------------------------------------- */
/* keyring::Error → CrewCalError */
/* -------------------------------------------------------------------------- */

impl IntoCrewCalError for KeyringError {
    fn into_crewcal(self) -> CrewCalError {
        use KeyringError::*;

        let description = self.to_string();

        match self {
            NoEntry => CrewCalError::NotFound("keychain entry not found".into()),
            BadEncoding(_) => {
                CrewCalError::Storage("credential in keychain is not valid UTF-8".into())
            }
            TooLong(name, limit) => CrewCalError::Storage(format!(
                "keychain attribute '{name}' exceeds platform limit ({limit})"
            )),
            PlatformFailure(err) => {
                CrewCalError::Storage(format!("keychain platform error: {err}"))
            }
            NoStorageAccess(err) => {
                CrewCalError::Storage(format!("unable to access secure storage: {err}"))
            }
            _ => CrewCalError::Storage(description),
        }
    }
}

impl From<KeyringError> for InfraError {
    fn from(value: KeyringError) -> Self {
        InfraError(value.into_crewcal())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → CrewCalError */
/* -------------------------------------------------------------------------- */

impl IntoCrewCalError for HttpError {
    fn into_crewcal(self) -> CrewCalError {
        if self.is_timeout() {
            return CrewCalError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return CrewCalError::Network("HTTP connection failure".into());
        }

        if self.is_decode() {
            return CrewCalError::Parse(format!("unexpected response body: {self}"));
        }

        if let Some(status) = self.status() {
            return status_error(status, "");
        }

        CrewCalError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_crewcal())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json / io → CrewCalError */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(CrewCalError::Parse(format!("invalid JSON: {value}")))
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        let error = match value.kind() {
            std::io::ErrorKind::NotFound => CrewCalError::NotFound(value.to_string()),
            _ => CrewCalError::Storage(value.to_string()),
        };
        InfraError(error)
    }
}

impl From<url::ParseError> for InfraError {
    fn from(value: url::ParseError) -> Self {
        InfraError(CrewCalError::Config(format!("invalid URL: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
