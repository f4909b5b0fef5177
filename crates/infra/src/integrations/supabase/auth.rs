//! GoTrue email/password accounts.

use async_trait::async_trait;
use crewcal_core::AuthProvider;
use crewcal_domain::{AuthSession, CrewCalError, Credentials, Result, SignUpRequest};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use super::client::SupabaseClient;
use crate::errors::{status_error, InfraError};

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: String,
    email: Option<String>,
}

/// Sign-in and confirmed sign-up return a session; sign-up that still
/// awaits email confirmation returns only the user.
#[derive(Debug, Deserialize)]
struct GoTrueResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: i64,
    user: Option<GoTrueUser>,
    id: Option<String>,
    email: Option<String>,
}

impl GoTrueResponse {
    fn into_session(self) -> Result<AuthSession> {
        let (user_id, email) = match self.user {
            Some(user) => (user.id, user.email),
            None => (
                self.id.ok_or_else(|| CrewCalError::Auth("auth response has no user".into()))?,
                self.email,
            ),
        };

        Ok(AuthSession {
            access_token: self.access_token.unwrap_or_default(),
            refresh_token: self.refresh_token,
            user_id,
            email,
            expires_in: self.expires_in,
        })
    }
}

fn require(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CrewCalError::InvalidInput(format!("{field} is required")));
    }
    Ok(())
}

/// Supabase-backed [`AuthProvider`].
pub struct SupabaseAuth {
    client: SupabaseClient,
}

impl SupabaseAuth {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    async fn session_request(&self, request: reqwest::RequestBuilder) -> Result<AuthSession> {
        let response = self.client.http().send(request).await?;
        let status = response.status();
        let body = response.text().await.map_err(InfraError::from)?;

        match status {
            s if s.is_success() => serde_json::from_str::<GoTrueResponse>(&body)
                .map_err(|err| CrewCalError::from(InfraError::from(err)))?
                .into_session(),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(CrewCalError::Auth(format!("request rejected: {}", body.trim())))
            }
            _ => Err(status_error(status, &body)),
        }
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    #[instrument(skip(self, request), fields(email = %request.credentials.email))]
    async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthSession> {
        require(&request.credentials.email, "email")?;
        require(&request.credentials.password, "password")?;
        require(&request.username, "username")?;

        let body = json!({
            "email": request.credentials.email,
            "password": request.credentials.password,
            "data": { "username": request.username },
        });
        let session =
            self.session_request(self.client.auth(Method::POST, "signup").json(&body)).await?;

        if session.access_token.is_empty() {
            info!(user_id = %session.user_id, "account created, awaiting email confirmation");
        } else {
            info!(user_id = %session.user_id, "account created");
        }
        Ok(session)
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession> {
        require(&credentials.email, "email")?;
        require(&credentials.password, "password")?;

        let request = self
            .client
            .auth(Method::POST, "token")
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": credentials.email, "password": credentials.password }));
        self.session_request(request).await
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, access_token: &str) -> Result<()> {
        let request = self.client.auth(Method::POST, "logout").bearer_auth(access_token);
        self.client.http().send_checked(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crewcal_domain::SupabaseConfig;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn auth(server: &MockServer) -> SupabaseAuth {
        let config = SupabaseConfig { url: server.uri(), service_role_key: "anon".into() };
        SupabaseAuth::new(SupabaseClient::new(&config).unwrap())
    }

    fn credentials(password: &str) -> Credentials {
        Credentials { email: "crew@example.com".into(), password: password.into() }
    }

    #[tokio::test]
    async fn sign_in_returns_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(body_partial_json(json!({"email": "crew@example.com"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "jwt",
                "refresh_token": "r",
                "expires_in": 3600,
                "user": {"id": "user-1", "email": "crew@example.com"}
            })))
            .mount(&server)
            .await;

        let session = auth(&server).sign_in(&credentials("pw")).await.unwrap();
        assert_eq!(session.user_id, "user-1");
        assert_eq!(session.access_token, "jwt");
        assert_eq!(session.expires_in, 3600);
    }

    #[tokio::test]
    async fn bad_password_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})),
            )
            .mount(&server)
            .await;

        let err = auth(&server).sign_in(&credentials("wrong")).await.unwrap_err();
        assert!(matches!(err, CrewCalError::Auth(_)));
    }

    #[tokio::test]
    async fn sign_up_sends_username_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .and(body_partial_json(json!({"data": {"username": "captain"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "user-2",
                "email": "crew@example.com"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = SignUpRequest { credentials: credentials("pw"), username: "captain".into() };
        let session = auth(&server).sign_up(&request).await.unwrap();
        assert_eq!(session.user_id, "user-2");
        assert!(session.access_token.is_empty());
    }

    #[tokio::test]
    async fn sign_up_requires_username() {
        let server = MockServer::start().await;
        let request = SignUpRequest { credentials: credentials("pw"), username: " ".into() };
        let err = auth(&server).sign_up(&request).await.unwrap_err();
        assert!(matches!(err, CrewCalError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn sign_out_uses_user_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .and(header("authorization", "Bearer user-jwt"))
            .and(header("apikey", "anon"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        auth(&server).sign_out("user-jwt").await.unwrap();
    }
}
