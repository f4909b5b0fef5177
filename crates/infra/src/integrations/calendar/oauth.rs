//! Google OAuth 2.0 for installed apps.
//!
//! Authorization code flow with PKCE (S256) and a loopback redirect. Tokens
//! are persisted through a [`TokenStore`] and refreshed on demand.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::Query;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use crewcal_domain::{CrewCalError, GoogleConfig, Result};
use rand::Rng;
use reqwest::Method;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};
use url::Url;

use super::token_store::{TokenSet, TokenStore};
use crate::errors::InfraError;
use crate::http::HttpClient;

pub const GOOGLE_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
pub const GOOGLE_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/calendar",
    "https://www.googleapis.com/auth/userinfo.email",
];

/// Refresh when the access token has less than this many seconds left.
const REFRESH_THRESHOLD_SECONDS: i64 = 300;

/// Source of bearer tokens for Google API calls.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// Fixed bearer token.
pub struct StaticAccessToken(pub String);

#[async_trait]
impl AccessTokenProvider for StaticAccessToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// OAuth client settings.
#[derive(Debug, Clone)]
pub struct GoogleOAuthSettings {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
    pub scopes: Vec<String>,
}

impl GoogleOAuthSettings {
    /// Google endpoints with the calendar and email scopes.
    pub fn google(client_id: impl Into<String>, client_secret: Option<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            authorization_endpoint: GOOGLE_AUTH_ENDPOINT.to_string(),
            token_endpoint: GOOGLE_TOKEN_ENDPOINT.to_string(),
            userinfo_endpoint: GOOGLE_USERINFO_ENDPOINT.to_string(),
            scopes: GOOGLE_SCOPES.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn from_config(config: &GoogleConfig) -> Result<Self> {
        config.require_client()?;
        Ok(Self::google(config.client_id.clone(), config.client_secret.clone()))
    }
}

/// PKCE verifier, challenge and CSRF state for one login attempt.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    pub code_verifier: String,
    pub code_challenge: String,
    pub state: String,
}

impl PkceChallenge {
    pub fn generate() -> Self {
        let code_verifier = random_token();
        let code_challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(code_verifier.as_bytes()));
        Self { code_verifier, code_challenge, state: random_token() }
    }
}

fn random_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    URL_SAFE_NO_PAD.encode(bytes)
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: i64,
    scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    email: Option<String>,
}

/// Google OAuth manager for a single stored account.
pub struct GoogleOAuth {
    settings: GoogleOAuthSettings,
    http: HttpClient,
    store: Arc<dyn TokenStore>,
    account: String,
}

impl GoogleOAuth {
    pub fn new(
        settings: GoogleOAuthSettings,
        store: Arc<dyn TokenStore>,
        account: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self { settings, http: HttpClient::new()?, store, account: account.into() })
    }

    pub fn with_http(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }

    /// Authorization URL for the browser step.
    pub fn authorization_url(&self, redirect_uri: &str, pkce: &PkceChallenge) -> Result<String> {
        let mut url = Url::parse(&self.settings.authorization_endpoint).map_err(InfraError::from)?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.settings.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", &self.settings.scopes.join(" "))
            .append_pair("state", &pkce.state)
            .append_pair("code_challenge", &pkce.code_challenge)
            .append_pair("code_challenge_method", "S256")
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");
        Ok(url.into())
    }

    /// Run the full loopback login and persist the resulting tokens.
    ///
    /// `on_url` receives the authorization URL so the caller can open or
    /// print it.
    pub async fn login<F>(&self, timeout: Duration, on_url: F) -> Result<TokenSet>
    where
        F: FnOnce(&str),
    {
        let pkce = PkceChallenge::generate();
        let mut server = OAuthCallbackServer::start(pkce.state.clone()).await?;
        let redirect_uri = server.redirect_uri();

        on_url(&self.authorization_url(&redirect_uri, &pkce)?);

        let code = server.wait_for_code(timeout).await?;
        server.shutdown().await?;

        let mut tokens = self.exchange_code(&code, &pkce.code_verifier, &redirect_uri).await?;
        match self.fetch_email(&tokens.access_token).await {
            Ok(email) => tokens.email = Some(email),
            Err(err) => debug!(error = %err, "could not look up account email"),
        }

        self.store.save(&self.account, &tokens).await?;
        info!(account = %self.account, email = ?tokens.email, "Google account connected");
        Ok(tokens)
    }

    /// Exchange an authorization code for tokens.
    #[instrument(skip(self, code, code_verifier))]
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> Result<TokenSet> {
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("client_id", self.settings.client_id.as_str()),
            ("code", code),
            ("code_verifier", code_verifier),
            ("redirect_uri", redirect_uri),
        ];
        if let Some(secret) = &self.settings.client_secret {
            form.push(("client_secret", secret.as_str()));
        }

        let response = self.token_request(&form).await?;
        let mut tokens =
            TokenSet::new(response.access_token, response.refresh_token, response.expires_in);
        tokens.scope = response.scope;
        Ok(tokens)
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// Google usually omits the refresh token on refresh; the old one is
    /// kept in that case.
    #[instrument(skip_all)]
    pub async fn refresh(&self, current: &TokenSet) -> Result<TokenSet> {
        let refresh_token = current.refresh_token.as_deref().ok_or_else(|| {
            CrewCalError::Auth("no refresh token stored; run `crewcal auth login`".into())
        })?;

        let mut form = vec![
            ("grant_type", "refresh_token"),
            ("client_id", self.settings.client_id.as_str()),
            ("refresh_token", refresh_token),
        ];
        if let Some(secret) = &self.settings.client_secret {
            form.push(("client_secret", secret.as_str()));
        }

        let response = self.token_request(&form).await?;
        let mut tokens = TokenSet::new(
            response.access_token,
            response.refresh_token.or_else(|| current.refresh_token.clone()),
            response.expires_in,
        );
        tokens.scope = response.scope.or_else(|| current.scope.clone());
        tokens.email = current.email.clone();
        Ok(tokens)
    }

    /// Email address of the token's owner.
    pub async fn fetch_email(&self, access_token: &str) -> Result<String> {
        let request = self
            .http
            .request(Method::GET, self.settings.userinfo_endpoint.as_str())
            .bearer_auth(access_token);
        let info: UserInfo = self.http.send_json(request).await?;
        info.email.ok_or_else(|| CrewCalError::Auth("userinfo response has no email".into()))
    }

    /// Stored tokens, if any.
    pub async fn status(&self) -> Result<Option<TokenSet>> {
        self.store.load(&self.account).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.store.delete(&self.account).await?;
        info!(account = %self.account, "Google tokens removed");
        Ok(())
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let request =
            self.http.request(Method::POST, self.settings.token_endpoint.as_str()).form(form);
        let response = self.http.send(request).await?;
        let status = response.status();
        let body = response.text().await.map_err(InfraError::from)?;

        if status.is_success() {
            return serde_json::from_str(&body).map_err(|err| InfraError::from(err).into());
        }

        match serde_json::from_str::<TokenErrorResponse>(&body) {
            Ok(err) if status.is_client_error() => Err(CrewCalError::Auth(format!(
                "token endpoint rejected request: {}{}",
                err.error,
                err.error_description.map(|d| format!(" ({d})")).unwrap_or_default()
            ))),
            _ => Err(crate::errors::status_error(status, &body)),
        }
    }
}

#[async_trait]
impl AccessTokenProvider for GoogleOAuth {
    /// Current access token, refreshed and re-saved when close to expiry.
    async fn access_token(&self) -> Result<String> {
        let tokens = self.store.load(&self.account).await?.ok_or_else(|| {
            CrewCalError::Auth("Google account not connected; run `crewcal auth login`".into())
        })?;

        if !tokens.is_expired(REFRESH_THRESHOLD_SECONDS) {
            return Ok(tokens.access_token);
        }

        debug!(account = %self.account, "refreshing Google access token");
        let refreshed = self.refresh(&tokens).await?;
        self.store.save(&self.account, &refreshed).await?;
        Ok(refreshed.access_token)
    }
}

type CodeSender = oneshot::Sender<std::result::Result<String, String>>;

/// Loopback HTTP server that receives the OAuth redirect.
pub struct OAuthCallbackServer {
    port: u16,
    code_rx: Option<oneshot::Receiver<std::result::Result<String, String>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl OAuthCallbackServer {
    /// Start on an ephemeral 127.0.0.1 port, accepting only `expected_state`.
    pub async fn start(expected_state: String) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await.map_err(|err| {
            CrewCalError::Network(format!("failed to bind OAuth loopback server: {err}"))
        })?;

        let port = listener
            .local_addr()
            .map_err(|err| CrewCalError::Network(format!("failed to determine port: {err}")))?
            .port();

        let (code_tx, code_rx) = oneshot::channel();
        let code_tx: Arc<StdMutex<Option<CodeSender>>> = Arc::new(StdMutex::new(Some(code_tx)));
        let expected_state = Arc::new(expected_state);

        let app = Router::new().route(
            "/callback",
            get(move |query: Query<HashMap<String, String>>| {
                handle_oauth_callback(query, code_tx.clone(), expected_state.clone())
            }),
        );

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
            {
                error!("OAuth callback server error: {}", err);
            }
        });

        Ok(Self {
            port,
            code_rx: Some(code_rx),
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Redirect URI used in the authorization request.
    pub fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}/callback", self.port)
    }

    /// Wait for the first callback carrying the expected state.
    pub async fn wait_for_code(&mut self, timeout: Duration) -> Result<String> {
        let code_rx = self
            .code_rx
            .take()
            .ok_or_else(|| CrewCalError::Internal("OAuth callback already consumed".into()))?;

        match tokio::time::timeout(timeout, code_rx).await {
            Ok(Ok(Ok(code))) => Ok(code),
            Ok(Ok(Err(reason))) => Err(CrewCalError::Auth(reason)),
            Ok(Err(_)) => Err(CrewCalError::Internal("OAuth callback server stopped".into())),
            Err(_) => Err(CrewCalError::Network(
                "OAuth callback timeout waiting for authorization code".into(),
            )),
        }
    }

    /// Shut down the loopback server gracefully.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                if err.is_panic() {
                    return Err(CrewCalError::Internal(format!(
                        "OAuth callback server panicked: {err}"
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Drop for OAuthCallbackServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                handle.abort();
            }
        }
    }
}

async fn handle_oauth_callback(
    Query(params): Query<HashMap<String, String>>,
    code_tx: Arc<StdMutex<Option<CodeSender>>>,
    expected_state: Arc<String>,
) -> Html<&'static str> {
    let outcome = match (params.get("code"), params.get("state"), params.get("error")) {
        (_, _, Some(error)) => Err(format!("authorization denied: {error}")),
        (Some(code), Some(state), None) if state == expected_state.as_str() => Ok(code.clone()),
        (Some(_), Some(_), None) => Err("OAuth state mismatch".to_string()),
        _ => Err("callback is missing code or state".to_string()),
    };
    let succeeded = outcome.is_ok();

    let sender = code_tx.lock().ok().and_then(|mut guard| guard.take());
    if let Some(sender) = sender {
        let _ = sender.send(outcome);
    }

    if succeeded {
        Html(
            r#"<!DOCTYPE html>
<html>
<head><title>CrewCal Connected</title></head>
<body><h1>Google Calendar connected</h1><p>You can close this window.</p></body>
</html>"#,
        )
    } else {
        Html(
            r#"<!DOCTYPE html>
<html>
<head><title>Authorization Failed</title></head>
<body><h1>Authorization Failed</h1><p>Return to the terminal for details.</p></body>
</html>"#,
        )
    }
}
