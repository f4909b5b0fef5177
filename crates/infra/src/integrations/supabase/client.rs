//! Shared Supabase HTTP plumbing.

use crewcal_domain::{CrewCalError, Result, SupabaseConfig};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder};

use crate::http::HttpClient;

/// Authenticated client for one Supabase project.
///
/// Every request carries the project key as both `apikey` and bearer
/// token. Callers that act on behalf of a user override the bearer.
#[derive(Clone)]
pub struct SupabaseClient {
    http: HttpClient,
    base_url: String,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> Result<Self> {
        let base_url = config.url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() || config.service_role_key.trim().is_empty() {
            return Err(CrewCalError::Config("Supabase url and key must both be set".into()));
        }

        let key = config.service_role_key.trim();
        let invalid = |_| CrewCalError::Config("Supabase key contains invalid characters".into());
        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(key).map_err(invalid)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}")).map_err(invalid)?,
        );

        let http = HttpClient::builder().default_headers(headers).build()?;
        Ok(Self { http, base_url })
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Request against `rest/v1/<table>`.
    pub fn rest(&self, method: Method, table: &str) -> RequestBuilder {
        self.http.request(method, format!("{}/rest/v1/{}", self.base_url, table))
    }

    /// Request against `auth/v1/<path>`.
    pub fn auth(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}/auth/v1/{}", self.base_url, path))
    }
}
