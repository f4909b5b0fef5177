//! `pairings` table via PostgREST.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use crewcal_core::PairingRepository;
use crewcal_domain::{PairingRecord, Result};
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use super::client::SupabaseClient;

const TABLE: &str = "pairings";

#[derive(Debug, Deserialize)]
struct PairingKey {
    pairing_code: String,
    start_date: NaiveDate,
}

/// Supabase-backed [`PairingRepository`].
pub struct SupabasePairingRepository {
    client: SupabaseClient,
}

impl SupabasePairingRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    async fn existing_keys(&self, user_id: &str) -> Result<HashSet<(String, NaiveDate)>> {
        let user_filter = format!("eq.{user_id}");
        let request = self
            .client
            .rest(Method::GET, TABLE)
            .query(&[("select", "pairing_code,start_date"), ("user_id", user_filter.as_str())]);
        let rows: Vec<PairingKey> = self.client.http().send_json(request).await?;
        Ok(rows.into_iter().map(|row| (row.pairing_code, row.start_date)).collect())
    }
}

#[async_trait]
impl PairingRepository for SupabasePairingRepository {
    #[instrument(skip(self, pairings), fields(count = pairings.len()))]
    async fn upsert_pairings(&self, user_id: &str, pairings: &[PairingRecord]) -> Result<usize> {
        let mut seen = self.existing_keys(user_id).await?;

        let fresh: Vec<PairingRecord> = pairings
            .iter()
            .filter(|record| seen.insert((record.pairing_code.clone(), record.start_date)))
            .map(|record| PairingRecord {
                id: None,
                user_id: user_id.to_string(),
                ..record.clone()
            })
            .collect();

        if fresh.is_empty() {
            debug!("all pairings already stored");
            return Ok(0);
        }

        let request = self
            .client
            .rest(Method::POST, TABLE)
            .header("Prefer", "return=representation")
            .json(&fresh);
        let inserted: Vec<PairingRecord> = self.client.http().send_json(request).await?;

        info!(inserted = inserted.len(), skipped = pairings.len() - fresh.len(), "stored pairings");
        Ok(inserted.len())
    }

    #[instrument(skip(self))]
    async fn list_pairings(&self, user_id: &str) -> Result<Vec<PairingRecord>> {
        let user_filter = format!("eq.{user_id}");
        let request = self.client.rest(Method::GET, TABLE).query(&[
            ("select", "*"),
            ("user_id", user_filter.as_str()),
            ("order", "start_date.desc"),
        ]);
        self.client.http().send_json(request).await
    }
}
