use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use crewcal_core::PairingRepository;
use crewcal_domain::{PairingRecord, Result as DomainResult};

/// In-memory pairing store keyed by user id.
#[derive(Default, Clone)]
pub struct InMemoryPairingRepository {
    rows: Arc<Mutex<Vec<PairingRecord>>>,
}

impl InMemoryPairingRepository {
    pub fn rows(&self) -> Vec<PairingRecord> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl PairingRepository for InMemoryPairingRepository {
    async fn upsert_pairings(
        &self,
        user_id: &str,
        pairings: &[PairingRecord],
    ) -> DomainResult<usize> {
        let mut rows = self.rows.lock().unwrap();
        let mut inserted = 0;
        for pairing in pairings {
            let exists =
                rows.iter().any(|row| row.user_id == user_id && row.key() == pairing.key());
            if !exists {
                let mut row = pairing.clone();
                row.user_id = user_id.to_string();
                row.id = Some(rows.len() as i64 + 1);
                rows.push(row);
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn list_pairings(&self, user_id: &str) -> DomainResult<Vec<PairingRecord>> {
        let mut rows: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(rows)
    }
}
