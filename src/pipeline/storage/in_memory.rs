use super::CandidateStore;
use crate::error::{IntakeError, Result};
use crate::types::{CandidateFilter, CandidateRecord, StoredCandidate};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Default)]
struct Inner {
    candidates: Vec<StoredCandidate>,
    last_id: i64,
}

/// In-memory storage implementation for development/testing
#[derive(Default)]
pub struct InMemoryCandidateStore {
    inner: Mutex<Inner>,
}

impl InMemoryCandidateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| IntakeError::StoreUnavailable("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl CandidateStore for InMemoryCandidateStore {
    async fn insert(&self, record: &CandidateRecord) -> Result<i64> {
        let mut inner = self.lock()?;
        inner.last_id += 1;
        let id = inner.last_id;
        inner.candidates.push(StoredCandidate {
            id,
            record: record.clone(),
        });

        debug!("Created candidate with id {}", id);
        Ok(id)
    }

    async fn insert_batch_with(
        &self,
        records: &[CandidateRecord],
        before_commit: &mut (dyn for<'ids> FnMut(&'ids [i64]) -> Result<()> + Send),
    ) -> Result<Vec<i64>> {
        // Single lock for the whole batch; nothing is stored until the hook succeeds
        let mut inner = self.lock()?;
        let ids: Vec<i64> = (1..=records.len() as i64).map(|n| inner.last_id + n).collect();
        before_commit(&ids)?;

        for (record, &id) in records.iter().zip(&ids) {
            inner.candidates.push(StoredCandidate {
                id,
                record: record.clone(),
            });
        }
        if let Some(&last) = ids.last() {
            inner.last_id = last;
        }

        debug!("Created {} candidates", ids.len());
        Ok(ids)
    }

    async fn query(&self, filter: &CandidateFilter) -> Result<Vec<StoredCandidate>> {
        let inner = self.lock()?;
        Ok(inner
            .candidates
            .iter()
            .filter(|c| filter.matches(&c.record))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.lock()?.candidates.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CandidateField;

    fn record(first_name: &str, country: &str) -> CandidateRecord {
        CandidateRecord {
            first_name: first_name.to_string(),
            country: country.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn ids_increase_across_batches() {
        let store = InMemoryCandidateStore::new();
        let first = store
            .insert_batch(&[record("Ana", "Germany"), record("Bo", "USA")])
            .await
            .unwrap();
        let single = store.insert(&record("Cy", "France")).await.unwrap();
        let second = store.insert_batch(&[record("Di", "Spain")]).await.unwrap();

        assert_eq!(first, vec![1, 2]);
        assert_eq!(single, 3);
        assert_eq!(second, vec![4]);
        assert_eq!(store.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn query_filters_by_substring() {
        let store = InMemoryCandidateStore::new();
        store
            .insert_batch(&[record("Ana", "Germany"), record("Bo", "USA")])
            .await
            .unwrap();

        let all = store.query(&CandidateFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let filter = CandidateFilter::default().with(CandidateField::Country, "erm");
        let hits = store.query(&filter).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.first_name, "Ana");
    }

    #[tokio::test]
    async fn failing_hook_stores_nothing() {
        let store = InMemoryCandidateStore::new();
        let result = store
            .insert_batch_with(&[record("Ana", "Germany")], &mut |_ids: &[i64]| {
                Err(IntakeError::Export("blocked".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(store.insert(&record("Bo", "USA")).await.unwrap(), 1);
    }
}
