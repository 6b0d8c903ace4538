// Candidate persistence: append-only store with substring queries

pub mod in_memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{CandidateFilter, CandidateRecord, StoredCandidate};

pub use in_memory::InMemoryCandidateStore;
pub use sqlite::SqliteCandidateStore;

/// Storage trait for persisting candidates.
///
/// Identifiers are assigned by the store, strictly increasing and never reused.
/// Candidates are never updated or deleted.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// Persist one candidate and return its identifier
    async fn insert(&self, record: &CandidateRecord) -> Result<i64>;

    /// Persist a whole batch as one unit of work: either every record is stored or none is
    async fn insert_batch(&self, records: &[CandidateRecord]) -> Result<Vec<i64>> {
        let mut no_hook = |_ids: &[i64]| -> Result<()> { Ok(()) };
        self.insert_batch_with(records, &mut no_hook).await
    }

    /// Like `insert_batch`, running `before_commit` with the new identifiers once every
    /// record is written but before the batch becomes visible. An error from the hook
    /// discards the batch.
    async fn insert_batch_with(
        &self,
        records: &[CandidateRecord],
        before_commit: &mut (dyn for<'ids> FnMut(&'ids [i64]) -> Result<()> + Send),
    ) -> Result<Vec<i64>>;

    /// Stored candidates matching every active filter, ordered by identifier
    async fn query(&self, filter: &CandidateFilter) -> Result<Vec<StoredCandidate>>;

    async fn count(&self) -> Result<usize>;
}
