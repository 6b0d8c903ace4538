use crate::error::{IntakeError, Result};
use crate::pipeline::ingestion::SourceRow;
use crate::types::CandidateRecord;

/// Base trait for source-specific normalizers.
///
/// A normalizer owns one source layout: which header columns it insists on,
/// how a row maps onto the canonical record, and which mapped rows are worth
/// keeping at all.
pub trait SourceNormalizer: Send + Sync {
    /// Map one source row into exactly one canonical record
    fn normalize(&self, row: &SourceRow) -> CandidateRecord;

    /// Get the source schema ID this normalizer handles
    fn source_id(&self) -> &str;

    /// Get a human-readable name for this normalizer
    fn name(&self) -> &str;

    /// Header columns whose absence rejects the whole upload
    fn required_columns(&self) -> &[&'static str] {
        &[]
    }

    /// Whether a mapped record takes part in the batch at all.
    /// Records refused here are dropped before partitioning.
    fn admits(&self, _record: &CandidateRecord) -> bool {
        true
    }

    /// Reject the upload when any required column is missing from the header
    fn validate_headers(&self, headers: &[String]) -> Result<()> {
        let missing: Vec<String> = self
            .required_columns()
            .iter()
            .filter(|column| !headers.iter().any(|h| h == *column))
            .map(|column| column.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(IntakeError::MissingColumns(missing))
        }
    }
}
