use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::{IntakeError, Result};
use crate::metrics::{
    ROWS_DROPPED_TOTAL, ROWS_MISSING_TOTAL, ROWS_VALID_TOTAL, UPLOADS_TOTAL, UPLOAD_REJECTIONS_TOTAL,
};
use crate::pipeline::export::{ExportWriter, PublishedExport};
use crate::pipeline::ingestion::{read_source_table, SourceTable};
use crate::pipeline::processing::normalize::NormalizationRegistry;
use crate::pipeline::processing::quality_gate::{DefaultQualityGate, Partition, QualityGate};
use crate::pipeline::storage::CandidateStore;

/// Mapped and classified rows of one upload, before anything is persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedBatch {
    pub schema: String,
    pub total_rows: usize,
    /// Rows the source layout refused before partitioning (not contactable)
    pub dropped_rows: usize,
    pub partition: Partition,
}

/// Outcome of one successfully processed upload
#[derive(Debug, Clone, Serialize)]
pub struct UploadSummary {
    pub batch_id: Uuid,
    pub schema: String,
    pub total_rows: usize,
    pub dropped_rows: usize,
    pub valid_rows: usize,
    pub missing_rows: usize,
    pub inserted_ids: Vec<i64>,
    pub ready_path: PathBuf,
    pub missing_path: PathBuf,
    pub processed_at: DateTime<Utc>,
}

/// Map, filter and partition every row of a parsed upload. Pure: no store, no files.
pub fn prepare_batch(
    registry: &NormalizationRegistry,
    gate: &dyn QualityGate,
    table: &SourceTable,
    schema: &str,
) -> Result<PreparedBatch> {
    let normalizer = registry.get_normalizer(schema)?;
    normalizer.validate_headers(&table.headers)?;

    let mapped: Vec<_> = table.rows.iter().map(|row| normalizer.normalize(row)).collect();
    let total_rows = mapped.len();
    let admitted: Vec<_> = mapped
        .into_iter()
        .filter(|record| normalizer.admits(record))
        .collect();
    let dropped_rows = total_rows - admitted.len();

    Ok(PreparedBatch {
        schema: normalizer.source_id().to_string(),
        total_rows,
        dropped_rows,
        partition: gate.partition(admitted),
    })
}

/// Runs one upload end to end: parse, map, validate, persist, export
pub struct UploadPipeline {
    registry: NormalizationRegistry,
    gate: Box<dyn QualityGate + Send + Sync>,
    store: Arc<dyn CandidateStore>,
    exporter: ExportWriter,
}

impl UploadPipeline {
    pub fn new(store: Arc<dyn CandidateStore>, exporter: ExportWriter) -> Self {
        Self {
            registry: NormalizationRegistry::new(),
            gate: Box::new(DefaultQualityGate::new()),
            store,
            exporter,
        }
    }

    pub fn with_registry(mut self, registry: NormalizationRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_gate(mut self, gate: Box<dyn QualityGate + Send + Sync>) -> Self {
        self.gate = gate;
        self
    }

    pub fn store(&self) -> Arc<dyn CandidateStore> {
        self.store.clone()
    }

    pub fn exporter(&self) -> &ExportWriter {
        &self.exporter
    }

    pub fn registry(&self) -> &NormalizationRegistry {
        &self.registry
    }

    /// Process an uploaded file.
    ///
    /// Rejections (wrong file type, unparseable CSV, unknown schema, missing header
    /// columns) happen before any side effect. Valid rows are committed in one
    /// transaction and the export files are only replaced once that commit succeeds.
    pub async fn process_upload(
        &self,
        file_name: &str,
        bytes: &[u8],
        schema: &str,
    ) -> Result<UploadSummary> {
        let batch_id = Uuid::new_v4();
        let span = info_span!("upload", batch = %batch_id, file = %file_name, schema = %schema);

        let result = self
            .run_upload(batch_id, file_name, bytes, schema)
            .instrument(span)
            .await;

        counter!(UPLOADS_TOTAL).increment(1);
        if let Err(e) = &result {
            if e.is_rejection() {
                counter!(UPLOAD_REJECTIONS_TOTAL).increment(1);
            }
        }
        result
    }

    async fn run_upload(
        &self,
        batch_id: Uuid,
        file_name: &str,
        bytes: &[u8],
        schema: &str,
    ) -> Result<UploadSummary> {
        if !file_name.to_ascii_lowercase().ends_with(".csv") {
            warn!("Rejected upload with non-CSV file name");
            return Err(IntakeError::UnsupportedFile(file_name.to_string()));
        }

        let table = read_source_table(bytes).map_err(|e| {
            warn!("Rejected unparseable upload: {}", e);
            e
        })?;

        let batch = prepare_batch(&self.registry, self.gate.as_ref(), &table, schema).map_err(|e| {
            warn!("Rejected upload: {}", e);
            e
        })?;

        for missing in &batch.partition.missing {
            let fields: Vec<&str> = missing.missing_fields.iter().map(|f| f.column()).collect();
            tracing::debug!("Row missing required fields: {}", fields.join(", "));
        }

        if batch.partition.is_empty() {
            info!("Upload has no rows left to partition; exports will only carry headers");
        }

        let missing_records = batch.partition.missing_records();
        let mut staged = Some(self.exporter.stage(&batch.partition.valid, &missing_records)?);
        let mut published: Option<PublishedExport> = None;

        // Exports go live while the transaction is still open, so a failed publish
        // discards the batch and a failed commit puts the previous exports back.
        let inserted = self
            .store
            .insert_batch_with(&batch.partition.valid, &mut |_ids: &[i64]| {
                if let Some(staged) = staged.take() {
                    published = Some(staged.publish()?);
                }
                Ok(())
            })
            .await;

        let inserted_ids = match inserted {
            Ok(ids) => ids,
            Err(e) => {
                if let Some(published) = published.take() {
                    published.rollback();
                }
                error!("Batch not saved: {}", e);
                return Err(e);
            }
        };

        let paths = match (published, staged) {
            (Some(published), _) => published.finish(),
            // The store committed without running the hook
            (None, Some(staged)) => staged.publish()?.finish(),
            (None, None) => {
                return Err(IntakeError::Export(
                    "exports were neither published nor staged".to_string(),
                ))
            }
        };

        counter!(ROWS_VALID_TOTAL).increment(batch.partition.valid.len() as u64);
        counter!(ROWS_MISSING_TOTAL).increment(batch.partition.missing.len() as u64);
        counter!(ROWS_DROPPED_TOTAL).increment(batch.dropped_rows as u64);

        info!(
            "Processed {} rows: {} valid, {} missing required fields, {} dropped",
            batch.total_rows,
            batch.partition.valid.len(),
            batch.partition.missing.len(),
            batch.dropped_rows
        );

        Ok(UploadSummary {
            batch_id,
            schema: batch.schema,
            total_rows: batch.total_rows,
            dropped_rows: batch.dropped_rows,
            valid_rows: batch.partition.valid.len(),
            missing_rows: batch.partition.missing.len(),
            inserted_ids,
            ready_path: paths.ready,
            missing_path: paths.missing,
            processed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ingestion::SourceRow;

    fn derived_table() -> SourceTable {
        SourceTable {
            headers: vec![
                "First Name".to_string(),
                "Last Name".to_string(),
                "Current Job".to_string(),
                "Email".to_string(),
                "Company Name".to_string(),
                "Location".to_string(),
            ],
            rows: vec![
                SourceRow::new()
                    .with("First Name", "Ana")
                    .with("Last Name", "Diaz")
                    .with("Current Job", "Engineer")
                    .with("Email", "a@x.com")
                    .with("Company Name", "Acme")
                    .with("Location", "Berlin, Germany"),
                SourceRow::new()
                    .with("First Name", "Bo")
                    .with("Email", "b@x.com")
                    .with("Location", "Remote"),
            ],
        }
    }

    #[test]
    fn prepare_batch_is_deterministic() {
        let registry = NormalizationRegistry::new();
        let gate = DefaultQualityGate::new();
        let table = derived_table();

        let first = prepare_batch(&registry, &gate, &table, "derived").unwrap();
        let second = prepare_batch(&registry, &gate, &table, "derived").unwrap();
        assert_eq!(first, second);
        assert_eq!(first.total_rows, 2);
        assert_eq!(first.dropped_rows, 0);
        assert_eq!(first.partition.valid.len(), 1);
        assert_eq!(first.partition.missing.len(), 1);
    }

    #[test]
    fn prepare_batch_rejects_unknown_schema() {
        let registry = NormalizationRegistry::new();
        let gate = DefaultQualityGate::new();
        let err = prepare_batch(&registry, &gate, &derived_table(), "xlsx").unwrap_err();
        assert!(matches!(err, IntakeError::UnknownSchema(_)));
    }

    #[test]
    fn prepare_batch_rejects_direct_schema_without_columns() {
        let registry = NormalizationRegistry::new();
        let gate = DefaultQualityGate::new();
        let err = prepare_batch(&registry, &gate, &derived_table(), "direct").unwrap_err();
        match err {
            IntakeError::MissingColumns(missing) => {
                assert_eq!(missing, vec!["Phone Number", "Job Title", "Country"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
