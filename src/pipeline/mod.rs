// Candidate intake pipeline: ingestion, processing, storage and export

pub mod export;
pub mod ingestion;
pub mod orchestrator;
pub mod processing;
pub mod storage;

pub use orchestrator::{prepare_batch, PreparedBatch, UploadPipeline, UploadSummary};
