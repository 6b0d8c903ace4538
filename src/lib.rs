pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod types;
pub mod web;

pub use error::{IntakeError, Result};
pub use types::{CandidateField, CandidateFilter, CandidateRecord, StoredCandidate};
