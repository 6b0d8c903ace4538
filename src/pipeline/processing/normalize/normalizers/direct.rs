use crate::constants::{
    COMPANY_NAME, COUNTRY, DIRECT_SCHEMA, EMAIL, FIRST_NAME, JOB_TITLE, LAST_NAME, PHONE_NUMBER,
};
use crate::types::CandidateRecord;
use crate::pipeline::ingestion::SourceRow;

use super::base::SourceNormalizer;

const REQUIRED_COLUMNS: [&str; 7] = [
    FIRST_NAME,
    LAST_NAME,
    EMAIL,
    PHONE_NUMBER,
    JOB_TITLE,
    COMPANY_NAME,
    COUNTRY,
];

/// Normalizer for uploads whose headers already match the canonical names.
/// Every canonical column must be present; rows with neither email nor phone are dropped.
#[derive(Debug, Default)]
pub struct DirectNormalizer;

impl DirectNormalizer {
    pub fn new() -> Self {
        Self
    }
}

impl SourceNormalizer for DirectNormalizer {
    fn normalize(&self, row: &SourceRow) -> CandidateRecord {
        CandidateRecord {
            first_name: row.get_or_empty(FIRST_NAME),
            last_name: row.get_or_empty(LAST_NAME),
            email: row.get_or_empty(EMAIL),
            phone: row.get_or_empty(PHONE_NUMBER),
            job_title: row.get_or_empty(JOB_TITLE),
            company_name: row.get_or_empty(COMPANY_NAME),
            country: row.get_or_empty(COUNTRY),
        }
    }

    fn source_id(&self) -> &str {
        DIRECT_SCHEMA
    }

    fn name(&self) -> &str {
        "Direct Column Normalizer"
    }

    fn required_columns(&self) -> &[&'static str] {
        &REQUIRED_COLUMNS
    }

    fn admits(&self, record: &CandidateRecord) -> bool {
        !record.email.trim().is_empty() || !record.phone.trim().is_empty()
    }
}
