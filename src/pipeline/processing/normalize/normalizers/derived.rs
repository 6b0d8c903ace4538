use crate::constants::{
    COMPANY_NAME, CURRENT_JOB, DERIVED_SCHEMA, EMAIL, FIRST_NAME, LAST_NAME, LOCATION,
};
use crate::pipeline::ingestion::SourceRow;
use crate::pipeline::processing::normalize::location::parse_country;
use crate::types::CandidateRecord;

use super::base::SourceNormalizer;

/// Normalizer for the lead-generation tool's native export.
///
/// "Current Job" becomes the job title, the country comes from the combined
/// "Location" column, and phone is never supplied. Absent columns map to empty
/// values instead of rejecting the upload.
#[derive(Debug, Default)]
pub struct DerivedNormalizer;

impl DerivedNormalizer {
    pub fn new() -> Self {
        Self
    }
}

impl SourceNormalizer for DerivedNormalizer {
    fn normalize(&self, row: &SourceRow) -> CandidateRecord {
        CandidateRecord {
            first_name: row.get_or_empty(FIRST_NAME),
            last_name: row.get_or_empty(LAST_NAME),
            email: row.get_or_empty(EMAIL),
            phone: String::new(),
            job_title: row.get_or_empty(CURRENT_JOB),
            company_name: row.get_or_empty(COMPANY_NAME),
            country: parse_country(row.get(LOCATION)),
        }
    }

    fn source_id(&self) -> &str {
        DERIVED_SCHEMA
    }

    fn name(&self) -> &str {
        "Derived Location Normalizer"
    }
}
