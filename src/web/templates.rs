use askama::Template;

use crate::pipeline::UploadSummary;
use crate::types::{CandidateField, CandidateFilter, StoredCandidate};

pub struct SchemaOption {
    pub name: String,
    pub selected: bool,
}

pub struct SummaryView {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub missing_rows: usize,
    pub dropped_rows: usize,
}

impl From<&UploadSummary> for SummaryView {
    fn from(summary: &UploadSummary) -> Self {
        Self {
            total_rows: summary.total_rows,
            valid_rows: summary.valid_rows,
            missing_rows: summary.missing_rows,
            dropped_rows: summary.dropped_rows,
        }
    }
}

#[derive(Template)]
#[template(path = "upload.html")]
pub struct UploadTemplate {
    pub schemas: Vec<SchemaOption>,
    pub message: Option<String>,
    pub summary: Option<SummaryView>,
}

pub struct FilterInput {
    pub name: &'static str,
    pub label: &'static str,
    pub value: String,
}

impl FilterInput {
    pub fn from_filter(filter: &CandidateFilter) -> Vec<FilterInput> {
        let active = filter.active();
        CandidateField::ALL
            .iter()
            .map(|&field| FilterInput {
                name: field.column(),
                label: field.header(),
                value: active
                    .iter()
                    .find(|(f, _)| *f == field)
                    .map(|(_, v)| v.to_string())
                    .unwrap_or_default(),
            })
            .collect()
    }
}

#[derive(Template)]
#[template(path = "report.html")]
pub struct ReportTemplate {
    pub filters: Vec<FilterInput>,
    pub candidates: Vec<StoredCandidate>,
}
