use serde::{Deserialize, Serialize};

use crate::constants;

/// Canonical candidate record every source layout is mapped into.
/// Empty strings stand in for absent values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub job_title: String,
    pub company_name: String,
    pub country: String,
}

/// A persisted candidate with its store-assigned identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCandidate {
    pub id: i64,
    #[serde(flatten)]
    pub record: CandidateRecord,
}

/// The canonical fields of a candidate record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateField {
    FirstName,
    LastName,
    Email,
    Phone,
    JobTitle,
    CompanyName,
    Country,
}

impl CandidateField {
    /// Storage order, matching the record definition
    pub const ALL: [CandidateField; 7] = [
        CandidateField::FirstName,
        CandidateField::LastName,
        CandidateField::Email,
        CandidateField::Phone,
        CandidateField::JobTitle,
        CandidateField::CompanyName,
        CandidateField::Country,
    ];

    /// Column order of the exported CSV files
    pub const EXPORT_ORDER: [CandidateField; 7] = [
        CandidateField::FirstName,
        CandidateField::LastName,
        CandidateField::JobTitle,
        CandidateField::Email,
        CandidateField::Phone,
        CandidateField::CompanyName,
        CandidateField::Country,
    ];

    /// Fields whose emptiness routes a record to the missing partition.
    /// Phone is not required: the derived source never supplies it.
    pub const REQUIRED: [CandidateField; 6] = [
        CandidateField::FirstName,
        CandidateField::LastName,
        CandidateField::Email,
        CandidateField::JobTitle,
        CandidateField::CompanyName,
        CandidateField::Country,
    ];

    pub fn column(self) -> &'static str {
        match self {
            CandidateField::FirstName => "first_name",
            CandidateField::LastName => "last_name",
            CandidateField::Email => "email",
            CandidateField::Phone => "phone",
            CandidateField::JobTitle => "job_title",
            CandidateField::CompanyName => "company_name",
            CandidateField::Country => "country",
        }
    }

    /// Header label used by the direct source layout and the export files
    pub fn header(self) -> &'static str {
        match self {
            CandidateField::FirstName => constants::FIRST_NAME,
            CandidateField::LastName => constants::LAST_NAME,
            CandidateField::Email => constants::EMAIL,
            CandidateField::Phone => constants::PHONE_NUMBER,
            CandidateField::JobTitle => constants::JOB_TITLE,
            CandidateField::CompanyName => constants::COMPANY_NAME,
            CandidateField::Country => constants::COUNTRY,
        }
    }
}

impl CandidateRecord {
    pub fn get(&self, field: CandidateField) -> &str {
        match field {
            CandidateField::FirstName => &self.first_name,
            CandidateField::LastName => &self.last_name,
            CandidateField::Email => &self.email,
            CandidateField::Phone => &self.phone,
            CandidateField::JobTitle => &self.job_title,
            CandidateField::CompanyName => &self.company_name,
            CandidateField::Country => &self.country,
        }
    }

    pub fn is_blank(&self, field: CandidateField) -> bool {
        self.get(field).trim().is_empty()
    }
}

/// Substring filters over stored candidates. Absent or empty values match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateFilter {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub country: Option<String>,
}

impl CandidateFilter {
    pub fn with(mut self, field: CandidateField, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match field {
            CandidateField::FirstName => self.first_name = value,
            CandidateField::LastName => self.last_name = value,
            CandidateField::Email => self.email = value,
            CandidateField::Phone => self.phone = value,
            CandidateField::JobTitle => self.job_title = value,
            CandidateField::CompanyName => self.company_name = value,
            CandidateField::Country => self.country = value,
        }
        self
    }

    fn value(&self, field: CandidateField) -> Option<&str> {
        let value = match field {
            CandidateField::FirstName => &self.first_name,
            CandidateField::LastName => &self.last_name,
            CandidateField::Email => &self.email,
            CandidateField::Phone => &self.phone,
            CandidateField::JobTitle => &self.job_title,
            CandidateField::CompanyName => &self.company_name,
            CandidateField::Country => &self.country,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    /// The filters that actually constrain a query, in storage field order
    pub fn active(&self) -> Vec<(CandidateField, &str)> {
        CandidateField::ALL
            .iter()
            .filter_map(|&field| self.value(field).map(|v| (field, v)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.active().is_empty()
    }

    /// Case-sensitive substring match on every active filter
    pub fn matches(&self, record: &CandidateRecord) -> bool {
        self.active()
            .into_iter()
            .all(|(field, needle)| record.get(field).contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ana() -> CandidateRecord {
        CandidateRecord {
            first_name: "Ana".to_string(),
            last_name: "Diaz".to_string(),
            email: "a@x.com".to_string(),
            phone: String::new(),
            job_title: "Engineer".to_string(),
            company_name: "Acme".to_string(),
            country: "Germany".to_string(),
        }
    }

    #[test]
    fn empty_filter_values_are_ignored() {
        let filter = CandidateFilter::default()
            .with(CandidateField::Country, "")
            .with(CandidateField::Email, "x.com");
        assert_eq!(filter.active(), vec![(CandidateField::Email, "x.com")]);
        assert!(filter.matches(&ana()));
        assert!(CandidateFilter::default().is_empty());
    }

    #[test]
    fn filter_matching_is_case_sensitive() {
        let record = ana();
        assert!(CandidateFilter::default().with(CandidateField::Country, "erma").matches(&record));
        assert!(!CandidateFilter::default().with(CandidateField::Country, "germany").matches(&record));
    }

    #[test]
    fn blank_checks_trim_whitespace() {
        let mut record = ana();
        record.company_name = "   ".to_string();
        assert!(record.is_blank(CandidateField::CompanyName));
        assert!(!record.is_blank(CandidateField::FirstName));
    }
}
