use serde::{Deserialize, Serialize};

use crate::types::{CandidateField, CandidateRecord};

/// Quality Gate decision for a record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QualityDecision {
    /// Every required field is filled in; the record is persisted and exported as ready
    Accept,
    /// At least one required field is empty; the record only goes to the missing export
    Missing,
}

/// Quality assessment result from the Quality Gate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QualityAssessment {
    pub decision: QualityDecision,
    /// Required fields that were empty after trimming, in field order
    pub missing_fields: Vec<CandidateField>,
}

/// A record that failed the gate, with the reason it failed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MissingRecord {
    pub record: CandidateRecord,
    pub missing_fields: Vec<CandidateField>,
}

/// The two disjoint, order-preserving partitions of one upload
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Partition {
    pub valid: Vec<CandidateRecord>,
    pub missing: Vec<MissingRecord>,
}

impl Partition {
    pub fn missing_records(&self) -> Vec<CandidateRecord> {
        self.missing.iter().map(|m| m.record.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.valid.len() + self.missing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Trait for implementing Quality Gate assessment logic
pub trait QualityGate {
    /// Assess a single record without changing it
    fn assess(&self, record: &CandidateRecord) -> QualityAssessment;

    /// Split records into valid and missing, keeping input order within each side
    fn partition(&self, records: Vec<CandidateRecord>) -> Partition {
        let mut partition = Partition::default();
        for record in records {
            let assessment = self.assess(&record);
            match assessment.decision {
                QualityDecision::Accept => partition.valid.push(record),
                QualityDecision::Missing => partition.missing.push(MissingRecord {
                    record,
                    missing_fields: assessment.missing_fields,
                }),
            }
        }
        partition
    }
}

/// Configuration for Quality Gate assessment rules
#[derive(Debug, Clone)]
pub struct QualityGateConfig {
    pub required_fields: Vec<CandidateField>,
}

impl Default for QualityGateConfig {
    fn default() -> Self {
        Self {
            required_fields: CandidateField::REQUIRED.to_vec(),
        }
    }
}

/// Default Quality Gate: a record is valid when every required field is non-blank
#[derive(Debug, Clone, Default)]
pub struct DefaultQualityGate {
    pub config: QualityGateConfig,
}

impl DefaultQualityGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: QualityGateConfig) -> Self {
        Self { config }
    }
}

impl QualityGate for DefaultQualityGate {
    fn assess(&self, record: &CandidateRecord) -> QualityAssessment {
        let missing_fields: Vec<CandidateField> = self
            .config
            .required_fields
            .iter()
            .copied()
            .filter(|&field| record.is_blank(field))
            .collect();

        let decision = if missing_fields.is_empty() {
            QualityDecision::Accept
        } else {
            QualityDecision::Missing
        };

        QualityAssessment {
            decision,
            missing_fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(first_name: &str) -> CandidateRecord {
        CandidateRecord {
            first_name: first_name.to_string(),
            last_name: "Diaz".to_string(),
            email: "a@x.com".to_string(),
            phone: String::new(),
            job_title: "Engineer".to_string(),
            company_name: "Acme".to_string(),
            country: "Germany".to_string(),
        }
    }

    #[test]
    fn test_quality_gate_accepts_complete_record_without_phone() {
        let gate = DefaultQualityGate::new();
        let assessment = gate.assess(&complete("Ana"));
        assert_eq!(assessment.decision, QualityDecision::Accept);
        assert!(assessment.missing_fields.is_empty());
    }

    #[test]
    fn test_quality_gate_flags_whitespace_only_fields() {
        let gate = DefaultQualityGate::new();
        let mut record = complete("Ana");
        record.country = "  ".to_string();
        record.email = String::new();

        let assessment = gate.assess(&record);
        assert_eq!(assessment.decision, QualityDecision::Missing);
        assert_eq!(
            assessment.missing_fields,
            vec![CandidateField::Email, CandidateField::Country]
        );
    }

    #[test]
    fn test_partition_is_complete_disjoint_and_ordered() {
        let gate = DefaultQualityGate::new();
        let mut no_company = complete("Bo");
        no_company.company_name.clear();
        let mut no_title = complete("Di");
        no_title.job_title.clear();

        let input = vec![
            complete("Ana"),
            no_company.clone(),
            complete("Cy"),
            no_title.clone(),
        ];
        let partition = gate.partition(input.clone());

        assert_eq!(partition.len(), input.len());
        assert!(!partition.is_empty());
        assert!(gate.partition(Vec::new()).is_empty());
        assert_eq!(partition.valid, vec![complete("Ana"), complete("Cy")]);
        assert_eq!(partition.missing_records(), vec![no_company, no_title]);
        for record in &partition.valid {
            assert!(!partition.missing_records().contains(record));
        }
    }

    #[test]
    fn test_assessment_does_not_mutate_records() {
        let gate = DefaultQualityGate::new();
        let mut record = complete("Ana");
        record.first_name = "  Ana ".to_string();
        let partition = gate.partition(vec![record.clone()]);
        assert_eq!(partition.valid, vec![record]);
    }

    #[test]
    fn test_custom_required_fields() {
        let gate = DefaultQualityGate::with_config(QualityGateConfig {
            required_fields: vec![CandidateField::Phone],
        });
        assert_eq!(gate.assess(&complete("Ana")).decision, QualityDecision::Missing);
    }
}
