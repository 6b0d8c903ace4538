use std::collections::HashMap;

use super::normalizers::{DerivedNormalizer, DirectNormalizer, SourceNormalizer};
use crate::constants::{DERIVED_SCHEMA, DIRECT_SCHEMA};
use crate::error::{IntakeError, Result};

/// Registry for source-specific normalization strategies
pub struct NormalizationRegistry {
    normalizers: HashMap<String, Box<dyn SourceNormalizer>>,
}

impl NormalizationRegistry {
    /// Create a new normalization registry with the built-in source layouts
    pub fn new() -> Self {
        let mut normalizers: HashMap<String, Box<dyn SourceNormalizer>> = HashMap::new();

        normalizers.insert(DIRECT_SCHEMA.to_string(), Box::new(DirectNormalizer::new()));
        normalizers.insert(DERIVED_SCHEMA.to_string(), Box::new(DerivedNormalizer::new()));

        Self { normalizers }
    }

    /// Register a normalizer under its own source ID
    pub fn register(&mut self, normalizer: Box<dyn SourceNormalizer>) {
        self.normalizers
            .insert(normalizer.source_id().to_string(), normalizer);
    }

    /// Get the normalizer for a source schema, failing on unknown names
    pub fn get_normalizer(&self, source_id: &str) -> Result<&dyn SourceNormalizer> {
        self.normalizers
            .get(source_id.trim())
            .map(|n| n.as_ref())
            .ok_or_else(|| IntakeError::UnknownSchema(source_id.to_string()))
    }

    /// List all registered source IDs, sorted
    pub fn list_sources(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = self.normalizers.keys().map(|k| k.as_str()).collect();
        sources.sort_unstable();
        sources
    }
}

impl Default for NormalizationRegistry {
    fn default() -> Self {
        Self::new()
    }
}
