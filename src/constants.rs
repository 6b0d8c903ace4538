/// Source schema names accepted at upload time.
/// The direct layout mirrors the canonical headers; the derived layout is the
/// lead-generation tool's native export with combined job/location columns.
pub const DIRECT_SCHEMA: &str = "direct";
pub const DERIVED_SCHEMA: &str = "derived";

pub const DEFAULT_SCHEMA: &str = DIRECT_SCHEMA;

// Canonical column headers (direct source layout and export files)
pub const FIRST_NAME: &str = "First Name";
pub const LAST_NAME: &str = "Last Name";
pub const EMAIL: &str = "Email";
pub const PHONE_NUMBER: &str = "Phone Number";
pub const JOB_TITLE: &str = "Job Title";
pub const COMPANY_NAME: &str = "Company Name";
pub const COUNTRY: &str = "Country";

// Derived source layout
pub const CURRENT_JOB: &str = "Current Job";
pub const LOCATION: &str = "Location";

// Export artifacts, replaced on every upload
pub const READY_EXPORT_FILE: &str = "candidates_ready.csv";
pub const MISSING_EXPORT_FILE: &str = "candidates_missing.csv";

/// Get all supported source schema names
pub fn get_supported_schemas() -> Vec<&'static str> {
    vec![DIRECT_SCHEMA, DERIVED_SCHEMA]
}
