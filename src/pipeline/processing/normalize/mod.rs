// Field mapping: source-schema normalizers that turn source rows into canonical records

pub mod location;
pub mod normalizers;
pub mod registry;

pub use location::parse_country;
pub use normalizers::{DerivedNormalizer, DirectNormalizer, SourceNormalizer};
pub use registry::NormalizationRegistry;
