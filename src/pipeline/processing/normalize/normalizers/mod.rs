// Base trait for source-specific normalizers
pub mod base;

// One normalizer per supported source layout
pub mod derived;
pub mod direct;

pub use base::SourceNormalizer;
pub use derived::DerivedNormalizer;
pub use direct::DirectNormalizer;
