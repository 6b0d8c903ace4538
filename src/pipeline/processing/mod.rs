// Pipeline processing: field mapping, location parsing and row validation

pub mod normalize;
pub mod quality_gate;
