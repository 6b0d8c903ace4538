// Pipeline ingestion: turning uploaded bytes into rows keyed by source column names

pub mod csv_source;

pub use csv_source::{read_source_table, SourceRow, SourceTable};
