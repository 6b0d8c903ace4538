use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Please upload a valid CSV file: {0}")]
    UnsupportedFile(String),

    #[error("CSV could not be parsed: {0}")]
    Format(String),

    #[error("Missing required columns in CSV: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Unknown source schema: {0}")]
    UnknownSchema(String),

    #[error("The uploaded file is too large. The limit is {limit} bytes.")]
    PayloadTooLarge { limit: usize },

    #[error("Database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Candidate store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template rendering failed: {0}")]
    Render(#[from] askama::Error),
}

impl IntakeError {
    /// True when the upload was refused before any side effect took place.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            IntakeError::UnsupportedFile(_)
                | IntakeError::Format(_)
                | IntakeError::MissingColumns(_)
                | IntakeError::UnknownSchema(_)
                | IntakeError::PayloadTooLarge { .. }
        )
    }

    /// Message safe to show to whoever submitted the upload.
    pub fn user_message(&self) -> String {
        match self {
            IntakeError::UnsupportedFile(_) | IntakeError::Format(_) => {
                "Please upload a valid CSV file.".to_string()
            }
            IntakeError::MissingColumns(_)
            | IntakeError::UnknownSchema(_)
            | IntakeError::PayloadTooLarge { .. } => self.to_string(),
            _ => "The upload could not be processed. No candidates were saved.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IntakeError>;
