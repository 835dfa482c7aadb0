use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WordgrepError {
    #[error("Unable to open file {path}: {reason}")]
    Configuration { path: String, reason: String },

    #[error("Line {line_number} missing from {path}")]
    MissingLine { path: String, line_number: u32 },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Directory walk error: {0}")]
    WalkDir(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

impl WordgrepError {
    /// A required file (source document or output sink) could not be opened
    pub fn unopenable(path: &Path, err: std::io::Error) -> Self {
        WordgrepError::Configuration {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for WordgrepError {
    fn from(err: std::io::Error) -> Self {
        WordgrepError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WordgrepError>;
