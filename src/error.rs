use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum LassaError {
    #[error("Entrez request failed: {0}")]
    EntrezHttp(String),

    #[error("Entrez returned status {status}: {message}")]
    EntrezStatus { status: u16, message: String },

    #[error("sequence search failed after retries: {0}")]
    SearchFailed(String),

    #[error("malformed efetch payload: {0}")]
    GenbankParse(String),

    #[error("run cancelled")]
    Cancelled,

    #[error("--genome-filter min-percent requires --min-completeness")]
    MissingThreshold,

    #[error("--min-completeness only applies to --genome-filter min-percent")]
    UnexpectedThreshold,

    #[error("invalid completeness threshold: {0}")]
    InvalidThreshold(String),

    #[error("failed to read exclusion list at {0}")]
    ExclusionRead(PathBuf),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
