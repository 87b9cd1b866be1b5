//! Error types for catalog construction and loading.

use sesli_core::error::SesliError;

/// Errors raised while building a `SearchIndex`.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Duplicate result id: {0}")]
    DuplicateId(u32),
    #[error("Relevance score {score} of result {id} is outside [0, 1]")]
    ScoreOutOfRange { id: u32, score: f64 },
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<CatalogError> for SesliError {
    fn from(err: CatalogError) -> Self {
        SesliError::Catalog(err.to_string())
    }
}
