use thiserror::Error;

/// Top-level error type for the Sesli system.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define their
/// own error types and implement `From<SubsystemError> for SesliError` so
/// that the `?` operator works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SesliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("Dialogue error: {0}")]
    Dialogue(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Shutdown in progress")]
    ShuttingDown,
}

impl From<toml::de::Error> for SesliError {
    fn from(err: toml::de::Error) -> Self {
        SesliError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for SesliError {
    fn from(err: toml::ser::Error) -> Self {
        SesliError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for SesliError {
    fn from(err: serde_json::Error) -> Self {
        SesliError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Sesli operations.
pub type Result<T> = std::result::Result<T, SesliError>;
