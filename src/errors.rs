use sitelog_config::ConfigError;
use sitelog_core::{CoreError, ValidationError};
use sitelog_domain::SchemaError;
use thiserror::Error;

/// Error type reported by the application layer and the CLI.
#[derive(Debug, Error)]
pub enum SiteLogError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid schema: {0}")]
    Schema(#[from] SchemaError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
}

impl From<ValidationError> for SiteLogError {
    fn from(err: ValidationError) -> Self {
        SiteLogError::Core(err.into())
    }
}

pub type Result<T> = std::result::Result<T, SiteLogError>;
