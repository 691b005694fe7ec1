use sitelog_domain::SchemaError;
use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Required field missing: {key}: {message}")]
    RequiredFieldMissing { key: String, message: String },
    #[error("Row index {index} out of range (store has {len} rows)")]
    RowIndexOutOfRange { index: usize, len: usize },
    #[error("Storage failure: {0}")]
    StoreIo(String),
    #[error("Malformed numeric value `{value}` in column `{column}`")]
    MalformedNumericField { column: String, value: String },
    #[error("Invalid schema: {0}")]
    Schema(#[from] SchemaError),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::StoreIo(err.to_string())
    }
}

impl From<ValidationError> for CoreError {
    fn from(err: ValidationError) -> Self {
        CoreError::RequiredFieldMissing {
            key: err.key,
            message: err.message,
        }
    }
}
