use crate::types::Version;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("V1 gradient requires at least 2 colors, found {found}")]
    GradientTooFewColors { found: usize },

    #[error("Unsupported element type for V1 conversion: {0}")]
    UnsupportedElementType(String),

    #[error("Conversion result is {actual}, expected {expected}")]
    VersionMismatch { expected: Version, actual: Version },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
