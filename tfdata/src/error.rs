//! Error types for tfdata

/// Error type for resource data operations
#[derive(Debug, thiserror::Error)]
pub enum TfdataError {
    #[error("Attribute not declared in schema: {0}")]
    UnknownAttribute(String),

    #[error("Type mismatch at {path}: expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid attribute path: {0}")]
    InvalidPath(String),

    #[error("List index {index} out of bounds at {path}")]
    IndexOutOfBounds { path: String, index: usize },

    #[error("{0}")]
    Custom(String),
}

/// Result type alias for tfdata operations
pub type Result<T> = std::result::Result<T, TfdataError>;

impl From<String> for TfdataError {
    fn from(s: String) -> Self {
        TfdataError::Custom(s)
    }
}

impl From<&str> for TfdataError {
    fn from(s: &str) -> Self {
        TfdataError::Custom(s.to_string())
    }
}
