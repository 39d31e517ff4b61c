//! Error types for field rendering.

use thiserror::Error;

/// Result type alias using FieldError.
pub type FieldResult<T> = Result<T, FieldError>;

/// Primary error type for grid and rendering operations.
///
/// Missing, NaN and out-of-range samples are never reported through this
/// type; they map to sentinel colour indices instead.
#[derive(Debug, Error)]
pub enum FieldError {
    // === Construction Errors ===
    #[error("Invalid construction parameter: {0}")]
    Domain(String),

    #[error("Index {index} out of range for size {size}")]
    Index { index: usize, size: usize },

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    // === Output Errors ===
    #[error("Format error: {0}")]
    Format(String),

    #[error("Encoding failed: {0}")]
    Encode(String),

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl FieldError {
    /// Shorthand for a [`FieldError::Domain`] built from anything displayable.
    pub fn domain(msg: impl Into<String>) -> Self {
        FieldError::Domain(msg.into())
    }

    /// Shorthand for a [`FieldError::Format`].
    pub fn format(msg: impl Into<String>) -> Self {
        FieldError::Format(msg.into())
    }

    /// Check an index against a size, returning [`FieldError::Index`] on failure.
    pub fn check_index(index: usize, size: usize) -> FieldResult<()> {
        if index < size {
            Ok(())
        } else {
            Err(FieldError::Index { index, size })
        }
    }

    /// True for errors caused by invalid caller input rather than I/O.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            FieldError::Domain(_)
                | FieldError::Index { .. }
                | FieldError::Unsupported(_)
                | FieldError::Format(_)
                | FieldError::Config(_)
        )
    }
}

// Conversion from common error types
impl From<std::io::Error> for FieldError {
    fn from(err: std::io::Error) -> Self {
        FieldError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for FieldError {
    fn from(err: serde_json::Error) -> Self {
        FieldError::Config(format!("JSON error: {}", err))
    }
}
