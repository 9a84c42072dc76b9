//! Batch construction errors.

use modelbatch_expr::ExprError;

/// Raised synchronously by the call that detects the problem; nothing is
/// deferred to serialization.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// Malformed fact triple, unusable annotation values, missing or
    /// ill-shaped evidence target.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Unrecognized operation name or annotation target kind.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    /// Transport blob could not be encoded or decoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl BatchError {
    pub(crate) fn malformed_fact(detail: impl std::fmt::Display) -> Self {
        BatchError::InvalidArgument(format!("malformed fact: {}", detail))
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, BatchError::InvalidArgument(_))
    }

    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, BatchError::InvalidOperation(_))
    }
}

impl From<ExprError> for BatchError {
    fn from(err: ExprError) -> Self {
        BatchError::InvalidArgument(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BatchError>;
