//! Error types for backend-facing engine operations.
//!
//! The pure stages (normalizer, comparator, summary) are total and never
//! produce these; only calls that cross the backend boundary do.

use std::fmt;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Machine-distinguishable failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unavailable,
    Backend,
    Extraction,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Unavailable => "BACKEND_UNAVAILABLE",
            ErrorKind::Backend => "BACKEND_ERROR",
            ErrorKind::Extraction => "EXTRACTION_FAILED",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The backend could not be reached or did not answer in time.
    #[error("failed to {operation}: execution backend unreachable: {source}")]
    Unavailable {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    /// The backend answered with an error payload.
    #[error("failed to {operation}: {message}")]
    Backend {
        operation: &'static str,
        status: Option<u16>,
        message: String,
    },

    /// The first run of the harvest flow produced no usable stdout.
    #[error("failed to {operation}: {message}")]
    Extraction {
        operation: &'static str,
        message: String,
    },
}

impl RelayError {
    pub fn unavailable(operation: &'static str, source: impl Into<BoxError>) -> Self {
        RelayError::Unavailable {
            operation,
            source: source.into(),
        }
    }

    pub fn backend(operation: &'static str, status: Option<u16>, message: impl Into<String>) -> Self {
        RelayError::Backend {
            operation,
            status,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::Unavailable { .. } => ErrorKind::Unavailable,
            RelayError::Backend { .. } => ErrorKind::Backend,
            RelayError::Extraction { .. } => ErrorKind::Extraction,
        }
    }

    pub fn operation(&self) -> &'static str {
        match self {
            RelayError::Unavailable { operation, .. }
            | RelayError::Backend { operation, .. }
            | RelayError::Extraction { operation, .. } => operation,
        }
    }
}

pub type RelayResult<T> = std::result::Result<T, RelayError>;
