#![forbid(unsafe_code)]

//! Vista error model.
//!
//! Every fallible layout operation returns a [`LayoutError`]. Errors are
//! raised synchronously and never retried: all operations are in-memory
//! computations, so there is nothing transient to retry.
//!
//! Existence checks (`remove`, `contains`) return `bool` rather than failing,
//! so that "already gone" is a normal outcome for callers.

use thiserror::Error;

/// Logical category of a [`LayoutError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A viewport or context id does not exist.
    NotFound,
    /// An argument is malformed (bad rect, ratio, direction).
    InvalidArgument,
    /// The operation is deliberately out of scope.
    UnsupportedOperation,
    /// The caller sequenced operations incorrectly (e.g. no surface set yet).
    PreconditionViolation,
}

/// Errors raised by geometry and workspace operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("viewport not found: {0}")]
    ViewportNotFound(String),

    #[error("context not found: {0}")]
    ContextNotFound(String),

    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("unsupported operation '{op}': {reason}")]
    UnsupportedOperation {
        op: &'static str,
        reason: &'static str,
    },

    #[error("precondition violated in '{op}': {reason}")]
    PreconditionViolation {
        op: &'static str,
        reason: &'static str,
    },
}

impl LayoutError {
    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// The logical category, for callers that only care about the class of failure.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ViewportNotFound(_) | Self::ContextNotFound(_) => ErrorKind::NotFound,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            Self::PreconditionViolation { .. } => ErrorKind::PreconditionViolation,
        }
    }

    /// Whether this error is suitable to show as a user-facing validation message.
    ///
    /// Precondition violations are caller sequencing bugs and are not.
    #[must_use]
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NotFound | ErrorKind::InvalidArgument | ErrorKind::UnsupportedOperation
        )
    }
}

/// Result alias for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;
