//! Error types for accessor and marshaling operations.

use serde_json::Value;
use thiserror::Error;

use crate::element_type::ElementKind;

/// Result type alias for accessor operations.
pub type Result<T> = std::result::Result<T, AccessorError>;

/// Errors raised while navigating, mutating or marshaling a JSON document.
#[derive(Debug, Error)]
pub enum AccessorError {
    /// The node at `path` has a shape that cannot be read as `expected`.
    #[error("unexpected type for JSON element '{path}': expected {expected}, got '{actual}'")]
    UnexpectedElementType {
        /// Runtime path of the accessor that read the node.
        path: String,
        /// The kind the accessor asserts.
        expected: ElementKind,
        /// The node that was actually found.
        actual: Value,
    },

    /// The input does not describe a JSON object where one was expected.
    #[error("malformed input: {message}")]
    MalformedInput {
        /// Description of what was found instead.
        message: String,
    },

    /// An internal invariant or a caller contract was violated.
    ///
    /// This indicates a schema wiring bug, never a data condition.
    #[error("assertion failure: {message}")]
    AssertionFailure {
        /// Description of the violated invariant.
        message: String,
    },

    /// The operation is permanently unsupported on this accessor.
    #[error("unsupported operation: {message}")]
    UnsupportedOperation {
        /// Description of the rejected operation.
        message: String,
    },

    /// A declared field value could not be encoded or decoded.
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AccessorError {
    #[inline]
    pub fn unexpected_type(path: impl Into<String>, expected: ElementKind, actual: &Value) -> Self {
        AccessorError::UnexpectedElementType {
            path: path.into(),
            expected,
            actual: actual.clone(),
        }
    }

    #[inline]
    pub fn malformed(message: impl Into<String>) -> Self {
        AccessorError::MalformedInput {
            message: message.into(),
        }
    }

    #[inline]
    pub fn assertion(message: impl Into<String>) -> Self {
        AccessorError::AssertionFailure {
            message: message.into(),
        }
    }

    #[inline]
    pub fn unsupported(message: impl Into<String>) -> Self {
        AccessorError::UnsupportedOperation {
            message: message.into(),
        }
    }

    /// Returns true for [`AccessorError::UnexpectedElementType`].
    pub fn is_unexpected_type(&self) -> bool {
        matches!(self, AccessorError::UnexpectedElementType { .. })
    }

    /// Returns true for [`AccessorError::MalformedInput`].
    pub fn is_malformed(&self) -> bool {
        matches!(self, AccessorError::MalformedInput { .. })
    }

    /// Returns true for [`AccessorError::AssertionFailure`].
    pub fn is_assertion_failure(&self) -> bool {
        matches!(self, AccessorError::AssertionFailure { .. })
    }

    /// Returns true for [`AccessorError::UnsupportedOperation`].
    pub fn is_unsupported(&self) -> bool {
        matches!(self, AccessorError::UnsupportedOperation { .. })
    }
}
