//! Error types for filter resolution and evaluation.

use thiserror::Error;

/// A specialized Result type for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur while resolving or evaluating filters.
///
/// Unknown operators are deliberately absent: they degrade to a match-all
/// test and are reported through a [`DiagnosticSink`](super::DiagnosticSink).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    /// A string-only operator was applied to a non-string record value.
    #[error("operator {operator} requires a string value, found {found}")]
    TypeMismatch {
        /// The operator symbol.
        operator: String,
        /// The kind of value that was found instead.
        found: String,
    },

    /// The filter's own operand has the wrong shape for its operator.
    #[error("invalid operand for {operator}: {reason}")]
    InvalidOperand {
        /// The operator symbol.
        operator: String,
        /// What is wrong with the operand.
        reason: String,
    },

    /// A range operator was given without its upper bound.
    #[error("operator {operator} requires a second operand")]
    MissingOperand {
        /// The operator symbol.
        operator: String,
    },

    /// A serialized filter definition could not be turned into a filter.
    #[error("invalid filter definition: {0}")]
    InvalidDefinition(String),
}

impl FilterError {
    /// Creates a type mismatch error.
    pub fn type_mismatch(operator: impl Into<String>, found: impl Into<String>) -> Self {
        FilterError::TypeMismatch {
            operator: operator.into(),
            found: found.into(),
        }
    }

    /// Creates an invalid operand error.
    pub fn invalid_operand(operator: impl Into<String>, reason: impl Into<String>) -> Self {
        FilterError::InvalidOperand {
            operator: operator.into(),
            reason: reason.into(),
        }
    }

    /// Creates a missing operand error.
    pub fn missing_operand(operator: impl Into<String>) -> Self {
        FilterError::MissingOperand {
            operator: operator.into(),
        }
    }

    /// Creates an invalid definition error.
    pub fn invalid_definition(reason: impl Into<String>) -> Self {
        FilterError::InvalidDefinition(reason.into())
    }
}
