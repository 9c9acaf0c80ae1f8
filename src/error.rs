//! Error types for parallel map calls
//!
//! Precondition failures are raised before any work is dispatched. Failures
//! raised while a task runs fall into two kinds: argument mismatches (an extra
//! argument that is missing or has the wrong shape) and everything else.

use thiserror::Error;

/// Raised by [`BoundArgs::get`](crate::parallel::BoundArgs::get) when a task
/// asks for an argument that was not bound or cannot be read as the requested
/// type, or by a task whose arguments are well-typed but unusable together
#[derive(Debug, Error)]
pub enum ArgumentError {
    #[error("no argument bound for parameter '{0}'")]
    Missing(String),

    #[error("argument '{name}' is invalid: {reason}")]
    Invalid { name: String, reason: String },

    #[error("argument '{name}' has the wrong type: {source}")]
    WrongType {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("parallel map needs at least 2 items, got {len}")]
    InsufficientItems { len: usize },

    #[error("data argument '{name}' is not a parameter of the function (parameters: {params:?})")]
    UnknownDataArgument { name: String, params: Vec<String> },

    #[error("function declares {expected} parameters but {supplied} were supplied (data argument included)")]
    ArityMismatch { expected: usize, supplied: usize },

    #[error("invalid argument binding: {0}")]
    InvalidBinding(String),

    #[error("argument mismatch while mapping item {index}: {source}")]
    ArgumentMismatch {
        index: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("mapping failed at item {index}: {source}")]
    Failure {
        index: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("a worker thread panicked during parallel execution")]
    WorkerPanic,

    #[error("failed to serialize extra argument: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl MapError {
    /// Classify an error returned by a task body
    pub(crate) fn from_task(index: usize, err: anyhow::Error) -> Self {
        if err.chain().any(|cause| cause.is::<ArgumentError>()) {
            MapError::ArgumentMismatch { index, source: err }
        } else {
            MapError::Failure { index, source: err }
        }
    }

    /// Item index the error is attached to, if it came from a running task
    pub fn item_index(&self) -> Option<usize> {
        match self {
            MapError::ArgumentMismatch { index, .. } | MapError::Failure { index, .. } => {
                Some(*index)
            }
            _ => None,
        }
    }

    /// Whether this error was raised before any work was dispatched
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            MapError::InsufficientItems { .. }
                | MapError::UnknownDataArgument { .. }
                | MapError::ArityMismatch { .. }
                | MapError::InvalidBinding(_)
                | MapError::Serialize(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_argument_error_is_classified_as_mismatch() {
        let err = anyhow::Error::new(ArgumentError::Missing("flag".into()));
        let classified = MapError::from_task(3, err);
        assert!(matches!(classified, MapError::ArgumentMismatch { index: 3, .. }));
    }

    #[test]
    fn test_wrapped_argument_error_is_still_mismatch() {
        let result: Result<(), ArgumentError> = Err(ArgumentError::Missing("flag".into()));
        let err = result.context("while squaring").unwrap_err();
        assert!(matches!(
            MapError::from_task(0, err),
            MapError::ArgumentMismatch { .. }
        ));
    }

    #[test]
    fn test_invalid_argument_is_mismatch() {
        let err = anyhow::Error::new(ArgumentError::Invalid {
            name: "low".into(),
            reason: "above high".into(),
        });
        assert_eq!(err.to_string(), "argument 'low' is invalid: above high");
        assert!(matches!(
            MapError::from_task(1, err),
            MapError::ArgumentMismatch { index: 1, .. }
        ));
    }

    #[test]
    fn test_other_errors_are_failures() {
        let classified = MapError::from_task(7, anyhow::anyhow!("boom"));
        assert_eq!(classified.item_index(), Some(7));
        assert!(matches!(classified, MapError::Failure { .. }));
        assert!(!classified.is_precondition());
    }
}
