//! Error types for QaStruct.
//!
//! Library crates use [`QaStructError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

use crate::types::Violation;

/// Top-level error type for all QaStruct operations.
#[derive(Debug, thiserror::Error)]
pub enum QaStructError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Run-level precondition failure (missing input directory, no input files, ...).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The input document violates the marker grammar.
    #[error("input structure is invalid ({} violation(s))", violations.len())]
    Structure { violations: Vec<Violation> },

    /// The file name does not carry a leading `yymmdd_` date.
    #[error("file name {name:?} does not start with a valid yymmdd_ date")]
    FilenameDate { name: String },

    /// A built block broke an invariant that validation should have guaranteed.
    #[error("internal consistency error: {0}")]
    Consistency(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, QaStructError>;

impl QaStructError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create an internal-consistency error.
    pub fn consistency(msg: impl Into<String>) -> Self {
        Self::Consistency(msg.into())
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Grammar violations carried by this error, if any.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Structure { violations } => violations,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = QaStructError::config("missing output dir");
        assert_eq!(err.to_string(), "config error: missing output dir");

        let err = QaStructError::FilenameDate {
            name: "notes.txt".into(),
        };
        assert!(err.to_string().contains("notes.txt"));
    }

    #[test]
    fn structure_error_counts_violations() {
        let err = QaStructError::Structure {
            violations: vec![Violation::NoParent, Violation::MissingChild { parent: 2 }],
        };
        assert_eq!(err.to_string(), "input structure is invalid (2 violation(s))");
        assert_eq!(err.violations().len(), 2);
        assert!(QaStructError::consistency("x").violations().is_empty());
    }
}
