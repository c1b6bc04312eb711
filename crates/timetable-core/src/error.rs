//! Error types for timetable construction.
//!
//! Every failure in this crate is a configuration or programming error that is
//! surfaced to the caller at construction time. Nothing is retried and no
//! partially built timetable is ever returned.

use thiserror::Error;

/// A specialized Result type for timetable operations.
pub type TimetableResult<T> = Result<T, TimetableError>;

/// The main error type for timetable operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimetableError {
    /// Parallel columns handed to a table constructor have different lengths.
    #[error("Column length mismatch: '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        /// Name of the offending column.
        column: String,
        /// Number of rows in the first column.
        expected: usize,
        /// Number of rows in the offending column.
        actual: usize,
    },

    /// A column does not carry the type the event schema requires.
    #[error("Unsupported schema: column '{column}' has type {found}, expected {expected}")]
    UnsupportedSchema {
        /// Name of the offending column.
        column: String,
        /// Type found.
        found: String,
        /// Type(s) accepted.
        expected: String,
    },

    /// Absolute and year-fraction times were mixed within one timetable.
    #[error("Mixed time representations: {reason}")]
    MixedTimeRepresentation {
        /// Description of the conflict.
        reason: String,
    },

    /// An event references an expression key that is not registered.
    #[error("Unresolved expression key '{key}' referenced by event {row}")]
    UnresolvedKey {
        /// The missing key.
        key: String,
        /// Row index of the referencing event.
        row: usize,
    },

    /// An expression key resolved to the wrong kind of expression.
    #[error("Expression '{key}' is a {found}, expected a {expected}")]
    KindMismatch {
        /// The expression key.
        key: String,
        /// Kind found in the registry.
        found: String,
        /// Kind required by the referencing event.
        expected: String,
    },

    /// Two expression mappings share a key.
    #[error("Duplicate expression key: {key}")]
    DuplicateKey {
        /// The colliding key.
        key: String,
    },

    /// Events sharing a track are not in non-decreasing time order.
    #[error("Track '{track}' is out of order at event {row}")]
    TrackOutOfOrder {
        /// The track name.
        track: String,
        /// Row index of the first event that goes back in time.
        row: usize,
    },

    /// Snapper ticks for one key do not chain forward in time.
    #[error("Snapper '{key}' ticked out of order: {reason}")]
    SnapperOutOfOrder {
        /// The snapper key.
        key: String,
        /// Description of the violation.
        reason: String,
    },

    /// An expression was invoked with the wrong number of inputs or outputs.
    #[error("Arity mismatch in '{key}': {reason}")]
    ArityMismatch {
        /// The expression key (or a description if anonymous).
        key: String,
        /// Description of the mismatch.
        reason: String,
    },

    /// A register required by an expression has no value.
    #[error("Register '{name}' has no value")]
    MissingRegister {
        /// The register name.
        name: String,
    },

    /// An op code could not be parsed.
    #[error("Invalid op code: '{code}'")]
    InvalidOp {
        /// The offending code.
        code: String,
    },

    /// Error in date calculations or invalid date.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {reason}")]
    ConfigError {
        /// Description of the configuration error.
        reason: String,
    },
}

impl TimetableError {
    /// Creates a length mismatch error.
    #[must_use]
    pub fn length_mismatch(column: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::LengthMismatch {
            column: column.into(),
            expected,
            actual,
        }
    }

    /// Creates an unsupported schema error.
    #[must_use]
    pub fn unsupported_schema(
        column: impl Into<String>,
        found: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::UnsupportedSchema {
            column: column.into(),
            found: found.into(),
            expected: expected.into(),
        }
    }

    /// Creates a mixed time representation error.
    #[must_use]
    pub fn mixed_time(reason: impl Into<String>) -> Self {
        Self::MixedTimeRepresentation {
            reason: reason.into(),
        }
    }

    /// Creates an unresolved key error.
    #[must_use]
    pub fn unresolved_key(key: impl Into<String>, row: usize) -> Self {
        Self::UnresolvedKey {
            key: key.into(),
            row,
        }
    }

    /// Creates an arity mismatch error.
    #[must_use]
    pub fn arity_mismatch(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ArityMismatch {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config_error(reason: impl Into<String>) -> Self {
        Self::ConfigError {
            reason: reason.into(),
        }
    }
}
