//! Error types for contract construction.

use thiserror::Error;
use timetable_core::TimetableError;

/// A specialized Result type for contract construction.
pub type ContractResult<T> = Result<T, ContractError>;

/// Errors that can occur while constructing a contract.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContractError {
    /// Invalid contract specification.
    #[error("Invalid contract specification: {reason}")]
    InvalidSpec {
        /// Description of what's invalid.
        reason: String,
    },

    /// A required schedule is empty.
    #[error("Empty schedule: {field}")]
    EmptySchedule {
        /// The schedule field name.
        field: String,
    },

    /// Core timetable error.
    #[error("Timetable error: {0}")]
    Timetable(#[from] TimetableError),
}

impl ContractError {
    /// Creates an invalid specification error.
    #[must_use]
    pub fn invalid_spec(reason: impl Into<String>) -> Self {
        Self::InvalidSpec {
            reason: reason.into(),
        }
    }

    /// Creates an empty schedule error.
    #[must_use]
    pub fn empty_schedule(field: impl Into<String>) -> Self {
        Self::EmptySchedule {
            field: field.into(),
        }
    }
}
