//! Build configuration.
//!
//! Controls how strictly [`build_timetable_with`](crate::contract::build_timetable_with)
//! validates a contract's events against its expressions. The defaults
//! reject every violation; a config file can relax them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{TimetableError, TimetableResult};

/// A single validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Field that failed validation.
    pub field: String,
    /// Validation error message.
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Trait for validating configurations.
pub trait Validate {
    /// Returns a list of validation errors, or an empty vector if valid.
    fn validate(&self) -> Vec<ValidationError>;

    /// Returns true if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Validates and returns an error if invalid.
    fn validate_or_error(&self) -> TimetableResult<()> {
        let errors = self.validate();
        if errors.is_empty() {
            return Ok(());
        }
        let reason = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(TimetableError::config_error(reason))
    }
}

/// Validation settings for timetable composition.
///
/// # Example
///
/// ```rust
/// use timetable_core::config::{BuildConfig, Validate};
///
/// let config = BuildConfig::from_toml("strict_track_order = false").unwrap();
/// assert!(!config.strict_track_order);
/// assert_eq!(config.register_prefixes, vec!['.', '_']);
/// assert!(config.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Reject events that go back in time within a track.
    /// When false, violations are logged and tolerated.
    pub strict_track_order: bool,

    /// Leading characters that mark a unit or input as an internal register.
    pub register_prefixes: Vec<char>,

    /// Require every internal register to resolve to an expression key, a
    /// snapper output or a track name.
    pub require_register_resolution: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            strict_track_order: true,
            register_prefixes: vec!['.', '_'],
            require_register_resolution: true,
        }
    }
}

impl BuildConfig {
    /// A config that checks nothing beyond key resolution.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            strict_track_order: false,
            register_prefixes: Vec::new(),
            require_register_resolution: false,
        }
    }

    /// Returns true if `name` is an internal register name.
    #[must_use]
    pub fn is_register(&self, name: &str) -> bool {
        name.chars()
            .next()
            .is_some_and(|c| self.register_prefixes.contains(&c))
    }

    /// Parses and validates a JSON config.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` on malformed input or invalid settings.
    pub fn from_json(json: &str) -> TimetableResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TimetableError::config_error(format!("invalid JSON: {e}")))?;
        config.validate_or_error()?;
        Ok(config)
    }

    /// Parses and validates a TOML config.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` on malformed input or invalid settings.
    pub fn from_toml(text: &str) -> TimetableResult<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| TimetableError::config_error(format!("invalid TOML: {e}")))?;
        config.validate_or_error()?;
        Ok(config)
    }
}

impl Validate for BuildConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.require_register_resolution && self.register_prefixes.is_empty() {
            errors.push(ValidationError::new(
                "register_prefixes",
                "must not be empty when register resolution is required",
            ));
        }
        for c in &self.register_prefixes {
            if c.is_alphanumeric() || c.is_whitespace() {
                errors.push(ValidationError::new(
                    "register_prefixes",
                    format!("'{c}' cannot mark a register"),
                ));
            }
        }

        errors
    }
}
