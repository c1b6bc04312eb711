//! Externally supplied prior state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Values fixed before the valuation date, keyed by name.
///
/// A contract constructed mid-life receives the values it has already
/// observed (a fixed strike, an accumulated return) as a `PriorState`. The
/// value is immutable: [`with`](Self::with) returns a new state.
///
/// ```rust
/// use timetable_core::state::PriorState;
///
/// let state = PriorState::new().with("last_fix", 101.5).with("last_acc", 0.02);
/// assert_eq!(state.get("last_fix"), Some(101.5));
/// assert_eq!(state.get("missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriorState {
    values: BTreeMap<String, f64>,
}

impl PriorState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this state with `name` set to `value`.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Looks up a value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Returns true if `name` has a value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns true if no values are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for PriorState {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
