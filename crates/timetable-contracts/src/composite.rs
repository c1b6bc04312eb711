//! Contracts assembled from other contracts.

use std::fmt;

use timetable_core::contract::Contract;
use timetable_core::event::Event;
use timetable_core::registry::ExpressionRegistry;
use timetable_core::TimetableResult;

/// A contract made of sub-contracts.
///
/// Events are concatenated in insertion order without modification;
/// expressions are merged and any key defined twice fails the build. Give
/// each part its own track so that keys and per-track ordering stay apart.
///
/// # Example
///
/// ```rust
/// use timetable_contracts::composite::Composite;
/// use timetable_contracts::equity::{OptionType, VanillaOption};
/// use timetable_core::prelude::*;
///
/// let spread = Composite::new()
///     .with(VanillaOption::new("USD", "SPX", 100.0, 1.0, OptionType::Call).with_track("long"))
///     .with(VanillaOption::new("USD", "SPX", 110.0, 1.0, OptionType::Call).with_track("short"));
/// assert_eq!(spread.timetable().unwrap().events().len(), 6);
/// ```
#[derive(Default)]
pub struct Composite {
    parts: Vec<Box<dyn Contract + Send + Sync>>,
}

impl Composite {
    /// Creates an empty composite.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sub-contract.
    #[must_use]
    pub fn with(mut self, contract: impl Contract + Send + Sync + 'static) -> Self {
        self.push(contract);
        self
    }

    /// Appends a sub-contract in place.
    pub fn push(&mut self, contract: impl Contract + Send + Sync + 'static) {
        self.parts.push(Box::new(contract));
    }

    /// Number of sub-contracts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns true if there are no sub-contracts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl fmt::Debug for Composite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composite")
            .field("parts", &self.parts.len())
            .finish()
    }
}

impl Contract for Composite {
    fn events(&self) -> Vec<Event> {
        self.parts.iter().flat_map(|part| part.events()).collect()
    }

    fn expressions(&self) -> TimetableResult<ExpressionRegistry> {
        let mut registry = ExpressionRegistry::new();
        for part in &self.parts {
            registry.merge(part.expressions()?)?;
        }
        log::debug!("composite of {} parts defines {} expressions", self.parts.len(), registry.len());
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bonds::ZeroCouponBond;
    use crate::equity::{ForwardStartOption, OptionType};
    use timetable_core::TimetableError;

    fn forward(track: &str) -> ForwardStartOption {
        ForwardStartOption::new("USD", "SPX", 1.0, 1.0, 2.0, OptionType::Call)
            .unwrap()
            .with_track(track)
    }

    #[test]
    fn test_events_concatenated_in_order() {
        let composite = Composite::new()
            .with(ZeroCouponBond::new("USD", 1.0).with_track("Z"))
            .with(forward("F"));
        let events = composite.events();
        assert_eq!(events.len(), 5);
        assert_eq!(events[0].track_name(), "Z");
        assert!(events[1].is_tick());
        assert_eq!(composite.expressions().unwrap().len(), 1);
    }

    #[test]
    fn test_shared_key_fails() {
        let composite = Composite::new().with(forward("F")).with(forward("F"));
        assert_eq!(
            composite.timetable().unwrap_err(),
            TimetableError::DuplicateKey {
                key: "F.fix_K".to_string()
            }
        );
    }

    #[test]
    fn test_empty() {
        let composite = Composite::new();
        assert!(composite.is_empty());
        assert!(composite.events().is_empty());
    }
}
