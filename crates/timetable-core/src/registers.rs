//! Reference binding of expressions to register values.
//!
//! A [`RegisterFile`] holds one value per simulated path for every named
//! register: market observations supplied by the caller and the outputs
//! persisted by snapper ticks. It executes the binding protocol (input
//! lookup, prior-state seeding, output persistence and tick ordering) and
//! nothing else; continuation values belong to the valuation engine.

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::error::{TimetableError, TimetableResult};
use crate::event::EventTime;
use crate::expression::PhraseValue;
use crate::registry::ExpressionRegistry;
use crate::state::PriorState;

/// Named per-path register values.
///
/// # Example
///
/// ```rust
/// use timetable_core::expression::Expression;
/// use timetable_core::registers::RegisterFile;
/// use timetable_core::registry::ExpressionRegistry;
///
/// let registry = ExpressionRegistry::new()
///     .with("fix_K", Expression::snapper(["SPX"], ["K"], |inp| vec![inp[0].to_vec()]))
///     .unwrap();
///
/// let mut regs = RegisterFile::new(2);
/// regs.observe("SPX", vec![100.0, 98.0]).unwrap();
/// regs.snap("fix_K", 0.5, &registry).unwrap();
/// assert_eq!(regs.get("K"), Some(&[100.0, 98.0][..]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RegisterFile {
    paths: usize,
    registers: BTreeMap<String, Vec<f64>>,
    prior: PriorState,
    last_tick: BTreeMap<String, EventTime>,
    ticks: usize,
}

impl RegisterFile {
    /// Creates an empty register file for `paths` paths.
    #[must_use]
    pub fn new(paths: usize) -> Self {
        Self {
            paths,
            ..Self::default()
        }
    }

    /// Seeds values for registers that have not been written yet.
    #[must_use]
    pub fn with_prior_state(mut self, prior: PriorState) -> Self {
        self.prior = prior;
        self
    }

    /// Number of paths.
    #[must_use]
    pub fn paths(&self) -> usize {
        self.paths
    }

    /// Number of snapper ticks executed so far.
    #[must_use]
    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Sets a market observation, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `ArityMismatch` if `values` does not have one entry per path.
    pub fn observe(&mut self, name: impl Into<String>, values: Vec<f64>) -> TimetableResult<()> {
        let name = name.into();
        if values.len() != self.paths {
            return Err(TimetableError::arity_mismatch(
                name,
                format!("observed {} values for {} paths", values.len(), self.paths),
            ));
        }
        self.registers.insert(name, values);
        Ok(())
    }

    /// Current value of a register, if it has been written.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.registers.get(name).map(Vec::as_slice)
    }

    /// Reads a register, falling back to a prior-state scalar broadcast to
    /// every path.
    fn read(&self, name: &str) -> TimetableResult<Cow<'_, [f64]>> {
        if let Some(values) = self.registers.get(name) {
            return Ok(Cow::Borrowed(values));
        }
        self.prior
            .get(name)
            .map(|v| Cow::Owned(vec![v; self.paths]))
            .ok_or_else(|| TimetableError::MissingRegister {
                name: name.to_string(),
            })
    }

    fn read_all(&self, names: &[String]) -> TimetableResult<Vec<Cow<'_, [f64]>>> {
        names.iter().map(|name| self.read(name)).collect()
    }

    /// Executes the state tick for snapper `key` at `time`.
    ///
    /// # Errors
    ///
    /// - `UnresolvedKey` / `KindMismatch` if `key` is not a snapper
    /// - `SnapperOutOfOrder` if `time` is not after the previous tick of `key`
    /// - `MissingRegister` if an input has neither a value nor a prior state
    /// - `ArityMismatch` if the snapper output does not match its declaration
    pub fn snap(
        &mut self,
        key: &str,
        time: impl Into<EventTime>,
        registry: &ExpressionRegistry,
    ) -> TimetableResult<()> {
        let time = time.into();
        let expression = registry.resolve_tick(key, self.ticks)?;

        if let Some(last) = self.last_tick.get(key) {
            if time.try_cmp(last)?.is_le() {
                return Err(TimetableError::SnapperOutOfOrder {
                    key: key.to_string(),
                    reason: format!("tick at {time} does not follow tick at {last}"),
                });
            }
        }

        let outputs = {
            let inputs = self.read_all(expression.inputs())?;
            let slices: Vec<&[f64]> = inputs.iter().map(|c| &**c).collect();
            expression.evaluate_snapper(key, &slices)?
        };

        log::trace!("snap {key} at {time}: writes {:?}", expression.outputs());
        for (name, values) in expression.outputs().iter().zip(outputs) {
            self.registers.insert(name.clone(), values);
        }
        self.last_tick.insert(key.to_string(), time);
        self.ticks += 1;
        Ok(())
    }

    /// Evaluates phrase `key` on the current registers.
    ///
    /// # Errors
    ///
    /// Fails if `key` is not a phrase, an input is missing, or the result has
    /// the wrong path count.
    pub fn phrase(&self, key: &str, registry: &ExpressionRegistry) -> TimetableResult<PhraseValue> {
        let expression = registry.resolve_condition(key, self.ticks)?;
        let inputs = self.read_all(expression.inputs())?;
        let slices: Vec<&[f64]> = inputs.iter().map(|c| &**c).collect();
        expression.evaluate_phrase(key, &slices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Expression;
    use approx::assert_relative_eq;

    fn running_max() -> ExpressionRegistry {
        ExpressionRegistry::new()
            .with(
                "_MAX",
                Expression::snapper(["SPX", "_M"], ["_M"], |inp| {
                    vec![inp[0].iter().zip(inp[1]).map(|(s, m)| s.max(*m)).collect()]
                }),
            )
            .unwrap()
            .with(
                "HIT",
                Expression::phrase(["_M"], |inp| {
                    PhraseValue::Condition(inp[0].iter().map(|m| *m >= 110.0).collect())
                }),
            )
            .unwrap()
    }

    #[test]
    fn test_missing_register_without_prior_state() {
        let mut regs = RegisterFile::new(1);
        regs.observe("SPX", vec![100.0]).unwrap();
        let err = regs.snap("_MAX", 0.25, &running_max()).unwrap_err();
        assert_eq!(err, TimetableError::MissingRegister { name: "_M".into() });
        assert_eq!(regs.ticks(), 0);
    }

    #[test]
    fn test_prior_state_seeds_first_tick_only() {
        let registry = running_max();
        let mut regs = RegisterFile::new(2).with_prior_state(PriorState::new().with("_M", 105.0));

        regs.observe("SPX", vec![100.0, 108.0]).unwrap();
        regs.snap("_MAX", 0.25, &registry).unwrap();
        assert_eq!(regs.get("_M"), Some(&[105.0, 108.0][..]));

        regs.observe("SPX", vec![90.0, 112.0]).unwrap();
        regs.snap("_MAX", 0.5, &registry).unwrap();
        assert_eq!(regs.get("_M"), Some(&[105.0, 112.0][..]));

        let hit = regs.phrase("HIT", &registry).unwrap();
        assert_eq!(hit, PhraseValue::Condition(vec![false, true]));
    }

    #[test]
    fn test_ticks_must_move_forward() {
        let registry = running_max();
        let mut regs = RegisterFile::new(1).with_prior_state(PriorState::new().with("_M", 0.0));
        regs.observe("SPX", vec![100.0]).unwrap();
        regs.snap("_MAX", 0.5, &registry).unwrap();

        for time in [0.5, 0.25] {
            assert!(matches!(
                regs.snap("_MAX", time, &registry),
                Err(TimetableError::SnapperOutOfOrder { .. })
            ));
        }
        assert!(matches!(
            regs.snap("_MAX", EventTime::from_millis(0).unwrap(), &registry),
            Err(TimetableError::MixedTimeRepresentation { .. })
        ));
        regs.snap("_MAX", 0.75, &registry).unwrap();
        assert_eq!(regs.ticks(), 2);
        assert_relative_eq!(regs.get("_M").unwrap()[0], 100.0);
    }

    #[test]
    fn test_observe_checks_path_count() {
        let mut regs = RegisterFile::new(3);
        assert!(matches!(
            regs.observe("SPX", vec![1.0]),
            Err(TimetableError::ArityMismatch { .. })
        ));
    }

    #[test]
    fn test_tick_on_phrase_key_rejected() {
        let mut regs = RegisterFile::new(1);
        assert!(matches!(
            regs.snap("HIT", 0.0, &running_max()),
            Err(TimetableError::KindMismatch { .. })
        ));
    }
}
