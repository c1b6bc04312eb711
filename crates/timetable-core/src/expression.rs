//! Phrase and snapper expressions.
//!
//! Contracts inject path-dependent or conditional logic into the event stream
//! through named expressions:
//!
//! - A **phrase** is a stateless function of a fixed list of input registers.
//!   It returns one value per path, either a boolean condition gating the rest
//!   of a track or an amount substituted as a payoff.
//! - A **snapper** runs once per state-update tick. It reads its inputs (which
//!   may include its own previous outputs) and returns new values persisted
//!   under its declared output names.
//!
//! Inputs are passed as one slice per declared input name, each slice holding
//! one value per simulated path.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::{TimetableError, TimetableResult};

/// Computation behind a phrase.
pub type PhraseFn = Arc<dyn Fn(&[&[f64]]) -> PhraseValue + Send + Sync>;

/// Computation behind a snapper: one output vector per declared output.
pub type SnapperFn = Arc<dyn Fn(&[&[f64]]) -> Vec<Vec<f64>> + Send + Sync>;

/// The two expression kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpressionKind {
    /// Stateless condition or payoff.
    Phrase,
    /// Stateful register update.
    Snapper,
}

impl fmt::Display for ExpressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionKind::Phrase => f.write_str("phrase"),
            ExpressionKind::Snapper => f.write_str("snapper"),
        }
    }
}

/// Result of evaluating a phrase, one entry per path.
#[derive(Debug, Clone, PartialEq)]
pub enum PhraseValue {
    /// Gates continuation of the remaining track.
    Condition(Vec<bool>),
    /// Substituted as a terminal payoff.
    Amount(Vec<f64>),
}

impl PhraseValue {
    /// Number of paths.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            PhraseValue::Condition(v) => v.len(),
            PhraseValue::Amount(v) => v.len(),
        }
    }

    /// Returns true if no paths were produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Serializable shape of an expression: `{type, inp, out}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionDescriptor {
    /// Expression kind.
    #[serde(rename = "type")]
    pub kind: ExpressionKind,
    /// Input register names.
    pub inp: Vec<String>,
    /// Output register names (snappers only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out: Option<Vec<String>>,
}

/// A named computation referenced by events.
///
/// # Example
///
/// ```rust
/// use timetable_core::expression::{Expression, PhraseValue};
///
/// let barrier = 102.0;
/// let ko = Expression::phrase(["SPX"], move |inputs| {
///     PhraseValue::Condition(inputs[0].iter().map(|s| *s > barrier).collect())
/// });
///
/// let spot = [100.0, 105.0];
/// let value = ko.evaluate_phrase("ko", &[&spot]).unwrap();
/// assert_eq!(value, PhraseValue::Condition(vec![false, true]));
/// ```
#[derive(Clone)]
pub enum Expression {
    /// Stateless condition or payoff.
    Phrase {
        /// Input register names.
        inputs: Vec<String>,
        /// The computation.
        func: PhraseFn,
    },
    /// Stateful register update.
    Snapper {
        /// Input register names.
        inputs: Vec<String>,
        /// Output register names.
        outputs: Vec<String>,
        /// The computation.
        func: SnapperFn,
    },
}

fn names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}

/// Common path count of the input slices, `None` when there are no inputs.
fn path_count(key: &str, inputs: &[&[f64]]) -> TimetableResult<Option<usize>> {
    let Some(first) = inputs.first() else {
        return Ok(None);
    };
    let n = first.len();
    if let Some(bad) = inputs.iter().position(|inp| inp.len() != n) {
        return Err(TimetableError::arity_mismatch(
            key,
            format!("input {bad} has {} paths, expected {n}", inputs[bad].len()),
        ));
    }
    Ok(Some(n))
}

impl Expression {
    /// Creates a phrase over the named inputs.
    pub fn phrase<I, S, F>(inputs: I, func: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&[&[f64]]) -> PhraseValue + Send + Sync + 'static,
    {
        Expression::Phrase {
            inputs: names(inputs),
            func: Arc::new(func),
        }
    }

    /// Creates a snapper reading `inputs` and writing `outputs`.
    pub fn snapper<I, S, O, T, F>(inputs: I, outputs: O, func: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        O: IntoIterator<Item = T>,
        T: Into<String>,
        F: Fn(&[&[f64]]) -> Vec<Vec<f64>> + Send + Sync + 'static,
    {
        Expression::Snapper {
            inputs: names(inputs),
            outputs: names(outputs),
            func: Arc::new(func),
        }
    }

    /// The expression kind.
    #[must_use]
    pub fn kind(&self) -> ExpressionKind {
        match self {
            Expression::Phrase { .. } => ExpressionKind::Phrase,
            Expression::Snapper { .. } => ExpressionKind::Snapper,
        }
    }

    /// Declared input names.
    #[must_use]
    pub fn inputs(&self) -> &[String] {
        match self {
            Expression::Phrase { inputs, .. } | Expression::Snapper { inputs, .. } => inputs,
        }
    }

    /// Declared output names; empty for a phrase.
    #[must_use]
    pub fn outputs(&self) -> &[String] {
        match self {
            Expression::Phrase { .. } => &[],
            Expression::Snapper { outputs, .. } => outputs,
        }
    }

    /// The wire descriptor of this expression.
    #[must_use]
    pub fn descriptor(&self) -> ExpressionDescriptor {
        ExpressionDescriptor {
            kind: self.kind(),
            inp: self.inputs().to_vec(),
            out: match self {
                Expression::Phrase { .. } => None,
                Expression::Snapper { outputs, .. } => Some(outputs.clone()),
            },
        }
    }

    fn check_inputs(&self, key: &str, inputs: &[&[f64]]) -> TimetableResult<Option<usize>> {
        if inputs.len() != self.inputs().len() {
            return Err(TimetableError::arity_mismatch(
                key,
                format!(
                    "received {} inputs, declared {}",
                    inputs.len(),
                    self.inputs().len()
                ),
            ));
        }
        path_count(key, inputs)
    }

    /// Evaluates a phrase.
    ///
    /// # Errors
    ///
    /// Fails if this is a snapper, the input count differs from the declared
    /// inputs, or the result does not have one value per path.
    pub fn evaluate_phrase(&self, key: &str, inputs: &[&[f64]]) -> TimetableResult<PhraseValue> {
        let Expression::Phrase { func, .. } = self else {
            return Err(TimetableError::KindMismatch {
                key: key.to_string(),
                found: self.kind().to_string(),
                expected: ExpressionKind::Phrase.to_string(),
            });
        };
        let paths = self.check_inputs(key, inputs)?;
        let value = func(inputs);
        if let Some(n) = paths {
            if value.len() != n {
                return Err(TimetableError::arity_mismatch(
                    key,
                    format!("returned {} values for {n} paths", value.len()),
                ));
            }
        }
        Ok(value)
    }

    /// Evaluates a snapper, returning one vector per declared output.
    ///
    /// # Errors
    ///
    /// Fails if this is a phrase, the input count differs from the declared
    /// inputs, or the outputs do not match the declared names and path count.
    pub fn evaluate_snapper(&self, key: &str, inputs: &[&[f64]]) -> TimetableResult<Vec<Vec<f64>>> {
        let Expression::Snapper { outputs, func, .. } = self else {
            return Err(TimetableError::KindMismatch {
                key: key.to_string(),
                found: self.kind().to_string(),
                expected: ExpressionKind::Snapper.to_string(),
            });
        };
        let paths = self.check_inputs(key, inputs)?;
        let values = func(inputs);
        if values.len() != outputs.len() {
            return Err(TimetableError::arity_mismatch(
                key,
                format!(
                    "returned {} outputs, declared {}",
                    values.len(),
                    outputs.len()
                ),
            ));
        }
        if let Some(n) = paths {
            if let Some(bad) = values.iter().position(|v| v.len() != n) {
                return Err(TimetableError::arity_mismatch(
                    key,
                    format!("output '{}' has {} paths, expected {n}", outputs[bad], values[bad].len()),
                ));
            }
        }
        Ok(values)
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Phrase { inputs, .. } => f
                .debug_struct("Phrase")
                .field("inputs", inputs)
                .finish_non_exhaustive(),
            Expression::Snapper {
                inputs, outputs, ..
            } => f
                .debug_struct("Snapper")
                .field("inputs", inputs)
                .field("outputs", outputs)
                .finish_non_exhaustive(),
        }
    }
}
