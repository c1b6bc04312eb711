//! The contract facade and the composition routine.

use crate::config::{BuildConfig, Validate};
use crate::error::TimetableResult;
use crate::event::Event;
use crate::registry::ExpressionRegistry;
use crate::table::EventTable;
use crate::timetable::Timetable;

/// An instrument that can describe itself as a timetable.
///
/// Implementors list their events in order and, if any event references an
/// expression, register it under the referenced key. Composition is done by
/// [`build_timetable`]; implementors normally do not override
/// [`timetable`](Contract::timetable).
///
/// # Example
///
/// ```rust
/// use timetable_core::prelude::*;
///
/// struct Bullet {
///     ccy: String,
///     maturity: Date,
/// }
///
/// impl Contract for Bullet {
///     fn events(&self) -> Vec<Event> {
///         vec![Event::pay("", self.maturity, 1.0, &self.ccy)]
///     }
/// }
///
/// let bullet = Bullet { ccy: "USD".into(), maturity: Date::from_ymd(2030, 6, 30).unwrap() };
/// let tt = bullet.timetable().unwrap();
/// assert_eq!(tt.events().len(), 1);
/// assert!(tt.expressions().is_empty());
/// ```
pub trait Contract {
    /// The ordered raw events, including any state ticks.
    fn events(&self) -> Vec<Event>;

    /// Expressions referenced by the events. Empty by default.
    ///
    /// # Errors
    ///
    /// Fails if the contract parameters cannot produce valid expressions.
    fn expressions(&self) -> TimetableResult<ExpressionRegistry> {
        Ok(ExpressionRegistry::new())
    }

    /// Builds the validated timetable with the default configuration.
    ///
    /// # Errors
    ///
    /// See [`build_timetable_with`].
    fn timetable(&self) -> TimetableResult<Timetable> {
        build_timetable(self)
    }
}

/// Builds a contract's timetable with [`BuildConfig::default`].
///
/// # Errors
///
/// See [`build_timetable_with`].
pub fn build_timetable<C: Contract + ?Sized>(contract: &C) -> TimetableResult<Timetable> {
    build_timetable_with(contract, &BuildConfig::default())
}

/// Builds a contract's timetable.
///
/// Collects the events and expressions, serializes the events into the
/// schema implied by their time representation and validates the pair.
///
/// # Errors
///
/// - `ConfigError` if `config` is invalid
/// - `MixedTimeRepresentation` if the events mix instants and year fractions
/// - any resolution or ordering error from
///   [`Timetable::from_table_with`]
pub fn build_timetable_with<C: Contract + ?Sized>(
    contract: &C,
    config: &BuildConfig,
) -> TimetableResult<Timetable> {
    config.validate_or_error()?;

    let events = contract.events();
    let expressions = contract.expressions()?;
    let table = EventTable::from_events(&events)?;
    log::debug!(
        "composing timetable: {} events ({:?}), {} expressions",
        table.len(),
        table.schema_kind(),
        expressions.len()
    );
    Timetable::from_table_with(table, expressions, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TimetableError;
    use crate::expression::{Expression, PhraseValue};
    use crate::schema::SchemaKind;

    struct Digital {
        track: String,
        barrier: f64,
    }

    impl Contract for Digital {
        fn events(&self) -> Vec<Event> {
            vec![
                Event::condition(&self.track, 1.0, format!("{}.hit", self.track), 0.0, "USD"),
                Event::pay(&self.track, 1.0, 1.0, "USD"),
            ]
        }

        fn expressions(&self) -> TimetableResult<ExpressionRegistry> {
            let barrier = self.barrier;
            ExpressionRegistry::new().with(
                format!("{}.hit", self.track),
                Expression::phrase(["SPX"], move |inp| {
                    PhraseValue::Condition(inp[0].iter().map(|s| *s < barrier).collect())
                }),
            )
        }
    }

    struct Broken;

    impl Contract for Broken {
        fn events(&self) -> Vec<Event> {
            vec![Event::condition("", 1.0, "CALL", 0.0, "USD")]
        }
    }

    #[test]
    fn test_build() {
        let tt = Digital {
            track: "D".into(),
            barrier: 90.0,
        }
        .timetable()
        .unwrap();
        assert_eq!(tt.schema_kind(), SchemaKind::Legacy);
        assert!(tt.expressions().contains_key("D.hit"));
    }

    #[test]
    fn test_unresolved_key_reported_at_build() {
        assert_eq!(
            Broken.timetable().unwrap_err(),
            TimetableError::unresolved_key("CALL", 0)
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = BuildConfig {
            register_prefixes: vec!['a'],
            ..BuildConfig::default()
        };
        let digital = Digital {
            track: String::new(),
            barrier: 90.0,
        };
        assert!(matches!(
            build_timetable_with(&digital, &config),
            Err(TimetableError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_trait_object() {
        let contracts: Vec<Box<dyn Contract>> = vec![
            Box::new(Digital {
                track: "A".into(),
                barrier: 90.0,
            }),
            Box::new(Broken),
        ];
        let built: Vec<_> = contracts.iter().map(|c| build_timetable(c.as_ref())).collect();
        assert!(built[0].is_ok());
        assert!(built[1].is_err());
    }
}
