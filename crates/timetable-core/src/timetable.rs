//! The immutable timetable artifact and its composition-time validation.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::config::BuildConfig;
use crate::error::{TimetableError, TimetableResult};
use crate::event::{EventTime, Op};
use crate::registry::ExpressionRegistry;
use crate::schema::SchemaKind;
use crate::table::EventTable;

/// An instrument described as events plus the expressions they reference.
///
/// A `Timetable` is only ever produced by validation, so every custom op
/// resolves to a phrase, every state tick to a snapper, and every internal
/// register to something that defines it.
///
/// Serializes as `{events: <table>, expressions: {key: {type, inp, out}}}`.
#[derive(Debug, Clone, Serialize)]
pub struct Timetable {
    events: EventTable,
    expressions: ExpressionRegistry,
}

impl Timetable {
    /// Pairs a prebuilt table with its expressions, validating with
    /// [`BuildConfig::default`].
    ///
    /// # Errors
    ///
    /// See [`from_table_with`](Self::from_table_with).
    pub fn from_table(events: EventTable, expressions: ExpressionRegistry) -> TimetableResult<Self> {
        Self::from_table_with(events, expressions, &BuildConfig::default())
    }

    /// Pairs a prebuilt table with its expressions under `config`.
    ///
    /// # Errors
    ///
    /// - `UnresolvedKey` for a custom op, tick or internal register that
    ///   resolves to nothing
    /// - `KindMismatch` for a custom op bound to a snapper or a tick bound to
    ///   a phrase
    /// - `TrackOutOfOrder` / `SnapperOutOfOrder` for time going backwards
    /// - `MissingRegister` for an expression input nothing defines
    pub fn from_table_with(
        events: EventTable,
        expressions: ExpressionRegistry,
        config: &BuildConfig,
    ) -> TimetableResult<Self> {
        validate(&events, &expressions, config)?;
        Ok(Self {
            events,
            expressions,
        })
    }

    /// Replaces the events table, keeping the expressions.
    ///
    /// The new table is checked again for resolution and time order; track
    /// order violations are only logged since the original build already
    /// ruled on them.
    pub(crate) fn map_events<F>(self, f: F) -> TimetableResult<Self>
    where
        F: FnOnce(EventTable) -> TimetableResult<EventTable>,
    {
        let events = f(self.events)?;
        validate(&events, &self.expressions, &BuildConfig::lenient())?;
        Ok(Self {
            events,
            expressions: self.expressions,
        })
    }

    /// The events table.
    #[must_use]
    pub fn events(&self) -> &EventTable {
        &self.events
    }

    /// The expression registry.
    #[must_use]
    pub fn expressions(&self) -> &ExpressionRegistry {
        &self.expressions
    }

    /// Which schema the events follow.
    #[must_use]
    pub fn schema_kind(&self) -> SchemaKind {
        self.events.schema_kind()
    }

    /// Splits into the events table and the registry.
    #[must_use]
    pub fn into_parts(self) -> (EventTable, ExpressionRegistry) {
        (self.events, self.expressions)
    }
}

/// Checks a table against its registry.
fn validate(
    events: &EventTable,
    expressions: &ExpressionRegistry,
    config: &BuildConfig,
) -> TimetableResult<()> {
    let mut track_times: HashMap<&str, EventTime> = HashMap::new();
    let mut tick_times: HashMap<&str, EventTime> = HashMap::new();

    for (row, event) in events.iter().enumerate() {
        match event.op {
            None => {
                expressions.resolve_tick(event.unit, row)?;
                if let Some(last) = tick_times.insert(event.unit, event.time) {
                    if event.time.try_cmp(&last)?.is_le() {
                        return Err(TimetableError::SnapperOutOfOrder {
                            key: event.unit.to_string(),
                            reason: format!(
                                "tick at event {row} ({}) does not follow {last}",
                                event.time
                            ),
                        });
                    }
                }
            }
            Some(code) => {
                let op = code.parse::<Op>()?;
                if op.is_custom() {
                    expressions.resolve_condition(code, row)?;
                }

                let track = event.track.unwrap_or("");
                if let Some(last) = track_times.insert(track, event.time) {
                    if event.time.try_cmp(&last)?.is_lt() {
                        if config.strict_track_order {
                            return Err(TimetableError::TrackOutOfOrder {
                                track: track.to_string(),
                                row,
                            });
                        }
                        log::warn!("track '{track}' goes back in time at event {row}");
                    }
                }
            }
        }
    }

    if config.require_register_resolution {
        check_registers(events, expressions, config, track_times.keys().copied())?;
    }
    Ok(())
}

/// Every internal register must be defined by an expression key, a snapper
/// output or a track.
fn check_registers<'a>(
    events: &'a EventTable,
    expressions: &'a ExpressionRegistry,
    config: &BuildConfig,
    tracks: impl Iterator<Item = &'a str>,
) -> TimetableResult<()> {
    let mut known: BTreeSet<&str> = expressions.snapper_outputs();
    known.extend(expressions.keys());
    known.extend(tracks);

    for (row, event) in events.iter().enumerate() {
        if !event.is_tick() && config.is_register(event.unit) && !known.contains(event.unit) {
            return Err(TimetableError::unresolved_key(event.unit, row));
        }
    }
    for (_, expression) in expressions.iter() {
        if let Some(name) = expression
            .inputs()
            .iter()
            .find(|name| config.is_register(name) && !known.contains(name.as_str()))
        {
            return Err(TimetableError::MissingRegister { name: name.clone() });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::expression::{Expression, PhraseValue};

    fn ko() -> Expression {
        Expression::phrase(["SPX"], |inp| {
            PhraseValue::Condition(inp[0].iter().map(|s| *s > 102.0).collect())
        })
    }

    fn fix() -> Expression {
        Expression::snapper(["SPX"], [".K"], |inp| vec![inp[0].to_vec()])
    }

    fn build(events: &[Event], registry: ExpressionRegistry) -> TimetableResult<Timetable> {
        Timetable::from_table(EventTable::from_events(events)?, registry)
    }

    #[test]
    fn test_valid_timetable() {
        let registry = ExpressionRegistry::new()
            .with("ko", ko())
            .unwrap()
            .with(".fix_K", fix())
            .unwrap();
        let events = vec![
            Event::tick(0.5, ".fix_K"),
            Event::condition("", 0.75, "ko", 0.0, "USD"),
            Event::choose("", 1.0, 0.0, "USD"),
            Event::pay("", 1.0, -1.0, ".K"),
            Event::pay("", 1.0, 1.0, "SPX"),
        ];
        let tt = build(&events, registry).unwrap();
        assert_eq!(tt.events().len(), 5);
        assert_eq!(tt.schema_kind(), SchemaKind::Legacy);
        assert_eq!(tt.expressions().len(), 2);
    }

    #[test]
    fn test_custom_op_must_be_phrase() {
        let events = vec![Event::condition("", 1.0, "ko", 0.0, "USD")];
        assert_eq!(
            build(&events, ExpressionRegistry::new()).unwrap_err(),
            TimetableError::unresolved_key("ko", 0)
        );

        let registry = ExpressionRegistry::new().with("ko", fix()).unwrap();
        assert!(matches!(
            build(&events, registry),
            Err(TimetableError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_tick_must_be_snapper() {
        let registry = ExpressionRegistry::new().with("ko", ko()).unwrap();
        let events = vec![Event::tick(1.0, "ko")];
        assert!(matches!(
            build(&events, registry),
            Err(TimetableError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_track_order() {
        let events = vec![
            Event::pay("A", 2.0, 1.0, "USD"),
            Event::pay("B", 1.0, 1.0, "USD"),
            Event::pay("A", 1.0, 1.0, "USD"),
        ];
        let err = build(&events, ExpressionRegistry::new()).unwrap_err();
        assert_eq!(
            err,
            TimetableError::TrackOutOfOrder {
                track: "A".into(),
                row: 2
            }
        );

        let relaxed = BuildConfig {
            strict_track_order: false,
            ..BuildConfig::default()
        };
        let table = EventTable::from_events(&events).unwrap();
        assert!(Timetable::from_table_with(table, ExpressionRegistry::new(), &relaxed).is_ok());
    }

    #[test]
    fn test_snapper_chain_is_strict() {
        let registry = ExpressionRegistry::new().with(".fix_K", fix()).unwrap();
        let events = vec![Event::tick(1.0, ".fix_K"), Event::tick(1.0, ".fix_K")];
        assert!(matches!(
            build(&events, registry),
            Err(TimetableError::SnapperOutOfOrder { .. })
        ));
    }

    #[test]
    fn test_unresolved_register_unit() {
        let events = vec![Event::pay("", 1.0, 1.0, "_A")];
        assert_eq!(
            build(&events, ExpressionRegistry::new()).unwrap_err(),
            TimetableError::unresolved_key("_A", 0)
        );

        let table = EventTable::from_events(&events).unwrap();
        assert!(Timetable::from_table_with(table, ExpressionRegistry::new(), &BuildConfig::lenient()).is_ok());
    }

    #[test]
    fn test_track_name_resolves_register() {
        let events = vec![
            Event::choose(".opt", 0.5, 1.0, ".swp"),
            Event::pay(".swp", 0.5, 1.0, "USD"),
            Event::pay(".swp", 1.0, -1.025, "USD"),
        ];
        assert!(build(&events, ExpressionRegistry::new()).is_ok());
    }

    #[test]
    fn test_expression_input_must_be_defined() {
        let registry = ExpressionRegistry::new()
            .with(
                "_UPDATE",
                Expression::snapper(["SPX", "_S_last"], ["_S_last"], |inp| vec![inp[0].to_vec()]),
            )
            .unwrap()
            .with(
                "PAY",
                Expression::phrase(["_missing"], |inp| PhraseValue::Amount(inp[0].to_vec())),
            )
            .unwrap();
        let events = vec![Event::tick(1.0, "_UPDATE")];
        assert_eq!(
            build(&events, registry).unwrap_err(),
            TimetableError::MissingRegister {
                name: "_missing".into()
            }
        );
    }

    #[test]
    fn test_serialized_shape() {
        let registry = ExpressionRegistry::new().with("ko", ko()).unwrap();
        let events = vec![Event::condition("", 1.0, "ko", 0.0, "USD")];
        let json = serde_json::to_value(build(&events, registry).unwrap()).unwrap();
        assert_eq!(json["expressions"]["ko"]["type"], "phrase");
        assert_eq!(json["events"]["schema"], "Legacy");
        assert_eq!(json["events"]["quantity"][0], 0.0);
    }
}
