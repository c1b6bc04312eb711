//! Integration tests for the timetable protocol: normalization, composition
//! and the expression binding executed by the register file.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use timetable_core::prelude::*;

// ============================================================================
// Helpers
// ============================================================================

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap()
}

/// A legacy timetable with one pay event per (non-decreasing) time.
fn legacy(times: &[f64]) -> Timetable {
    let events: Vec<Event> = times
        .iter()
        .map(|t| Event::pay("", *t, 1.0, "USD"))
        .collect();
    Timetable::from_table(EventTable::from_events(&events).unwrap(), ExpressionRegistry::new())
        .unwrap()
}

fn sorted_times() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..30.0, 0..20).prop_map(|mut v| {
        v.sort_by(f64::total_cmp);
        v
    })
}

// ============================================================================
// Time normalizer
// ============================================================================

proptest! {
    #[test]
    fn prop_canonical_input_is_passed_through(times in sorted_times()) {
        let once = convert_time_to_ts(legacy(&times), base()).unwrap();
        let before = once.events().clone();
        let twice = convert_time_to_ts(once, base()).unwrap();
        prop_assert_eq!(twice.events(), &before);
    }

    #[test]
    fn prop_conversion_is_stable(times in sorted_times()) {
        let a = convert_time_to_ts(legacy(&times), base()).unwrap();
        let b = convert_time_to_ts(legacy(&times), base()).unwrap();
        prop_assert_eq!(a.events(), b.events());
        prop_assert_eq!(a.events().len(), times.len());
    }

    #[test]
    fn prop_conversion_preserves_order(times in sorted_times()) {
        let tt = convert_time_to_ts(legacy(&times), base()).unwrap();
        let millis: Vec<i64> = tt
            .events()
            .iter()
            .filter_map(|row| row.time.timestamp_millis())
            .collect();
        prop_assert_eq!(millis.len(), times.len());
        prop_assert!(millis.windows(2).all(|w| w[0] <= w[1]));
    }
}

#[test]
fn test_conversion_keeps_expressions() {
    let registry = ExpressionRegistry::new()
        .with(
            "_INIT",
            Expression::snapper(["SPX"], ["_S"], |inp| vec![inp[0].to_vec()]),
        )
        .unwrap();
    let events = vec![Event::tick(0.0, "_INIT"), Event::pay("", 1.0, 1.0, "_S")];
    let tt = Timetable::from_table(EventTable::from_events(&events).unwrap(), registry).unwrap();

    let canonical = convert_time_to_ts(tt, base()).unwrap();
    assert_eq!(canonical.schema_kind(), SchemaKind::Canonical);
    assert!(canonical.expressions().contains_key("_INIT"));
    assert_eq!(
        canonical.events().row(1).unwrap().time.timestamp_millis(),
        Some(base().timestamp_millis() + MS_PER_YEAR)
    );
    assert!(canonical.events().row(0).unwrap().is_tick());
}

// ============================================================================
// Composition
// ============================================================================

/// A forward-starting call written directly against the core.
struct ForwardCall {
    track: String,
}

impl Contract for ForwardCall {
    fn events(&self) -> Vec<Event> {
        let fix = Date::from_ymd(2024, 3, 31).unwrap();
        let maturity = Date::from_ymd(2024, 9, 30).unwrap();
        vec![
            Event::tick(fix, leg_key(&self.track, ".fix_K")),
            Event::choose(&self.track, maturity, 0.0, "USD"),
            Event::pay(&self.track, maturity, -1.0, leg_key(&self.track, ".K")),
            Event::pay(&self.track, maturity, 1.0, "SPX"),
        ]
    }

    fn expressions(&self) -> TimetableResult<ExpressionRegistry> {
        ExpressionRegistry::new().with(
            leg_key(&self.track, ".fix_K"),
            Expression::snapper(["SPX"], [leg_key(&self.track, ".K")], |inp| {
                vec![inp[0].to_vec()]
            }),
        )
    }
}

#[test]
fn test_wire_shape() {
    let tt = ForwardCall { track: "F".into() }.timetable().unwrap();
    let json = serde_json::to_value(&tt).unwrap();

    assert_eq!(json["events"]["schema"], "Canonical");
    assert_eq!(
        json["expressions"]["F.fix_K"],
        serde_json::json!({"type": "snapper", "inp": ["SPX"], "out": ["F.K"]})
    );
    assert_eq!(json["events"]["time"]["type"], "timestamp");
    assert_eq!(json["events"]["time"]["values"][0], 1_711_843_200_000_i64);
}

#[test]
fn test_schema_statics() {
    assert_eq!(EVENT_SCHEMA.fields().len(), 5);
    assert_eq!(TS_EVENT_SCHEMA.fields().len(), 5);
    assert_ne!(EVENT_SCHEMA.time_type(), TS_EVENT_SCHEMA.time_type());
}

#[test]
fn test_concurrent_builds_are_independent() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let tt = ForwardCall {
                    track: format!("T{i}"),
                }
                .timetable()
                .unwrap();
                tt.expressions().keys().map(str::to_string).collect::<Vec<_>>()
            })
        })
        .collect();

    let keys: Vec<Vec<String>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for (i, k) in keys.iter().enumerate() {
        assert_eq!(k, &vec![format!("T{i}.fix_K")]);
    }
}

#[test]
fn test_mixed_time_rejected_at_build() {
    struct Mixed;
    impl Contract for Mixed {
        fn events(&self) -> Vec<Event> {
            vec![
                Event::pay("", 1.0, 1.0, "USD"),
                Event::pay("", Date::from_ymd(2025, 1, 1).unwrap(), 1.0, "USD"),
            ]
        }
    }
    assert!(matches!(
        Mixed.timetable(),
        Err(TimetableError::MixedTimeRepresentation { .. })
    ));
}

// ============================================================================
// Register file driven by a built timetable
// ============================================================================

#[test]
fn test_forward_strike_fixed_by_tick() {
    let tt = ForwardCall { track: "F".into() }.timetable().unwrap();
    let tick = tt.events().row(0).unwrap();
    assert!(tick.is_tick());

    let mut regs = RegisterFile::new(3);
    regs.observe("SPX", vec![95.0, 100.0, 105.0]).unwrap();
    regs.snap(tick.unit, tick.time, tt.expressions()).unwrap();

    regs.observe("SPX", vec![120.0, 90.0, 105.0]).unwrap();
    assert_eq!(regs.get("F.K"), Some(&[95.0, 100.0, 105.0][..]));
}
