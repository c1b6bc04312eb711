//! Column-oriented event table.

use chrono::DateTime;
use serde::Serialize;

use crate::column::{Column, DictionaryArray};
use crate::error::{TimetableError, TimetableResult};
use crate::event::{Event, EventTime, Op, TimeKind};
use crate::schema::{DataType, Schema, SchemaKind, FIELD_NAMES};

/// A borrowed view of one table row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventRow<'a> {
    /// Track, `None` when null.
    pub track: Option<&'a str>,
    /// Event time.
    pub time: EventTime,
    /// Op code, `None` for a state tick.
    pub op: Option<&'a str>,
    /// Quantity.
    pub quantity: f64,
    /// Unit.
    pub unit: &'a str,
}

impl EventRow<'_> {
    /// Returns true if this row is a state-update tick.
    #[must_use]
    pub fn is_tick(&self) -> bool {
        self.op.is_none()
    }

    /// Converts the row into an owned [`Event`].
    ///
    /// # Errors
    ///
    /// Fails if the op code is empty.
    pub fn to_event(&self) -> TimetableResult<Event> {
        let op = self.op.map(str::parse::<Op>).transpose()?;
        Ok(Event {
            track: self.track.map(str::to_string),
            time: self.time,
            op,
            quantity: self.quantity,
            unit: self.unit.to_string(),
        })
    }
}

/// An immutable, typed table of events in one of the two event schemas.
///
/// The schema is determined solely by the type of the `time` column.
///
/// # Example
///
/// ```rust
/// use timetable_core::event::Event;
/// use timetable_core::schema::SchemaKind;
/// use timetable_core::table::EventTable;
///
/// let events = vec![
///     Event::choose("", 1.0, 0.0, "USD"),
///     Event::pay("", 1.0, -100.0, "USD"),
///     Event::pay("", 1.0, 1.0, "SPX"),
/// ];
/// let table = EventTable::from_events(&events).unwrap();
/// assert_eq!(table.len(), 3);
/// assert_eq!(table.schema_kind(), SchemaKind::Legacy);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventTable {
    schema: SchemaKind,
    track: DictionaryArray,
    time: Column,
    op: DictionaryArray,
    quantity: Vec<f64>,
    unit: DictionaryArray,
}

fn expect_dictionary(name: &str, column: Column) -> TimetableResult<DictionaryArray> {
    match column {
        Column::Dictionary(arr) => Ok(arr),
        other => Err(TimetableError::unsupported_schema(
            name,
            other.data_type().to_string(),
            DataType::Dictionary.to_string(),
        )),
    }
}

impl EventTable {
    /// Builds a table from five parallel columns in schema order.
    ///
    /// # Errors
    ///
    /// - `LengthMismatch` if the columns have different lengths
    /// - `UnsupportedSchema` if a column has the wrong type, the `time`
    ///   column is neither float nor timestamp, or a unit is null
    /// - `InvalidDate` if a timestamp is outside the representable range
    pub fn try_from_columns(
        track: Column,
        time: Column,
        op: Column,
        quantity: Column,
        unit: Column,
    ) -> TimetableResult<Self> {
        let expected = track.len();
        for (name, column) in FIELD_NAMES
            .iter()
            .zip([&track, &time, &op, &quantity, &unit])
            .skip(1)
        {
            if column.len() != expected {
                return Err(TimetableError::length_mismatch(
                    *name,
                    expected,
                    column.len(),
                ));
            }
        }

        let schema = SchemaKind::from_time_type(time.data_type()).ok_or_else(|| {
            TimetableError::unsupported_schema(
                "time",
                time.data_type().to_string(),
                format!("{} or {}", DataType::Float64, DataType::Timestamp),
            )
        })?;

        let track = expect_dictionary("track", track)?;
        let op = expect_dictionary("op", op)?;
        let unit = expect_dictionary("unit", unit)?;
        let quantity = match quantity {
            Column::Float64(values) => values,
            other => {
                return Err(TimetableError::unsupported_schema(
                    "quantity",
                    other.data_type().to_string(),
                    DataType::Float64.to_string(),
                ))
            }
        };

        if unit.null_count() > 0 {
            return Err(TimetableError::unsupported_schema(
                "unit",
                "null",
                "non-null dictionary values",
            ));
        }

        if let Column::Timestamp(values) = &time {
            if let Some((row, millis)) = values
                .iter()
                .enumerate()
                .find(|(_, ms)| DateTime::from_timestamp_millis(**ms).is_none())
            {
                return Err(TimetableError::invalid_date(format!(
                    "timestamp {millis} ms at event {row} is out of range"
                )));
            }
        }

        Ok(Self {
            schema,
            track,
            time,
            op,
            quantity,
            unit,
        })
    }

    /// Serializes a list of events into the schema implied by their times.
    ///
    /// An empty list yields an empty canonical table.
    ///
    /// # Errors
    ///
    /// Returns `MixedTimeRepresentation` if instants and year fractions are mixed.
    pub fn from_events(events: &[Event]) -> TimetableResult<Self> {
        let kind = events.first().map_or(TimeKind::Instant, |e| e.time.kind());
        if let Some((row, event)) = events
            .iter()
            .enumerate()
            .find(|(_, e)| e.time.kind() != kind)
        {
            return Err(TimetableError::mixed_time(format!(
                "event {row} uses {} but event 0 uses {kind}",
                event.time.kind()
            )));
        }

        let time = match kind {
            TimeKind::Instant => Column::Timestamp(
                events
                    .iter()
                    .filter_map(|e| e.time.timestamp_millis())
                    .collect(),
            ),
            TimeKind::Years => {
                Column::Float64(events.iter().filter_map(|e| e.time.as_years()).collect())
            }
        };

        Self::try_from_columns(
            DictionaryArray::from_values(events.iter().map(|e| e.track.as_deref())).into(),
            time,
            DictionaryArray::from_values(events.iter().map(|e| e.op.as_ref().map(Op::as_str)))
                .into(),
            Column::Float64(events.iter().map(|e| e.quantity).collect()),
            DictionaryArray::from_values(events.iter().map(|e| Some(e.unit.as_str()))).into(),
        )
    }

    /// Replaces the `time` column, keeping every other column and the row order.
    ///
    /// # Errors
    ///
    /// Fails on a length mismatch or an unsupported time type.
    pub fn with_time_column(self, time: Column) -> TimetableResult<Self> {
        Self::try_from_columns(
            self.track.into(),
            time,
            self.op.into(),
            Column::Float64(self.quantity),
            self.unit.into(),
        )
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.quantity.len()
    }

    /// Returns true if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quantity.is_empty()
    }

    /// Which schema the table follows.
    #[must_use]
    pub fn schema_kind(&self) -> SchemaKind {
        self.schema
    }

    /// The schema definition.
    #[must_use]
    pub fn schema(&self) -> &'static Schema {
        self.schema.schema()
    }

    /// The `track` column.
    #[must_use]
    pub fn track(&self) -> &DictionaryArray {
        &self.track
    }

    /// The `time` column.
    #[must_use]
    pub fn time(&self) -> &Column {
        &self.time
    }

    /// The `op` column.
    #[must_use]
    pub fn op(&self) -> &DictionaryArray {
        &self.op
    }

    /// The `quantity` column.
    #[must_use]
    pub fn quantity(&self) -> &[f64] {
        &self.quantity
    }

    /// The `unit` column.
    #[must_use]
    pub fn unit(&self) -> &DictionaryArray {
        &self.unit
    }

    /// Returns row `i`, or `None` if out of range.
    #[must_use]
    pub fn row(&self, i: usize) -> Option<EventRow<'_>> {
        (i < self.len()).then(|| self.row_at(i))
    }

    /// Iterates over every row in order.
    pub fn iter(&self) -> impl Iterator<Item = EventRow<'_>> + '_ {
        (0..self.len()).map(move |i| self.row_at(i))
    }

    /// Row `i < len`; timestamps and units were checked on construction.
    fn row_at(&self, i: usize) -> EventRow<'_> {
        let time = match &self.time {
            Column::Timestamp(values) => {
                EventTime::Instant(DateTime::from_timestamp_millis(values[i]).unwrap_or_default())
            }
            Column::Float64(values) => EventTime::Years(values[i]),
            Column::Dictionary(_) => EventTime::Years(f64::NAN),
        };
        EventRow {
            track: self.track.get(i),
            time,
            op: self.op.get(i),
            quantity: self.quantity[i],
            unit: self.unit.get(i).unwrap_or_default(),
        }
    }

    /// Decodes the table back into owned events.
    ///
    /// # Errors
    ///
    /// Fails if an op code is empty.
    pub fn to_events(&self) -> TimetableResult<Vec<Event>> {
        self.iter().map(|row| row.to_event()).collect()
    }
}
