//! Event schemas.
//!
//! Two five-field schemas share the column order track, time, op, quantity,
//! unit. They differ only in the type of the `time` column:
//!
//! - [`TS_EVENT_SCHEMA`]: canonical, millisecond UTC timestamps
//! - [`EVENT_SCHEMA`]: deprecated, float years from the valuation epoch
//!
//! Both are process-wide constants built once on first use.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column names in schema order.
pub const FIELD_NAMES: [&str; 5] = ["track", "time", "op", "quantity", "unit"];

/// Timezone of canonical timestamps.
pub const TIMESTAMP_TZ: &str = "UTC";

/// Logical type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Dictionary-encoded (categorical) string.
    Dictionary,
    /// 64-bit float.
    Float64,
    /// Millisecond timestamp in UTC.
    Timestamp,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Dictionary => f.write_str("dictionary<int64, string>"),
            DataType::Float64 => f.write_str("float64"),
            DataType::Timestamp => write!(f, "timestamp[ms, tz={TIMESTAMP_TZ}]"),
        }
    }
}

/// A named, typed column of the event schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Column name.
    pub name: &'static str,
    /// Column type.
    pub data_type: DataType,
}

impl Field {
    const fn new(name: &'static str, data_type: DataType) -> Self {
        Self { name, data_type }
    }
}

/// Which of the two event schemas a table follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaKind {
    /// Float-years `time` column (deprecated).
    Legacy,
    /// Timestamp `time` column.
    Canonical,
}

impl SchemaKind {
    /// Returns the schema definition.
    #[must_use]
    pub fn schema(&self) -> &'static Schema {
        match self {
            SchemaKind::Legacy => &EVENT_SCHEMA,
            SchemaKind::Canonical => &TS_EVENT_SCHEMA,
        }
    }

    /// Identifies the schema from the type of the `time` column.
    #[must_use]
    pub fn from_time_type(data_type: DataType) -> Option<Self> {
        match data_type {
            DataType::Float64 => Some(SchemaKind::Legacy),
            DataType::Timestamp => Some(SchemaKind::Canonical),
            DataType::Dictionary => None,
        }
    }
}

/// An ordered set of five fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    fields: [Field; 5],
}

impl Schema {
    fn with_time(time: DataType) -> Self {
        Self {
            fields: [
                Field::new(FIELD_NAMES[0], DataType::Dictionary),
                Field::new(FIELD_NAMES[1], time),
                Field::new(FIELD_NAMES[2], DataType::Dictionary),
                Field::new(FIELD_NAMES[3], DataType::Float64),
                Field::new(FIELD_NAMES[4], DataType::Dictionary),
            ],
        }
    }

    /// Returns the fields in order.
    #[must_use]
    pub fn fields(&self) -> &[Field; 5] {
        &self.fields
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Type of the `time` column.
    #[must_use]
    pub fn time_type(&self) -> DataType {
        self.fields[1].data_type
    }
}

/// Deprecated schema with float-years time.
pub static EVENT_SCHEMA: Lazy<Schema> = Lazy::new(|| Schema::with_time(DataType::Float64));

/// Canonical schema with millisecond UTC timestamps.
pub static TS_EVENT_SCHEMA: Lazy<Schema> = Lazy::new(|| Schema::with_time(DataType::Timestamp));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_order() {
        for schema in [&*EVENT_SCHEMA, &*TS_EVENT_SCHEMA] {
            let names: Vec<_> = schema.fields().iter().map(|f| f.name).collect();
            assert_eq!(names, FIELD_NAMES);
        }
    }

    #[test]
    fn test_schemas_differ_only_in_time() {
        assert_eq!(EVENT_SCHEMA.time_type(), DataType::Float64);
        assert_eq!(TS_EVENT_SCHEMA.time_type(), DataType::Timestamp);
        for name in ["track", "op", "quantity", "unit"] {
            assert_eq!(EVENT_SCHEMA.field(name), TS_EVENT_SCHEMA.field(name));
        }
    }

    #[test]
    fn test_kind_from_time_type() {
        assert_eq!(
            SchemaKind::from_time_type(DataType::Timestamp),
            Some(SchemaKind::Canonical)
        );
        assert_eq!(
            SchemaKind::from_time_type(DataType::Float64),
            Some(SchemaKind::Legacy)
        );
        assert_eq!(SchemaKind::from_time_type(DataType::Dictionary), None);
        assert_eq!(SchemaKind::Legacy.schema(), &*EVENT_SCHEMA);
    }

    #[test]
    fn test_display() {
        assert_eq!(DataType::Timestamp.to_string(), "timestamp[ms, tz=UTC]");
    }
}
