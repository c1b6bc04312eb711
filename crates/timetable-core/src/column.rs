//! Column arrays backing an event table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::schema::DataType;

/// A nullable, dictionary-encoded string column.
///
/// Track, op and unit columns have few distinct values; each distinct string
/// is stored once and rows hold a key into the dictionary.
///
/// ```rust
/// use timetable_core::column::DictionaryArray;
///
/// let arr = DictionaryArray::from_values([Some("USD"), None, Some("USD"), Some("SPX")]);
/// assert_eq!(arr.len(), 4);
/// assert_eq!(arr.dictionary().len(), 2);
/// assert_eq!(arr.get(1), None);
/// assert_eq!(arr.get(3), Some("SPX"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryArray {
    dictionary: Vec<String>,
    keys: Vec<Option<u32>>,
}

impl DictionaryArray {
    /// Encodes a sequence of optional strings.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        let mut dictionary: Vec<String> = Vec::new();
        let mut index: HashMap<String, u32> = HashMap::new();
        let keys = values
            .into_iter()
            .map(|value| {
                value.map(|v| {
                    let v = v.as_ref();
                    if let Some(&key) = index.get(v) {
                        key
                    } else {
                        let key = dictionary.len() as u32;
                        dictionary.push(v.to_string());
                        index.insert(v.to_string(), key);
                        key
                    }
                })
            })
            .collect();
        Self { dictionary, keys }
    }

    /// A column of `len` rows all holding `value`.
    #[must_use]
    pub fn constant(len: usize, value: &str) -> Self {
        Self {
            dictionary: vec![value.to_string()],
            keys: vec![Some(0); len],
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Distinct values in first-seen order.
    #[must_use]
    pub fn dictionary(&self) -> &[String] {
        &self.dictionary
    }

    /// Value at row `i`; `None` for a null or out-of-range row.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<&str> {
        self.keys
            .get(i)
            .copied()
            .flatten()
            .and_then(|k| self.dictionary.get(k as usize))
            .map(String::as_str)
    }

    /// Returns true if row `i` is null.
    #[must_use]
    pub fn is_null(&self, i: usize) -> bool {
        matches!(self.keys.get(i), Some(None))
    }

    /// Number of null rows.
    #[must_use]
    pub fn null_count(&self) -> usize {
        self.keys.iter().filter(|k| k.is_none()).count()
    }

    /// Iterates over the decoded values.
    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }
}

/// A typed column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum Column {
    /// Dictionary-encoded strings.
    Dictionary(DictionaryArray),
    /// 64-bit floats.
    Float64(Vec<f64>),
    /// Epoch milliseconds, UTC.
    Timestamp(Vec<i64>),
}

impl Column {
    /// Logical type of the column.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        match self {
            Column::Dictionary(_) => DataType::Dictionary,
            Column::Float64(_) => DataType::Float64,
            Column::Timestamp(_) => DataType::Timestamp,
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Column::Dictionary(arr) => arr.len(),
            Column::Float64(values) => values.len(),
            Column::Timestamp(values) => values.len(),
        }
    }

    /// Returns true if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<DictionaryArray> for Column {
    fn from(arr: DictionaryArray) -> Self {
        Column::Dictionary(arr)
    }
}

impl From<Vec<f64>> for Column {
    fn from(values: Vec<f64>) -> Self {
        Column::Float64(values)
    }
}

impl From<Vec<i64>> for Column {
    fn from(values: Vec<i64>) -> Self {
        Column::Timestamp(values)
    }
}
