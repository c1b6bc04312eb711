//! Keyed collection of expressions.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;

use crate::error::{TimetableError, TimetableResult};
use crate::expression::{Expression, ExpressionDescriptor, ExpressionKind};

/// Expressions referenced by a timetable, keyed by name.
///
/// Keys are unique; inserting or merging a key twice is an error rather than
/// a silent overwrite. Iteration is in key order.
///
/// # Example
///
/// ```rust
/// use timetable_core::expression::{Expression, PhraseValue};
/// use timetable_core::registry::ExpressionRegistry;
///
/// let mut registry = ExpressionRegistry::new();
/// registry
///     .insert("KO", Expression::phrase(["SPX"], |inp| {
///         PhraseValue::Condition(inp[0].iter().map(|s| *s < 80.0).collect())
///     }))
///     .unwrap();
///
/// assert!(registry.contains_key("KO"));
/// assert!(registry.insert("KO", Expression::phrase(["SPX"], |inp| {
///     PhraseValue::Amount(inp[0].to_vec())
/// })).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExpressionRegistry {
    entries: BTreeMap<String, Expression>,
}

impl ExpressionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an expression.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateKey` if `key` is already registered.
    pub fn insert(&mut self, key: impl Into<String>, expression: Expression) -> TimetableResult<()> {
        match self.entries.entry(key.into()) {
            btree_map::Entry::Occupied(entry) => Err(TimetableError::DuplicateKey {
                key: entry.key().clone(),
            }),
            btree_map::Entry::Vacant(entry) => {
                entry.insert(expression);
                Ok(())
            }
        }
    }

    /// Builder form of [`insert`](Self::insert).
    ///
    /// # Errors
    ///
    /// Returns `DuplicateKey` if `key` is already registered.
    pub fn with(mut self, key: impl Into<String>, expression: Expression) -> TimetableResult<Self> {
        self.insert(key, expression)?;
        Ok(self)
    }

    /// Moves every entry of `other` into this registry.
    ///
    /// Either all entries are merged or, on a collision, none are.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateKey` for the first shared key.
    pub fn merge(&mut self, other: ExpressionRegistry) -> TimetableResult<()> {
        if let Some(key) = other.entries.keys().find(|k| self.entries.contains_key(*k)) {
            return Err(TimetableError::DuplicateKey { key: key.clone() });
        }
        self.entries.extend(other.entries);
        Ok(())
    }

    /// Looks up an expression.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Expression> {
        self.entries.get(key)
    }

    /// Returns true if `key` is registered.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of expressions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no expressions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over `(key, expression)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Expression)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn resolve(&self, key: &str, row: usize, expected: ExpressionKind) -> TimetableResult<&Expression> {
        let expression = self
            .get(key)
            .ok_or_else(|| TimetableError::unresolved_key(key, row))?;
        if expression.kind() != expected {
            return Err(TimetableError::KindMismatch {
                key: key.to_string(),
                found: expression.kind().to_string(),
                expected: expected.to_string(),
            });
        }
        Ok(expression)
    }

    /// Resolves the phrase behind a custom op code used at event `row`.
    ///
    /// # Errors
    ///
    /// `UnresolvedKey` if missing, `KindMismatch` if it is a snapper.
    pub fn resolve_condition(&self, code: &str, row: usize) -> TimetableResult<&Expression> {
        self.resolve(code, row, ExpressionKind::Phrase)
    }

    /// Resolves the snapper behind a state tick at event `row`.
    ///
    /// # Errors
    ///
    /// `UnresolvedKey` if missing, `KindMismatch` if it is a phrase.
    pub fn resolve_tick(&self, key: &str, row: usize) -> TimetableResult<&Expression> {
        self.resolve(key, row, ExpressionKind::Snapper)
    }

    /// Every register name written by some snapper.
    #[must_use]
    pub fn snapper_outputs(&self) -> BTreeSet<&str> {
        self.entries
            .values()
            .flat_map(|e| e.outputs().iter().map(String::as_str))
            .collect()
    }

    /// Wire descriptors keyed by expression name.
    #[must_use]
    pub fn descriptors(&self) -> BTreeMap<&str, ExpressionDescriptor> {
        self.iter().map(|(k, e)| (k, e.descriptor())).collect()
    }
}

impl Serialize for ExpressionRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, expression) in &self.entries {
            map.serialize_entry(key, &expression.descriptor())?;
        }
        map.end()
    }
}

impl FromIterator<(String, Expression)> for ExpressionRegistry {
    /// Collects pairs, keeping the first expression for a repeated key.
    ///
    /// Use [`insert`](ExpressionRegistry::insert) when collisions must be reported.
    fn from_iter<I: IntoIterator<Item = (String, Expression)>>(iter: I) -> Self {
        let mut entries = BTreeMap::new();
        for (key, expression) in iter {
            entries.entry(key).or_insert(expression);
        }
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::PhraseValue;

    fn identity(name: &str, out: &str) -> Expression {
        Expression::snapper([name], [out], |inputs| vec![inputs[0].to_vec()])
    }

    fn always() -> Expression {
        Expression::phrase(Vec::<String>::new(), |_| PhraseValue::Condition(vec![true]))
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut reg = ExpressionRegistry::new();
        reg.insert("fix", identity("SPX", "K")).unwrap();
        let err = reg.insert("fix", always()).unwrap_err();
        assert_eq!(err, TimetableError::DuplicateKey { key: "fix".into() });
        assert_eq!(reg.get("fix").unwrap().kind(), ExpressionKind::Snapper);
    }

    #[test]
    fn test_merge_is_all_or_nothing() {
        let mut a = ExpressionRegistry::new().with("A.fix", identity("SPX", "A.K")).unwrap();
        let b = ExpressionRegistry::new()
            .with("B.fix", identity("SPX", "B.K"))
            .unwrap()
            .with("A.fix", always())
            .unwrap();

        assert!(a.merge(b).is_err());
        assert_eq!(a.len(), 1);

        let c = ExpressionRegistry::new().with("B.fix", identity("SPX", "B.K")).unwrap();
        a.merge(c).unwrap();
        assert_eq!(a.keys().collect::<Vec<_>>(), vec!["A.fix", "B.fix"]);
    }

    #[test]
    fn test_resolve() {
        let reg = ExpressionRegistry::new()
            .with("fix", identity("SPX", "K"))
            .unwrap()
            .with("KO", always())
            .unwrap();

        assert!(reg.resolve_tick("fix", 0).is_ok());
        assert!(reg.resolve_condition("KO", 1).is_ok());
        assert_eq!(
            reg.resolve_condition("missing", 3).unwrap_err(),
            TimetableError::unresolved_key("missing", 3)
        );
        assert!(matches!(
            reg.resolve_condition("fix", 0),
            Err(TimetableError::KindMismatch { .. })
        ));
        assert!(matches!(
            reg.resolve_tick("KO", 0),
            Err(TimetableError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_snapper_outputs() {
        let reg = ExpressionRegistry::new()
            .with("a", identity("SPX", "K1"))
            .unwrap()
            .with("b", identity("SPX", "K2"))
            .unwrap()
            .with("KO", always())
            .unwrap();
        assert_eq!(reg.snapper_outputs().into_iter().collect::<Vec<_>>(), vec!["K1", "K2"]);
    }

    #[test]
    fn test_serialize_descriptors() {
        let reg = ExpressionRegistry::new()
            .with("fix", identity("SPX", "K"))
            .unwrap();
        let json = serde_json::to_value(&reg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"fix": {"type": "snapper", "inp": ["SPX"], "out": ["K"]}})
        );
    }
}
