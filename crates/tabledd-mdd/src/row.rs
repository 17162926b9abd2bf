//! Input rows
//!
//! The build side consumes a sequence of [`Row`]s, each a mapping from
//! dimension name to an opaque [`Value`]. Keys not present in the schema are
//! ignored; schema dimensions absent from a row are treated as missing.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};
use tabledd_core::Value;

/// Order-preserving map with the fast FxHash hasher.
pub type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// One input row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub fields: FxIndexMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self {
            fields: IndexMap::with_hasher(FxBuildHasher),
        }
    }

    /// Builder-style insertion.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_style() {
        let row = Row::new().with("region", "EU").with("priority", 1i64);
        assert_eq!(row.get("region"), Some(&Value::Str("EU".into())));
        assert_eq!(row.get("priority"), Some(&Value::Int(1)));
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn test_absent_key() {
        let row = Row::new().with("a", 1i64);
        assert_eq!(row.get("b"), None);
    }

    #[test]
    fn test_from_iterator() {
        let row: Row = vec![("a".to_string(), Value::Int(1))].into_iter().collect();
        assert_eq!(row.get("a"), Some(&Value::Int(1)));
    }
}
