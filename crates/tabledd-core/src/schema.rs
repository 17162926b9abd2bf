//! Dimension schemas
//!
//! A [`Schema`] declares the dimensions of a table: their names, their
//! declared types, and per-dimension binning / rank / missing-token metadata.
//! The schema fixes the dimension *set*; the compilation *order* is chosen
//! later by the ordering engine and recorded on the diagram.

use crate::binning::BinConfig;
use crate::error::{SchemaError, SchemaResult};
use crate::value::Value;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token substituted for absent or unparseable cells.
pub const DEFAULT_MISSING_TOKEN: &str = "__MISSING__";

/// Declared type of a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionType {
    Categorical,
    Ordinal,
    Numeric,
    Mixed,
}

impl fmt::Display for DimensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionType::Categorical => write!(f, "categorical"),
            DimensionType::Ordinal => write!(f, "ordinal"),
            DimensionType::Numeric => write!(f, "numeric"),
            DimensionType::Mixed => write!(f, "mixed"),
        }
    }
}

/// A single named column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub dtype: DimensionType,
    /// Binning config for numeric dimensions; falls back to
    /// `BuildConfig::default_numeric_bins` when absent.
    #[serde(default)]
    pub bins: Option<BinConfig>,
    /// Optional value → rank mapping for ordinal dimensions.
    #[serde(default)]
    pub rank_map: Option<IndexMap<Value, i64>>,
    /// Token inserted when a cell is absent or missing.
    #[serde(default = "default_missing_token")]
    pub missing_token: Value,
}

fn default_missing_token() -> Value {
    Value::Str(DEFAULT_MISSING_TOKEN.to_string())
}

impl Dimension {
    pub fn new(name: impl Into<String>, dtype: DimensionType) -> Self {
        Self {
            name: name.into(),
            dtype,
            bins: None,
            rank_map: None,
            missing_token: default_missing_token(),
        }
    }

    pub fn with_bins(mut self, bins: BinConfig) -> Self {
        self.bins = Some(bins);
        self
    }

    pub fn with_rank_map(mut self, rank_map: IndexMap<Value, i64>) -> Self {
        self.rank_map = Some(rank_map);
        self
    }

    pub fn with_missing_token(mut self, token: impl Into<Value>) -> Self {
        self.missing_token = token.into();
        self
    }

    pub fn is_numeric(&self) -> bool {
        self.dtype == DimensionType::Numeric
    }
}

/// An ordered set of dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<Dimension>", into = "Vec<Dimension>")]
pub struct Schema {
    dims: Vec<Dimension>,
    name_to_index: FxHashMap<String, usize>,
}

impl Schema {
    pub fn new(dims: Vec<Dimension>) -> Self {
        let name_to_index = dims
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.clone(), i))
            .collect();
        Self {
            dims,
            name_to_index,
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.dims.iter().map(|d| d.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.dims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    pub fn dims(&self) -> &[Dimension] {
        &self.dims
    }

    pub fn get(&self, name: &str) -> Option<&Dimension> {
        self.name_to_index.get(name).map(|&i| &self.dims[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// Reorder into a sub-schema following `ordered_names`.
    pub fn subset(&self, ordered_names: &[String]) -> SchemaResult<Schema> {
        let dims = ordered_names
            .iter()
            .map(|n| {
                self.get(n).cloned().ok_or_else(|| SchemaError::UnknownDimension {
                    dimension: n.clone(),
                    operation: "subset".into(),
                })
            })
            .collect::<SchemaResult<Vec<_>>>()?;
        Ok(Schema::new(dims))
    }

    /// Check that every schema dimension appears in `columns`.
    pub fn validate(&self, columns: &[String]) -> SchemaResult<()> {
        for d in &self.dims {
            if !columns.contains(&d.name) {
                return Err(SchemaError::UnknownDimension {
                    dimension: d.name.clone(),
                    operation: "validate".into(),
                });
            }
        }
        Ok(())
    }
}

impl From<Vec<Dimension>> for Schema {
    fn from(dims: Vec<Dimension>) -> Self {
        Schema::new(dims)
    }
}

impl From<Schema> for Vec<Dimension> {
    fn from(s: Schema) -> Self {
        s.dims
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Schema {
        Schema::new(vec![
            Dimension::new("region", DimensionType::Categorical),
            Dimension::new("priority", DimensionType::Ordinal),
            Dimension::new("qty", DimensionType::Numeric),
        ])
    }

    #[test]
    fn test_lookup_by_name() {
        let s = sample();
        assert_eq!(s.get("qty").unwrap().dtype, DimensionType::Numeric);
        assert!(s.get("nope").is_none());
        assert!(s.contains("region"));
    }

    #[test]
    fn test_subset_reorders() {
        let s = sample();
        let sub = s
            .subset(&["qty".to_string(), "region".to_string()])
            .unwrap();
        assert_eq!(sub.names(), vec!["qty", "region"]);
    }

    #[test]
    fn test_subset_unknown_dimension() {
        let s = sample();
        let err = s.subset(&["ghost".to_string()]).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownDimension { .. }));
    }

    #[test]
    fn test_validate_missing_column() {
        let s = sample();
        let cols = vec!["region".to_string(), "priority".to_string()];
        assert!(s.validate(&cols).is_err());
    }

    #[test]
    fn test_default_missing_token() {
        let d = Dimension::new("a", DimensionType::Categorical);
        assert_eq!(
            d.missing_token,
            Value::Str(DEFAULT_MISSING_TOKEN.to_string())
        );
    }

    #[test]
    fn test_builder_style_modifiers() {
        let d = Dimension::new("a", DimensionType::Categorical).with_missing_token("<na>");
        assert_eq!(d.missing_token, Value::Str("<na>".into()));
    }
}
