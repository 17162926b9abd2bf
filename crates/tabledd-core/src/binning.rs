//! Numeric binning
//!
//! Numeric dimensions are quantized before compilation: a [`BinModel`] is
//! fitted once per column from the training values, then every raw number is
//! replaced by an interval-string label such as `[1,2.5)`. The last bin is
//! right-inclusive. Already-binned labels pass through unchanged, so a bin
//! model is idempotent on its own output.

use crate::error::{SchemaError, SchemaResult};
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Edge-fitting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BinStrategy {
    #[default]
    Quantile,
    FixedWidth,
}

/// Binning configuration for one numeric dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinConfig {
    #[serde(default)]
    pub strategy: BinStrategy,
    #[serde(default = "default_k")]
    pub k: usize,
    /// Explicit cut points; when present they override the strategy.
    #[serde(default)]
    pub edges: Option<Vec<f64>>,
}

fn default_k() -> usize {
    10
}

impl Default for BinConfig {
    fn default() -> Self {
        Self {
            strategy: BinStrategy::Quantile,
            k: default_k(),
            edges: None,
        }
    }
}

impl BinConfig {
    pub fn quantile(k: usize) -> Self {
        Self {
            strategy: BinStrategy::Quantile,
            k,
            edges: None,
        }
    }

    pub fn fixed_width(k: usize) -> Self {
        Self {
            strategy: BinStrategy::FixedWidth,
            k,
            edges: None,
        }
    }

    pub fn explicit(edges: Vec<f64>) -> Self {
        Self {
            strategy: BinStrategy::FixedWidth,
            k: edges.len().saturating_sub(1),
            edges: Some(edges),
        }
    }
}

/// A fitted bin model: sorted unique cut points plus the missing token.
///
/// A model with no edges is *degenerate* (fitted from a column with no
/// non-missing values) and maps every input to the missing token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinModel {
    edges: Vec<f64>,
    strategy: BinStrategy,
    k: usize,
    missing_token: Value,
}

impl BinModel {
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Effective bin count; may be less than the requested `k` when quantile
    /// edges collapsed under heavy ties.
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn is_degenerate(&self) -> bool {
        self.edges.is_empty()
    }

    /// Map one value to its arc label.
    ///
    /// Numbers land in the unique interval containing them (clamped to the
    /// outermost bins); missing maps to the missing token; strings and bools
    /// pass through unchanged, which makes already-binned labels exact
    /// categorical arcs at query time.
    pub fn apply(&self, v: &Value) -> Value {
        match v {
            Value::Missing => self.missing_token.clone(),
            Value::Int(n) => self.label_of(*n as f64),
            Value::Float(x) if x.is_nan() => self.missing_token.clone(),
            Value::Float(x) => self.label_of(*x),
            Value::Str(_) | Value::Bool(_) => v.clone(),
        }
    }

    fn label_of(&self, x: f64) -> Value {
        if self.is_degenerate() {
            return self.missing_token.clone();
        }
        let last = self.edges.len() - 2;
        let idx = bin_index(&self.edges, x).min(last);
        Value::Str(self.label(idx))
    }

    /// Interval string for bin `idx`: `[lo,hi)`, or `[lo,hi]` for the last.
    pub fn label(&self, idx: usize) -> String {
        let lo = fmt_edge(self.edges[idx]);
        let hi = fmt_edge(self.edges[idx + 1]);
        if idx + 2 == self.edges.len() {
            format!("[{},{}]", lo, hi)
        } else {
            format!("[{},{})", lo, hi)
        }
    }

    /// All labels, in bin order.
    pub fn labels(&self) -> Vec<String> {
        (0..self.k).map(|i| self.label(i)).collect()
    }
}

/// Index of the right-open interval containing `x`, clamped to `[0, k-1]`.
fn bin_index(edges: &[f64], x: f64) -> usize {
    // rightmost i with edges[i] <= x
    let mut idx = edges.partition_point(|&e| e <= x);
    idx = idx.saturating_sub(1);
    idx.min(edges.len().saturating_sub(2))
}

/// Format a cut point compactly (integers without a fraction, otherwise up to
/// six decimals with trailing zeros trimmed).
fn fmt_edge(x: f64) -> String {
    if x.fract() == 0.0 && x.abs() < 1e12 {
        format!("{}", x as i64)
    } else {
        let s = format!("{:.6}", x);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Fit a bin model from the non-missing values of one numeric column.
///
/// Edges are unique and sorted; duplicate quantiles collapse, so the
/// effective bin count may be below the requested `k`. A column with no
/// non-missing values yields a degenerate model.
pub fn fit_binner(
    dimension: &str,
    values: &[f64],
    cfg: &BinConfig,
    missing_token: Value,
) -> SchemaResult<BinModel> {
    if let Some(explicit) = &cfg.edges {
        if explicit.len() < 2 || explicit.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SchemaError::InvalidBinConfig {
                dimension: dimension.to_string(),
                message: "explicit edges must be at least two strictly increasing cut points"
                    .into(),
            });
        }
        return Ok(BinModel {
            edges: explicit.clone(),
            strategy: cfg.strategy,
            k: explicit.len() - 1,
            missing_token,
        });
    }

    if cfg.k < 1 {
        return Err(SchemaError::InvalidBinConfig {
            dimension: dimension.to_string(),
            message: format!("bin count must be at least 1, got {}", cfg.k),
        });
    }

    let mut x: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if x.is_empty() {
        return Ok(BinModel {
            edges: Vec::new(),
            strategy: cfg.strategy,
            k: 0,
            missing_token,
        });
    }
    x.sort_by(f64::total_cmp);

    let lo = x[0];
    let hi = x[x.len() - 1];

    let mut edges: Vec<f64> = match cfg.strategy {
        BinStrategy::FixedWidth => {
            if lo == hi {
                vec![lo, hi + 1e-9]
            } else {
                (0..=cfg.k)
                    .map(|i| lo + (hi - lo) * i as f64 / cfg.k as f64)
                    .collect()
            }
        }
        BinStrategy::Quantile => (0..=cfg.k)
            .map(|i| quantile_sorted(&x, i as f64 / cfg.k as f64))
            .collect(),
    };

    edges.dedup_by(|a, b| a == b);
    if edges.len() < 2 {
        edges = vec![lo, hi + 1e-9];
    }

    let k = edges.len() - 1;
    Ok(BinModel {
        edges,
        strategy: cfg.strategy,
        k,
        missing_token,
    })
}

/// Empirical quantile with linear interpolation over a sorted slice.
fn quantile_sorted(x: &[f64], q: f64) -> f64 {
    if x.len() == 1 {
        return x[0];
    }
    let pos = q * (x.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        x[lo]
    } else {
        x[lo] + (pos - lo as f64) * (x[hi] - x[lo])
    }
}
