//! Queries over a compiled diagram
//!
//! All queries take a partial pattern (dimension → value); absent dimensions
//! are wildcards. Values supplied for numeric dimensions are routed through
//! the stored bin models before traversal, so raw numbers and interval-string
//! labels both work. Queries that find nothing return empty results; errors
//! are reserved for malformed input.
//!
//! The missing token is an ordinary arc label: wildcards traverse it like
//! any other arc, a fixed value never equals it, and supplying the token
//! explicitly selects the rows whose cell was missing.

mod complete;
mod nearest;

pub use nearest::{DistanceFn, DistanceFns, HeuristicPolicy};

use crate::node::NodeId;
use crate::store::Mdd;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tabledd_core::error::QueryError;
use tabledd_core::{QueryConfig, Value};

/// A partial specification: dimension name → wanted value.
pub type Pattern = IndexMap<String, Value>;

/// One scored query answer.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Complete path: dimension name → arc label, in compilation order.
    pub path: Pattern,
    /// Higher is better: log-probability for `complete`, negated distance
    /// for `nearest`.
    pub score: f64,
    /// Raw per-query numbers (`logprob`, `distance`).
    pub details: IndexMap<String, f64>,
}

impl Mdd {
    pub(crate) fn validate_pattern(
        &self,
        pattern: &Pattern,
        operation: &str,
    ) -> Result<(), QueryError> {
        for dim in pattern.keys() {
            if !self.dims().contains(dim) {
                return Err(QueryError::UnknownDimension {
                    dimension: dim.clone(),
                    operation: operation.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Apply the stored bin models to the numeric entries of a pattern.
    /// Raw numbers (and numeric strings) route into their bin; interval
    /// labels pass through as exact arcs.
    pub(crate) fn bin_pattern(&self, pattern: &Pattern) -> Pattern {
        pattern
            .iter()
            .map(|(dim, v)| {
                let v = match self.bin_model(dim) {
                    Some(model) => match v {
                        Value::Str(s) => match s.parse::<f64>() {
                            Ok(x) => model.apply(&Value::Float(x)),
                            Err(_) => v.clone(),
                        },
                        other => model.apply(other),
                    },
                    None => v.clone(),
                };
                (dim.clone(), v)
            })
            .collect()
    }

    /// Laplace-smoothed conditional probability of taking `label` out of
    /// node `nid`: `(count + α) / (total + α · branching)`.
    pub(crate) fn cond_prob(&self, nid: NodeId, label: &Value) -> f64 {
        let n = self.node(nid);
        let total = n.out_count() as f64;
        let k = (n.arity() as f64).max(1.0);
        let alpha = self.laplace_alpha();
        (n.edge_count(label) as f64 + alpha) / (total + alpha * k)
    }

    /// Exact membership: does the fully specified row reach a terminal?
    ///
    /// Every dimension must be present in `x`; an absent dimension is a
    /// [`QueryError::IncompleteInput`], not a silent miss.
    pub fn exists(&self, x: &Pattern) -> Result<bool, QueryError> {
        self.validate_pattern(x, "exists")?;
        let x = self.bin_pattern(x);
        let mut nid = self.root();
        for dim in self.dims() {
            let v = x.get(dim).ok_or_else(|| QueryError::IncompleteInput {
                dimension: dim.clone(),
            })?;
            match self.node(nid).child(v) {
                Some(child) => nid = child,
                None => return Ok(false),
            }
        }
        Ok(self.node(nid).terminal_count > 0)
    }

    /// Number of input rows whose projection matches `pattern`, without
    /// enumerating them. Memoized on node id (the pattern is fixed for the
    /// whole descent).
    pub fn count(&self, pattern: &Pattern) -> Result<u64, QueryError> {
        self.validate_pattern(pattern, "count")?;
        let pattern = self.bin_pattern(pattern);
        let mut memo: FxHashMap<(NodeId, usize), u64> = FxHashMap::default();
        Ok(self.count_dfs(&pattern, self.root(), 0, &mut memo))
    }

    fn count_dfs(
        &self,
        pattern: &Pattern,
        nid: NodeId,
        layer: usize,
        memo: &mut FxHashMap<(NodeId, usize), u64>,
    ) -> u64 {
        if layer == self.terminal_layer() {
            return self.node(nid).terminal_count;
        }
        if let Some(&cached) = memo.get(&(nid, layer)) {
            return cached;
        }
        let n = self.node(nid);
        let total = match pattern.get(&self.dims()[layer]) {
            Some(want) => match n.child(want) {
                Some(child) => self.count_dfs(pattern, child, layer + 1, memo),
                None => 0,
            },
            None => n
                .edges
                .values()
                .map(|e| self.count_dfs(pattern, e.target, layer + 1, memo))
                .sum(),
        };
        memo.insert((nid, layer), total);
        total
    }

    /// [`match_paths`](Mdd::match_paths) with the result cap taken from a
    /// [`QueryConfig`].
    pub fn match_paths_with(
        &self,
        pattern: &Pattern,
        config: &QueryConfig,
    ) -> Result<Vec<Pattern>, QueryError> {
        self.match_paths(pattern, config.limit)
    }

    /// [`complete`](Mdd::complete) with the beam width taken from a
    /// [`QueryConfig`].
    pub fn complete_with(
        &self,
        partial: &Pattern,
        k: usize,
        config: &QueryConfig,
    ) -> Result<Vec<QueryResult>, QueryError> {
        self.complete(partial, k, config.beam)
    }

    /// Enumerate up to `limit` complete paths matching `pattern`, visiting
    /// arcs in sorted-label order.
    pub fn match_paths(&self, pattern: &Pattern, limit: usize) -> Result<Vec<Pattern>, QueryError> {
        self.validate_pattern(pattern, "match")?;
        if limit < 1 {
            return Err(QueryError::InvalidArgument {
                operation: "match",
                field: "limit",
                value: limit.to_string(),
            });
        }
        let pattern = self.bin_pattern(pattern);
        let mut out = Vec::new();
        let mut acc = Vec::with_capacity(self.terminal_layer());
        self.match_dfs(&pattern, self.root(), 0, limit, &mut acc, &mut out);
        Ok(out)
    }

    fn match_dfs(
        &self,
        pattern: &Pattern,
        nid: NodeId,
        layer: usize,
        limit: usize,
        acc: &mut Vec<Value>,
        out: &mut Vec<Pattern>,
    ) {
        if out.len() >= limit {
            return;
        }
        if layer == self.terminal_layer() {
            if self.node(nid).terminal_count > 0 {
                out.push(
                    self.dims()
                        .iter()
                        .cloned()
                        .zip(acc.iter().cloned())
                        .collect(),
                );
            }
            return;
        }
        let n = self.node(nid);
        match pattern.get(&self.dims()[layer]) {
            Some(want) => {
                if let Some(child) = n.child(want) {
                    acc.push(want.clone());
                    self.match_dfs(pattern, child, layer + 1, limit, acc, out);
                    acc.pop();
                }
            }
            None => {
                for label in n.sorted_labels() {
                    let child = n.child(label).expect("label from this node");
                    acc.push(label.clone());
                    self.match_dfs(pattern, child, layer + 1, limit, acc, out);
                    acc.pop();
                    if out.len() >= limit {
                        return;
                    }
                }
            }
        }
    }
}
