//! Nearest paths by A*
//!
//! Finds the `k` root-to-terminal paths minimizing the summed per-dimension
//! distance to a partial target. The caller supplies a distance function per
//! constrained dimension; unconstrained dimensions cost nothing, and a
//! constrained dimension without a function falls back to 0/1 mismatch.
//!
//! The accumulated log-probability of each path is tracked alongside the
//! distance and reported in `details` for hybrid ranking by callers.

use super::{Pattern, QueryResult};
use crate::node::NodeId;
use crate::store::Mdd;
use rustc_hash::FxHashMap;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use tabledd_core::error::QueryError;
use tabledd_core::Value;

const LOG_FLOOR: f64 = 1e-15;

/// Per-dimension distance: `(wanted, have) -> cost`. Costs must be
/// non-negative for the search to be admissible.
pub type DistanceFn = Box<dyn Fn(&Value, &Value) -> f64>;

/// Distance functions keyed by dimension name.
pub type DistanceFns = FxHashMap<String, DistanceFn>;

/// Admissible heuristic used to prioritize the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeuristicPolicy {
    /// h = 0. Always admissible.
    #[default]
    Zero,
    /// Greedy lower bound: the best single-arc cost per remaining layer,
    /// summed. Admissible when distances are non-negative and independent
    /// per dimension.
    PerLayerMin,
}

struct SearchState {
    f: f64,
    g: f64,
    neg_logp: f64,
    /// Insertion counter; makes tie-breaking stable and the ordering total.
    seq: u64,
    node: NodeId,
    labels: Vec<Value>,
}

impl PartialEq for SearchState {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for SearchState {}

impl PartialOrd for SearchState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchState {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f
            .total_cmp(&other.f)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl Mdd {
    /// `k` paths nearest to `partial` under the supplied distances, with the
    /// default zero heuristic. Score is the negated total distance (higher
    /// is better, matching `complete`).
    pub fn nearest(
        &self,
        partial: &Pattern,
        dist_fns: &DistanceFns,
        k: usize,
    ) -> Result<Vec<QueryResult>, QueryError> {
        self.nearest_with(partial, dist_fns, k, HeuristicPolicy::Zero)
    }

    /// `nearest` with an explicit heuristic policy.
    pub fn nearest_with(
        &self,
        partial: &Pattern,
        dist_fns: &DistanceFns,
        k: usize,
        heuristic: HeuristicPolicy,
    ) -> Result<Vec<QueryResult>, QueryError> {
        self.validate_pattern(partial, "nearest")?;
        if k < 1 {
            return Err(QueryError::InvalidArgument {
                operation: "nearest",
                field: "k",
                value: k.to_string(),
            });
        }
        let partial = self.bin_pattern(partial);
        let remaining = self.remaining_bounds(&partial, dist_fns, heuristic);

        let mut heap: BinaryHeap<Reverse<SearchState>> = BinaryHeap::new();
        let mut seq: u64 = 0;
        heap.push(Reverse(SearchState {
            f: remaining[0],
            g: 0.0,
            neg_logp: 0.0,
            seq,
            node: self.root(),
            labels: Vec::new(),
        }));

        let mut results = Vec::new();
        while let Some(Reverse(state)) = heap.pop() {
            if results.len() >= k {
                break;
            }
            let layer = self.node(state.node).layer;
            if layer == self.terminal_layer() {
                if self.node(state.node).terminal_count > 0 {
                    results.push(QueryResult {
                        path: self
                            .dims()
                            .iter()
                            .cloned()
                            .zip(state.labels.into_iter())
                            .collect(),
                        score: -state.g,
                        details: [
                            ("distance".to_string(), state.g),
                            ("logprob".to_string(), -state.neg_logp),
                        ]
                        .into_iter()
                        .collect(),
                    });
                }
                continue;
            }

            let dim = &self.dims()[layer];
            let want = partial.get(dim);
            let n = self.node(state.node);
            for label in n.sorted_labels() {
                let child = n.child(label).expect("label from this node");
                let step = step_cost(want, label, dist_fns.get(dim));
                let p = self.cond_prob(state.node, label).max(LOG_FLOOR);
                let g = state.g + step;
                seq += 1;
                let mut labels = state.labels.clone();
                labels.push(label.clone());
                heap.push(Reverse(SearchState {
                    f: g + remaining[layer + 1],
                    g,
                    neg_logp: state.neg_logp - p.ln(),
                    seq,
                    node: child,
                    labels,
                }));
            }
        }
        Ok(results)
    }

    /// `remaining[l]` lower-bounds the cost of any path from layer `l` to
    /// the terminal layer.
    fn remaining_bounds(
        &self,
        partial: &Pattern,
        dist_fns: &DistanceFns,
        heuristic: HeuristicPolicy,
    ) -> Vec<f64> {
        let depth = self.terminal_layer();
        let mut remaining = vec![0.0; depth + 1];
        if heuristic == HeuristicPolicy::Zero {
            return remaining;
        }
        for layer in (0..depth).rev() {
            let dim = &self.dims()[layer];
            let best = match partial.get(dim) {
                None => 0.0,
                Some(want) => {
                    let fn_ = dist_fns.get(dim);
                    let mut best = f64::INFINITY;
                    for (_, node) in self.nodes_at(layer) {
                        for label in node.edges.keys() {
                            best = best.min(step_cost(Some(want), label, fn_));
                        }
                    }
                    if best.is_finite() {
                        best
                    } else {
                        0.0
                    }
                }
            };
            remaining[layer] = remaining[layer + 1] + best;
        }
        remaining
    }
}

fn step_cost(want: Option<&Value>, have: &Value, fn_: Option<&DistanceFn>) -> f64 {
    match want {
        None => 0.0,
        Some(w) => match fn_ {
            Some(f) => f(w, have),
            None => {
                if w == have {
                    0.0
                } else {
                    1.0
                }
            }
        },
    }
}
