//! Completion by beam search
//!
//! Ranks completions of a partial pattern by the cumulative log of
//! Laplace-smoothed conditional probabilities over the *free* dimensions.
//! Fixed dimensions steer the search but contribute nothing to the score,
//! so the result ranks `P(completion | partial)`.

use super::{Pattern, QueryResult};
use crate::node::NodeId;
use crate::store::Mdd;
use tabledd_core::error::QueryError;
use tabledd_core::Value;

const LOG_FLOOR: f64 = 1e-15;

#[derive(Debug, Clone)]
struct Candidate {
    neg_logp: f64,
    node: NodeId,
    labels: Vec<Value>,
}

impl Mdd {
    /// Top-`k` completions of `partial`, ranked by conditional
    /// log-probability. `beam` caps the number of partial candidates kept
    /// per layer. Returns an empty list when nothing is consistent with the
    /// pattern.
    pub fn complete(
        &self,
        partial: &Pattern,
        k: usize,
        beam: usize,
    ) -> Result<Vec<QueryResult>, QueryError> {
        self.validate_pattern(partial, "complete")?;
        if k < 1 {
            return Err(QueryError::InvalidArgument {
                operation: "complete",
                field: "k",
                value: k.to_string(),
            });
        }
        if beam < 1 {
            return Err(QueryError::InvalidArgument {
                operation: "complete",
                field: "beam",
                value: beam.to_string(),
            });
        }
        let partial = self.bin_pattern(partial);

        let mut beam_list = vec![Candidate {
            neg_logp: 0.0,
            node: self.root(),
            labels: Vec::new(),
        }];

        for layer in 0..self.terminal_layer() {
            let dim = &self.dims()[layer];
            let fixed = partial.get(dim);
            let mut next: Vec<Candidate> = Vec::new();

            for cand in &beam_list {
                let n = self.node(cand.node);
                match fixed {
                    // Fixed dimension: follow the matching arc (or die),
                    // without scoring it.
                    Some(want) => {
                        if let Some(child) = n.child(want) {
                            next.push(self.extend(cand, want, child, 0.0));
                        }
                    }
                    None => {
                        for label in n.sorted_labels() {
                            let child = n.child(label).expect("label from this node");
                            let p = self.cond_prob(cand.node, label).max(LOG_FLOOR);
                            next.push(self.extend(cand, label, child, -p.ln()));
                        }
                    }
                }
            }

            self.rank(&mut next);
            next.truncate(beam);
            beam_list = next;
            if beam_list.is_empty() {
                break;
            }
        }

        self.rank(&mut beam_list);
        let mut results = Vec::new();
        for cand in beam_list {
            if cand.labels.len() == self.terminal_layer()
                && self.node(cand.node).terminal_count > 0
            {
                let score = -cand.neg_logp;
                results.push(QueryResult {
                    path: self
                        .dims()
                        .iter()
                        .cloned()
                        .zip(cand.labels.into_iter())
                        .collect(),
                    score,
                    details: [("logprob".to_string(), score)].into_iter().collect(),
                });
                if results.len() >= k {
                    break;
                }
            }
        }
        Ok(results)
    }

    fn extend(&self, cand: &Candidate, label: &Value, child: NodeId, cost: f64) -> Candidate {
        let mut labels = cand.labels.clone();
        labels.push(label.clone());
        Candidate {
            neg_logp: cand.neg_logp + cost,
            node: child,
            labels,
        }
    }

    /// Best first: lowest negative log-probability, ties broken by
    /// descending reach, then lexicographic label order.
    fn rank(&self, candidates: &mut [Candidate]) {
        candidates.sort_by(|a, b| {
            a.neg_logp
                .total_cmp(&b.neg_logp)
                .then_with(|| {
                    self.node(b.node)
                        .reach_count
                        .cmp(&self.node(a.node).reach_count)
                })
                .then_with(|| a.labels.cmp(&b.labels))
        });
    }
}
