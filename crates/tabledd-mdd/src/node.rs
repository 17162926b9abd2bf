//! Diagram nodes
//!
//! Each node sits on a layer and owns its outgoing arcs: a label → (target,
//! count) map. `reach_count` is the number of input rows passing through the
//! node; `terminal_count` is the number of rows ending at it (non-zero only
//! on the terminal layer).

use crate::row::FxIndexMap;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use tabledd_core::Value;

/// Node identifier within one diagram.
pub type NodeId = u32;

/// An outgoing arc: target node plus the number of rows that traversed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub target: NodeId,
    pub count: u64,
}

/// A node of the layered diagram.
#[derive(Debug, Clone)]
pub struct Node {
    pub layer: usize,
    /// Label → arc. Insertion-ordered; traversals that need label order sort
    /// explicitly.
    pub edges: FxIndexMap<Value, Edge>,
    pub reach_count: u64,
    pub terminal_count: u64,
}

impl Node {
    pub(crate) fn new(layer: usize) -> Self {
        Self {
            layer,
            edges: IndexMap::with_hasher(FxBuildHasher),
            reach_count: 0,
            terminal_count: 0,
        }
    }

    /// Target of the arc labeled `label`, if present.
    #[inline]
    pub fn child(&self, label: &Value) -> Option<NodeId> {
        self.edges.get(label).map(|e| e.target)
    }

    /// Count on the arc labeled `label`; zero when absent.
    #[inline]
    pub fn edge_count(&self, label: &Value) -> u64 {
        self.edges.get(label).map(|e| e.count).unwrap_or(0)
    }

    /// Number of distinct outgoing labels.
    #[inline]
    pub fn arity(&self) -> usize {
        self.edges.len()
    }

    /// Sum of all outgoing arc counts.
    pub fn out_count(&self) -> u64 {
        self.edges.values().map(|e| e.count).sum()
    }

    /// Outgoing labels in sorted order, for deterministic traversal.
    pub fn sorted_labels(&self) -> Vec<&Value> {
        let mut labels: Vec<&Value> = self.edges.keys().collect();
        labels.sort();
        labels
    }

    /// Structural signature used for canonical merging. Arc counts and reach
    /// counts are excluded; they aggregate when nodes merge.
    pub(crate) fn signature(&self) -> Signature {
        let mut edges: SmallVec<[(Value, NodeId); 4]> = self
            .edges
            .iter()
            .map(|(label, e)| (label.clone(), e.target))
            .collect();
        edges.sort_by(|a, b| a.0.cmp(&b.0));
        Signature {
            layer: self.layer,
            terminal_count: self.terminal_count,
            edges,
        }
    }
}

/// Canonical structural identity of a node: layer, terminal tally, and the
/// sorted (label, target) pairs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Signature {
    pub layer: usize,
    pub terminal_count: u64,
    pub edges: SmallVec<[(Value, NodeId); 4]>,
}
