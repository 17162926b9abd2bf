//! Diagram storage
//!
//! [`Mdd`] owns the chosen dimension order, the node table, the root, the
//! terminal layer, the fitted bin models, and the smoothing parameter. It is
//! read-only once built; compilers work through the `pub(crate)` [`NodeStore`]
//! builder view and hand their node table to [`Mdd::from_parts`], which
//! compacts ids into layer-major order so iteration is stable.

use crate::node::{Edge, Node, NodeId};
use rustc_hash::FxHashMap;
use tabledd_core::{BinModel, Value};
use tracing::debug;

/// Aggregate statistics of a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagramSize {
    pub nodes: usize,
    pub arcs: usize,
    pub layers: usize,
}

/// A compiled multi-valued decision diagram over tabular data.
pub struct Mdd {
    dims: Vec<String>,
    nodes: Vec<Node>,
    root: NodeId,
    terminal_layer: usize,
    laplace_alpha: f64,
    bin_models: FxHashMap<String, BinModel>,
}

impl Mdd {
    /// Assemble a diagram from compiler output. Unreachable nodes are
    /// dropped and ids are reassigned in layer-major order.
    pub(crate) fn from_parts(
        dims: Vec<String>,
        nodes: Vec<Node>,
        root: NodeId,
        terminal_layer: usize,
        laplace_alpha: f64,
        bin_models: FxHashMap<String, BinModel>,
    ) -> Self {
        let before = nodes.len();
        let (nodes, root) = compact_layer_major(nodes, root, terminal_layer);
        debug!(
            nodes = nodes.len(),
            dropped = before - nodes.len(),
            layers = terminal_layer,
            "finalized diagram"
        );
        Self {
            dims,
            nodes,
            root,
            terminal_layer,
            laplace_alpha,
            bin_models,
        }
    }

    /// Dimension names in compilation order.
    #[inline]
    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Index of the terminal layer (equals the number of dimensions).
    #[inline]
    pub fn terminal_layer(&self) -> usize {
        self.terminal_layer
    }

    #[inline]
    pub fn laplace_alpha(&self) -> f64 {
        self.laplace_alpha
    }

    /// Fitted bin model for a numeric dimension, if any.
    pub fn bin_model(&self, dim: &str) -> Option<&BinModel> {
        self.bin_models.get(dim)
    }

    /// Get a node by id.
    ///
    /// # Panics
    /// Panics if the id is invalid.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    #[inline]
    pub fn try_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes on one layer, in id order.
    pub fn nodes_at(&self, layer: usize) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, n)| n.layer == layer)
            .map(|(i, n)| (i as NodeId, n))
    }

    /// Target of the arc labeled `label` out of `id`.
    pub fn child(&self, id: NodeId, label: &Value) -> Option<NodeId> {
        self.node(id).child(label)
    }

    /// Node, arc and layer counts.
    pub fn size(&self) -> DiagramSize {
        DiagramSize {
            nodes: self.nodes.len(),
            arcs: self.nodes.iter().map(|n| n.edges.len()).sum(),
            layers: self.terminal_layer,
        }
    }
}

impl std::fmt::Debug for Mdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let size = self.size();
        f.debug_struct("Mdd")
            .field("dims", &self.dims)
            .field("nodes", &size.nodes)
            .field("arcs", &size.arcs)
            .finish()
    }
}

/// Mutable node table used by the compilers.
#[derive(Debug, Default)]
pub(crate) struct NodeStore {
    pub nodes: Vec<Node>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Allocate a fresh node on `layer`.
    pub fn alloc(&mut self, layer: usize) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node::new(layer));
        id
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id as usize]
    }

    /// Add `delta` to the arc `from --label--> target`, creating it if absent.
    pub fn add_edge(&mut self, from: NodeId, label: Value, target: NodeId, delta: u64) {
        let entry = self.node_mut(from).edges.entry(label);
        let e = entry.or_insert(Edge { target, count: 0 });
        debug_assert_eq!(e.target, target, "arc label must be deterministic");
        e.count += delta;
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }
}

/// Drop nodes unreachable from `root` and renumber the rest in layer-major
/// order (layer ascending, original id order within a layer).
pub(crate) fn compact_layer_major(
    nodes: Vec<Node>,
    root: NodeId,
    terminal_layer: usize,
) -> (Vec<Node>, NodeId) {
    let mut reachable = vec![false; nodes.len()];
    let mut stack = vec![root];
    reachable[root as usize] = true;
    while let Some(id) = stack.pop() {
        for e in nodes[id as usize].edges.values() {
            if !reachable[e.target as usize] {
                reachable[e.target as usize] = true;
                stack.push(e.target);
            }
        }
    }

    let mut by_layer: Vec<Vec<NodeId>> = vec![Vec::new(); terminal_layer + 1];
    for (i, n) in nodes.iter().enumerate() {
        if reachable[i] {
            by_layer[n.layer].push(i as NodeId);
        }
    }

    let mut old_to_new = vec![NodeId::MAX; nodes.len()];
    let mut order: Vec<NodeId> = Vec::with_capacity(nodes.len());
    for layer in &by_layer {
        for &id in layer {
            old_to_new[id as usize] = order.len() as NodeId;
            order.push(id);
        }
    }

    let mut out = Vec::with_capacity(order.len());
    for old in order {
        let mut n = nodes[old as usize].clone();
        for e in n.edges.values_mut() {
            e.target = old_to_new[e.target as usize];
        }
        out.push(n);
    }
    (out, old_to_new[root as usize])
}
