//! Trie compilation and bottom-up reduction
//!
//! Phase 1 inserts every row as a root-to-terminal path, counting traversals
//! on each arc and node. Phase 2 merges structurally equivalent nodes layer
//! by layer from the terminals upward: nodes with the same signature denote
//! the same residual language, so they collapse into one representative whose
//! reach and arc counts aggregate the group.

use crate::node::{Edge, Node, NodeId, Signature};
use crate::store::NodeStore;
use rustc_hash::FxHashMap;
use tabledd_core::Value;
use tracing::debug;

/// Build the unreduced prefix trie. Rows must already be projected through
/// the chosen dimension order and binned; each row has exactly `depth`
/// labels. The root is node 0.
pub(crate) fn build_trie(rows: &[Vec<Value>], depth: usize) -> NodeStore {
    let mut store = NodeStore::new();
    let root = store.alloc(0);

    for row in rows {
        debug_assert_eq!(row.len(), depth);
        let mut nid = root;
        store.node_mut(nid).reach_count += 1;
        for (layer, label) in row.iter().enumerate() {
            let child = match store.node(nid).child(label) {
                Some(c) => c,
                None => store.alloc(layer + 1),
            };
            store.add_edge(nid, label.clone(), child, 1);
            nid = child;
            store.node_mut(nid).reach_count += 1;
        }
        store.node_mut(nid).terminal_count += 1;
    }
    store
}

/// Bottom-up canonical reduction.
///
/// Processes layers from the terminal layer down to the root, grouping nodes
/// by [`Signature`] (which excludes counts) and merging each group into one
/// representative. Returns the new node table (orphan-free, in reverse-layer
/// creation order; callers renumber layer-major) and the new root id.
pub(crate) fn reduce(nodes: Vec<Node>, terminal_layer: usize) -> (Vec<Node>, NodeId) {
    let mut by_layer: Vec<Vec<NodeId>> = vec![Vec::new(); terminal_layer + 1];
    for (i, n) in nodes.iter().enumerate() {
        by_layer[n.layer].push(i as NodeId);
    }

    // old trie id -> new node id
    let mut old_to_new: Vec<NodeId> = vec![NodeId::MAX; nodes.len()];
    let mut new_nodes: Vec<Node> = Vec::new();
    // new node id -> old trie ids merged into it
    let mut members: Vec<Vec<NodeId>> = Vec::new();
    let mut sig_map: FxHashMap<Signature, NodeId> = FxHashMap::default();

    for layer in (0..=terminal_layer).rev() {
        sig_map.clear();
        for &nid in &by_layer[layer] {
            let n = &nodes[nid as usize];

            // Remap children to new ids; layers below are already processed.
            let mut remapped = Node::new(layer);
            remapped.terminal_count = n.terminal_count;
            for (label, e) in &n.edges {
                // Labels stay distinct under remapping even when several of
                // them now share a canonical target.
                remapped.edges.insert(
                    label.clone(),
                    Edge {
                        target: old_to_new[e.target as usize],
                        count: 0,
                    },
                );
            }

            let sig = remapped.signature();
            match sig_map.get(&sig) {
                Some(&rep) => {
                    old_to_new[nid as usize] = rep;
                    members[rep as usize].push(nid);
                }
                None => {
                    let rep = new_nodes.len() as NodeId;
                    sig_map.insert(sig, rep);
                    old_to_new[nid as usize] = rep;
                    new_nodes.push(remapped);
                    members.push(vec![nid]);
                }
            }
        }
    }

    // Aggregate reach and arc counts across each group.
    for (rep, olds) in members.iter().enumerate() {
        let new_node = &mut new_nodes[rep];
        for &old in olds {
            let old_node = &nodes[old as usize];
            new_node.reach_count += old_node.reach_count;
            for (label, e) in &old_node.edges {
                new_node.edges[label].count += e.count;
            }
        }
    }

    let merged = nodes.len() - new_nodes.len();
    debug!(
        before = nodes.len(),
        after = new_nodes.len(),
        merged,
        "reduction finished"
    );

    let root = old_to_new[0];
    (new_nodes, root)
}
