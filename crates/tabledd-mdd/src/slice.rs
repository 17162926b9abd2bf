//! Incremental reduced compilation
//!
//! Builds the canonical diagram without materializing the trie. Labeled rows
//! are processed in sorted order, so all rows sharing a prefix are adjacent:
//! the current root-to-terminal path is kept private (the *active path*), and
//! whenever the next row diverges at depth `p`, the tail below `p` is frozen
//! bottom-up into per-layer signature intern tables, merged into an existing
//! canonical node when one matches, interned as a new canonical node
//! otherwise. Peak memory tracks the reduced size plus one path.
//!
//! The result is identical (up to id renaming) to trie construction followed
//! by bottom-up reduction: the canonical output does not depend on row order,
//! and freezing a node only after every row through its prefix has been seen
//! aggregates exactly the counts the reducer would.

use crate::node::{NodeId, Signature};
use crate::store::NodeStore;
use rustc_hash::FxHashMap;
use tabledd_core::Value;

/// Compile sorted rows into a reduced node table. Rows must already be
/// projected through the chosen dimension order; each has `depth` labels.
/// Returns the table (orphans included; callers compact) and the root id.
pub(crate) fn compile_slice(rows: &[Vec<Value>], depth: usize) -> (Vec<crate::node::Node>, NodeId) {
    let mut sorted: Vec<&Vec<Value>> = rows.iter().collect();
    sorted.sort();

    let mut store = NodeStore::new();
    let root = store.alloc(0);

    // layer -> signature -> canonical node id (layer 0 holds only the root)
    let mut sig_index: Vec<FxHashMap<Signature, NodeId>> =
        (0..=depth).map(|_| FxHashMap::default()).collect();

    // path[l] is the node at layer l on the active path
    let mut path: Vec<NodeId> = vec![root];
    let mut prev: Option<&Vec<Value>> = None;

    for row in sorted {
        debug_assert_eq!(row.len(), depth);
        let p = match prev {
            None => 0,
            Some(pr) => common_prefix_len(pr, row),
        };
        if let Some(pr) = prev {
            freeze_tail(&mut store, &mut sig_index, &mut path, pr, p);
        }

        // Shared prefix: bump the existing arcs and nodes.
        store.node_mut(root).reach_count += 1;
        for layer in 1..=p {
            let parent = path[layer - 1];
            store.node_mut(parent).edges[&row[layer - 1]].count += 1;
            let id = path[layer];
            store.node_mut(id).reach_count += 1;
        }

        // Fresh suffix: a private chain down to the terminal.
        for layer in p + 1..=depth {
            let id = store.alloc(layer);
            let parent = path[layer - 1];
            store.add_edge(parent, row[layer - 1].clone(), id, 1);
            store.node_mut(id).reach_count = 1;
            path.push(id);
        }
        store.node_mut(path[depth]).terminal_count += 1;
        prev = Some(row);
    }

    if let Some(pr) = prev {
        freeze_tail(&mut store, &mut sig_index, &mut path, pr, 0);
    }

    (store.into_nodes(), root)
}

/// Canonicalize the active path bottom-up, leaving layers `0..=keep` active.
///
/// Children are frozen before their parents, so every signature is computed
/// over canonical child ids. A merged-away node keeps its storage slot but
/// loses its only in-arc, so compaction drops it.
fn freeze_tail(
    store: &mut NodeStore,
    sig_index: &mut [FxHashMap<Signature, NodeId>],
    path: &mut Vec<NodeId>,
    prev_row: &[Value],
    keep: usize,
) {
    while path.len() > keep + 1 {
        let layer = path.len() - 1;
        let id = path[layer];
        let sig = store.node(id).signature();
        match sig_index[layer].get(&sig) {
            Some(&canon) => {
                // Same residual language: fold counts into the canonical
                // node. Terminal tallies are equal by signature and are not
                // summed; reach and arc counts aggregate.
                let reach = store.node(id).reach_count;
                let edge_counts: Vec<(Value, u64)> = store
                    .node(id)
                    .edges
                    .iter()
                    .map(|(label, e)| (label.clone(), e.count))
                    .collect();
                let canon_node = store.node_mut(canon);
                canon_node.reach_count += reach;
                for (label, count) in edge_counts {
                    canon_node.edges[&label].count += count;
                }

                let parent = path[layer - 1];
                store.node_mut(parent).edges[&prev_row[layer - 1]].target = canon;
            }
            None => {
                sig_index[layer].insert(sig, id);
            }
        }
        path.pop();
    }
}

fn common_prefix_len(a: &[Value], b: &[Value]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}
