//! Debug utilities
//!
//! DOT export for Graphviz and a text dump for small diagrams.

use crate::store::Mdd;
use std::fmt::Write;

impl Mdd {
    /// Export the diagram to DOT format.
    ///
    /// Nodes are grouped by rank per layer; arcs are labeled
    /// `label (count)`. Render with `dot -Tpng mdd.dot -o mdd.png`.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        writeln!(out, "digraph MDD {{").unwrap();
        writeln!(out, "  rankdir=TB;").unwrap();
        writeln!(out, "  node [shape=circle];").unwrap();
        writeln!(out).unwrap();

        for view in self.iter_nodes() {
            if view.layer() == self.terminal_layer() {
                writeln!(
                    out,
                    "  N{} [shape=box, label=\"⊤ {}\", style=filled, fillcolor=lightgreen];",
                    view.id,
                    view.terminal_count()
                )
                .unwrap();
            } else {
                writeln!(out, "  N{} [label=\"{}\"];", view.id, view.reach_count()).unwrap();
            }
        }
        writeln!(out).unwrap();

        for view in self.iter_nodes() {
            let node = self.node(view.id);
            for label in node.sorted_labels() {
                let e = &node.edges[label];
                writeln!(
                    out,
                    "  N{} -> N{} [label=\"{} ({})\"];",
                    view.id, e.target, label, e.count
                )
                .unwrap();
            }
        }

        writeln!(out, "}}").unwrap();
        out
    }

    /// Print a text summary of the diagram structure.
    ///
    /// Useful for debugging small diagrams.
    pub fn dump(&self) -> String {
        let size = self.size();
        let mut out = String::new();
        writeln!(
            out,
            "MDD (dims={:?}, {} nodes, {} arcs)",
            self.dims(),
            size.nodes,
            size.arcs
        )
        .unwrap();
        for layer in 0..=self.terminal_layer() {
            writeln!(out, "  layer {}:", layer).unwrap();
            for (id, node) in self.nodes_at(layer) {
                let mut arcs = String::new();
                for label in node.sorted_labels() {
                    let e = &node.edges[label];
                    write!(arcs, " {}({})->N{}", label, e.count, e.target).unwrap();
                }
                writeln!(
                    out,
                    "    N{} reach={} terminal={}{}",
                    id, node.reach_count, node.terminal_count, arcs
                )
                .unwrap();
            }
        }
        out
    }
}
