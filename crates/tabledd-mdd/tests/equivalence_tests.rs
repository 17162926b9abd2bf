//! Property tests: the two compilation methods agree, and every diagram
//! satisfies the structural and counting laws.

use proptest::prelude::*;
use rustc_hash::FxHashMap;
use tabledd_core::{
    BuildConfig, CompileMethod, Dimension, DimensionType, OrderingStrategy, Schema, Value,
};
use tabledd_mdd::{Builder, Mdd, NodeId, Pattern, Row};

fn schema3() -> Schema {
    Schema::new(vec![
        Dimension::new("a", DimensionType::Categorical),
        Dimension::new("b", DimensionType::Categorical),
        Dimension::new("c", DimensionType::Categorical),
    ])
}

fn build(rows: &[Row], method: CompileMethod) -> Mdd {
    Builder::new(schema3())
        .with_config(BuildConfig {
            ordering: OrderingStrategy::Fixed,
            compilation_method: method,
            ..BuildConfig::default()
        })
        .fit(rows)
        .unwrap()
}

/// Recursive structural fingerprint including arc counts, reach and terminal
/// tallies; identical fingerprints mean identical diagrams up to id renaming.
fn fingerprint(mdd: &Mdd, id: NodeId, memo: &mut FxHashMap<NodeId, String>) -> String {
    if let Some(s) = memo.get(&id) {
        return s.clone();
    }
    let node = mdd.node(id);
    let arcs: Vec<String> = node
        .sorted_labels()
        .into_iter()
        .map(|label| {
            let e = &node.edges[label];
            format!("{}#{}=>{}", label, e.count, fingerprint(mdd, e.target, memo))
        })
        .collect();
    let s = format!(
        "(r{} t{} [{}])",
        node.reach_count,
        node.terminal_count,
        arcs.join(",")
    );
    memo.insert(id, s.clone());
    s
}

fn arbitrary_rows() -> impl Strategy<Value = Vec<Row>> {
    let cell = prop_oneof![Just("u"), Just("v"), Just("w")];
    prop::collection::vec((cell.clone(), cell.clone(), cell), 0..24).prop_map(|tuples| {
        tuples
            .into_iter()
            .map(|(a, b, c)| Row::new().with("a", a).with("b", b).with("c", c))
            .collect()
    })
}

proptest! {
    /// Trie+reduce and slice compilation produce identical diagrams:
    /// same size, same per-arc counts, same shape up to id renaming.
    #[test]
    fn methods_are_equivalent(rows in arbitrary_rows()) {
        let trie = build(&rows, CompileMethod::Trie);
        let slice = build(&rows, CompileMethod::Slice);

        prop_assert_eq!(trie.size(), slice.size());

        let mut memo_t = FxHashMap::default();
        let mut memo_s = FxHashMap::default();
        prop_assert_eq!(
            fingerprint(&trie, trie.root(), &mut memo_t),
            fingerprint(&slice, slice.root(), &mut memo_s)
        );
    }

    /// Every input row exists; the total count equals the input size.
    #[test]
    fn path_fidelity(rows in arbitrary_rows()) {
        for method in [CompileMethod::Trie, CompileMethod::Slice] {
            let mdd = build(&rows, method);
            prop_assert_eq!(mdd.count(&Pattern::new()).unwrap(), rows.len() as u64);
            for row in &rows {
                let full: Pattern = row
                    .fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                prop_assert!(mdd.exists(&full).unwrap());
            }
            let hits = mdd.match_paths(&Pattern::new(), 10_000).unwrap();
            for hit in &hits {
                prop_assert!(mdd.exists(hit).unwrap());
            }
        }
    }

    /// Arc-level conservation and the probability law hold at every node.
    #[test]
    fn counting_laws(rows in arbitrary_rows()) {
        let mdd = build(&rows, CompileMethod::Trie);
        prop_assert_eq!(mdd.node(mdd.root()).reach_count, rows.len() as u64);
        for view in mdd.iter_nodes() {
            let node = mdd.node(view.id);
            if node.layer < mdd.terminal_layer() {
                prop_assert_eq!(node.out_count(), node.reach_count);
                if node.reach_count > 0 {
                    let sum: f64 = node
                        .edges
                        .keys()
                        .map(|label| {
                            let n = node.edge_count(label) as f64;
                            let alpha = mdd.laplace_alpha();
                            (n + alpha)
                                / (node.out_count() as f64 + alpha * node.arity() as f64)
                        })
                        .sum();
                    prop_assert!((sum - 1.0).abs() < 1e-9);
                }
            }
            for (_, child, _) in view.edges() {
                prop_assert_eq!(mdd.node(child).layer, view.layer() + 1);
            }
        }
    }

    /// Counting by pattern equals brute-force counting over the input rows.
    #[test]
    fn count_agrees_with_brute_force(
        rows in arbitrary_rows(),
        fix_a in prop::option::of(prop_oneof![Just("u"), Just("v")]),
        fix_c in prop::option::of(prop_oneof![Just("u"), Just("w")]),
    ) {
        let mdd = build(&rows, CompileMethod::Slice);
        let mut pattern = Pattern::new();
        if let Some(a) = fix_a {
            pattern.insert("a".to_string(), Value::from(a));
        }
        if let Some(c) = fix_c {
            pattern.insert("c".to_string(), Value::from(c));
        }
        let brute = rows
            .iter()
            .filter(|row| {
                pattern
                    .iter()
                    .all(|(dim, want)| row.get(dim) == Some(want))
            })
            .count() as u64;
        prop_assert_eq!(mdd.count(&pattern).unwrap(), brute);
    }
}
