//! # tabledd-mdd
//!
//! Compressed Multi-valued Decision Diagrams (MDDs) over tabular data.
//!
//! A table of rows over a fixed set of dimensions compiles into a layered,
//! labeled DAG whose root-to-terminal paths are exactly the input rows
//! (modulo numeric binning). Structurally equivalent subtrees share storage,
//! so repetitive tables collapse to a fraction of their row count, while
//! per-arc traversal counts keep the full multiset of rows recoverable.
//!
//! ## Example
//!
//! ```
//! use tabledd_core::{Dimension, DimensionType, Schema};
//! use tabledd_mdd::{Builder, Pattern, Row};
//!
//! let schema = Schema::new(vec![
//!     Dimension::new("region", DimensionType::Categorical),
//!     Dimension::new("priority", DimensionType::Ordinal),
//! ]);
//! let rows = vec![
//!     Row::new().with("region", "EU").with("priority", 1i64),
//!     Row::new().with("region", "EU").with("priority", 2i64),
//!     Row::new().with("region", "US").with("priority", 1i64),
//! ];
//!
//! let mdd = Builder::new(schema).fit(&rows).unwrap();
//!
//! // Count rows matching a partial pattern without enumerating them.
//! let mut want = Pattern::new();
//! want.insert("region".into(), "EU".into());
//! assert_eq!(mdd.count(&want).unwrap(), 2);
//!
//! // Rank completions of the same partial pattern.
//! let completions = mdd.complete(&want, 2, 25).unwrap();
//! assert_eq!(completions.len(), 2);
//! ```
//!
//! ## Key operations
//!
//! - [`Builder::fit`] - compile rows into a reduced diagram (trie+reduce or
//!   incremental slice compilation)
//! - [`Mdd::exists`] - O(depth) exact membership
//! - [`Mdd::count`] - memoized pattern counting without enumeration
//! - [`Mdd::match_paths`] - bounded enumeration of matching paths
//! - [`Mdd::complete`] - top-k completions by smoothed conditional probability
//! - [`Mdd::nearest`] - k nearest paths under caller-supplied distances
//! - [`Mdd::iter_nodes`] / [`Mdd::to_dot`] - read-only traversal for renderers

pub mod builder;
mod debug;
pub mod iter;
pub mod node;
pub mod ordering;
pub mod query;
pub mod row;
mod slice;
pub mod store;
mod trie;

pub use builder::{BuildError, Builder};
pub use iter::{NodeIter, NodeView};
pub use node::{Edge, Node, NodeId};
pub use ordering::OrderEval;
pub use query::{DistanceFn, DistanceFns, HeuristicPolicy, Pattern, QueryResult};
pub use row::{FxIndexMap, Row};
pub use store::{DiagramSize, Mdd};
