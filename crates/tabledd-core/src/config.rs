//! Build and query configuration

use crate::binning::BinConfig;
use serde::{Deserialize, Serialize};

/// How the dimension order is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderingStrategy {
    /// Use the caller-supplied order (or the schema order) unchanged.
    Fixed,
    /// Entropy + cardinality sort; cheap and usually good.
    #[default]
    Heuristic,
    /// Budgeted randomized local search starting from the heuristic order.
    Search,
}

/// How the diagram is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompileMethod {
    /// Build the full prefix trie, then reduce bottom-up.
    #[default]
    Trie,
    /// Incremental reduced construction; never materializes the trie.
    Slice,
}

/// Objective minimized by the ordering search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Sum over prefixes of distinct projected rows; cheap proxy for trie size.
    #[default]
    PrefixDistinctSum,
    /// Node count of a full compile per candidate.
    Nodes,
    /// Arc count of a full compile per candidate.
    Arcs,
    /// Nodes plus arcs of a full compile per candidate.
    NodesPlusArcs,
}

impl Objective {
    /// Whether evaluating this objective requires compiling the candidate.
    pub fn requires_compile(&self) -> bool {
        !matches!(self, Objective::PrefixDistinctSum)
    }
}

/// Budget and knobs for the ordering search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderingConfig {
    /// Wall-clock budget in seconds.
    pub time_budget_s: f64,
    /// Maximum number of candidate evaluations.
    pub max_evals: u32,
    /// Cap on compile-based evaluations (guards `Objective::Nodes` and kin).
    pub beam_width: u32,
    pub objective: Objective,
    pub seed: u64,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            time_budget_s: 2.0,
            max_evals: 100,
            beam_width: 8,
            objective: Objective::PrefixDistinctSum,
            seed: 0,
        }
    }
}

/// Top-level build configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    pub ordering: OrderingStrategy,
    pub ordering_config: OrderingConfig,
    pub compilation_method: CompileMethod,
    /// Bottom-up canonical merging after the trie build. Disabling it is
    /// only useful for inspection; the slice method is always reduced.
    pub enable_reduction: bool,
    /// Laplace smoothing for probability queries.
    pub laplace_alpha: f64,
    /// Fallback binning for numeric dimensions without their own config.
    pub default_numeric_bins: Option<BinConfig>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            ordering: OrderingStrategy::Heuristic,
            ordering_config: OrderingConfig::default(),
            compilation_method: CompileMethod::Trie,
            enable_reduction: true,
            laplace_alpha: 0.1,
            default_numeric_bins: None,
        }
    }
}

/// Defaults for query-side knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Beam width for `complete`.
    pub beam: usize,
    /// Result cap for `match_paths`.
    pub limit: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            beam: 25,
            limit: 1000,
        }
    }
}
