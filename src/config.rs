//! Session configuration (spec.md §6): tunables governing index
//! construction, iteration caps, and trace verbosity.

use crate::label::PivotOrder;
use crate::trace::TraceMode;

/// Tunable options for a [`crate::session::Session`].
pub struct SessionConfig {
    /// Safety bound on BAB/CDP iterations (spec.md §4.8/§5).
    pub max_iterations: u64,
    /// If true, the AB-tree and PB-tree/label are built on first use
    /// rather than eagerly at session construction.
    pub build_indices_lazily: bool,
    /// Fan-out bound for AB-trees.
    pub ab_tree_order: usize,
    /// Fan-out bound for PB-trees.
    pub pb_tree_order: usize,
    /// Pivot selection/ordering for the 2-hop label.
    pub label_pivot_order: PivotOrder,
    /// Absolute tolerance used by `on_shortest_path` and PB-tree
    /// decomposition verification (spec.md §9 - never `==` on distances).
    pub distance_tolerance_epsilon: f64,
    /// How much trace detail solvers should record.
    pub trace_mode: TraceMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            max_iterations: 10_000,
            build_indices_lazily: true,
            ab_tree_order: 32,
            pb_tree_order: 32,
            label_pivot_order: PivotOrder::DegreeDesc,
            distance_tolerance_epsilon: 1e-3,
            trace_mode: TraceMode::Summary,
        }
    }
}
