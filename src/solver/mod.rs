#![doc = "The three solvers - GCS, CDP, BAB - sharing a `Solver` capability and the `SearchResult` wire type (spec.md §4.6-§4.10)."]

mod bab;
mod cdp;
mod gcs;


pub use bab::BabSolver;
pub use cdp::CdpSolver;
pub use gcs::GcsSolver;

use crate::clue::Query;
use crate::graph::VertexId;
use crate::trace::Trace;

use serde::{Deserialize, Serialize};

/// The outcome of a solver run (spec.md §3/§6). Infeasibility, iteration
/// caps, and cancellation are all represented here rather than as errors -
/// spec.md §7 is explicit that these are successful results, not failures.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResult {
    pub best_path: Vec<VertexId>,
    pub best_matching_distance: f64,
    pub trace: Trace,
    pub execution_time_ms: u64,
    pub iterations: u64,
    pub index_build_time_ms: Option<u64>,
}

impl SearchResult {
    pub fn infeasible(trace: Trace) -> Self {
        SearchResult {
            best_path: Vec::new(),
            best_matching_distance: f64::INFINITY,
            trace,
            execution_time_ms: 0,
            iterations: 0,
            index_build_time_ms: None,
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.best_matching_distance.is_finite()
    }
}

/// Shared solver capability (spec.md §9: "no runtime type hierarchy
/// needed" - an explicit trait with concrete variants, not inheritance).
pub trait Solver {
    fn solve(&self, query: &Query) -> SearchResult;
}
