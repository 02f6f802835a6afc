#![doc = "The `findNext` primitive (spec.md §4.5/§4.6): three interchangeable backends - linear scan, AB-tree, PB-tree - sharing one interface."]

mod ab;
mod linear;
mod pb;

#[cfg(test)]
mod test;

pub use ab::AbBackend;
pub use linear::LinearBackend;
pub use pb::PbBackend;

use crate::clue::Clue;
use crate::graph::VertexId;
use crate::trace::IndexStep;

use rustc_hash::FxHashSet;

/// A candidate returned by a `findNext` backend: the chosen vertex, the
/// observed network distance `d(u,v)`, and its matching distance against
/// the clue.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Candidate {
    pub vertex: VertexId,
    pub distance: f64,
    pub matching: f64,
}

/// Shared interface over the three `findNext` implementations (spec.md
/// §4.5/§9: "no runtime type hierarchy needed", just a small capability
/// interface). Each backend owns its own index-step trace buffer and
/// drains it via [`FindNextBackend::take_index_steps`] once its caller has
/// copied the contents into its own trace entry.
pub trait FindNextBackend {
    /// Finds one candidate `v` with `clue.keyword`, `d(u,v)` in the
    /// clue's confidence interval, matching distance `>= theta`, not in
    /// `excluded`, and as small a matching distance as possible - subject
    /// to whatever pruning the backend can bring to bear given `ub`.
    fn find_next(
        &self,
        u: VertexId,
        clue: &Clue,
        theta: f64,
        ub: f64,
        excluded: &FxHashSet<VertexId>,
    ) -> Option<Candidate>;

    /// Drains and returns the sub-steps recorded since the last call.
    fn take_index_steps(&self) -> Vec<IndexStep>;
}
