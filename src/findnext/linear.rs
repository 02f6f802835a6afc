use crate::clue::Clue;
use crate::findnext::{Candidate, FindNextBackend};
use crate::graph::{Graph, VertexId};
use crate::trace::IndexStep;

use rustc_hash::FxHashSet;
use std::cell::RefCell;

/// The correctness baseline (spec.md §4.5): scan every vertex carrying the
/// clue's keyword, keep the argmin of matching distance among candidates
/// that pass the interval, theta, and exclusion filters.
pub struct LinearBackend<'a> {
    graph: &'a Graph,
    steps: RefCell<Vec<IndexStep>>,
}

impl<'a> LinearBackend<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        LinearBackend {
            graph,
            steps: RefCell::new(Vec::new()),
        }
    }
}

impl<'a> FindNextBackend for LinearBackend<'a> {
    fn find_next(
        &self,
        u: VertexId,
        clue: &Clue,
        theta: f64,
        _ub: f64,
        excluded: &FxHashSet<VertexId>,
    ) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;

        for v in self.graph.vertices_with_keyword(&clue.keyword) {
            if excluded.contains(&v) {
                continue;
            }

            let distance = self.graph.network_distance(u, v);
            if !clue.in_interval(distance) {
                continue;
            }

            let matching = clue.matching_distance(distance);
            self.steps.borrow_mut().push(IndexStep::new(format!(
                "linear: candidate {v:?} at {distance:.3}m, m={matching:.3}"
            )));

            if best.map(|b| matching < b.matching).unwrap_or(true) {
                best = Some(Candidate {
                    vertex: v,
                    distance,
                    matching,
                });
            }
        }

        match best {
            Some(c) if c.matching >= theta => Some(c),
            Some(_) => {
                self.steps
                    .borrow_mut()
                    .push(IndexStep::new("linear: best candidate below theta"));
                None
            }
            None => {
                self.steps
                    .borrow_mut()
                    .push(IndexStep::new("linear: no candidate in interval"));
                None
            }
        }
    }

    fn take_index_steps(&self) -> Vec<IndexStep> {
        std::mem::take(&mut self.steps.borrow_mut())
    }
}
