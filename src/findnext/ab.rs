use crate::clue::Clue;
use crate::findnext::{Candidate, FindNextBackend};
use crate::graph::{Graph, VertexId};
use crate::index::{AbTree, TreeEntry};
use crate::trace::IndexStep;

use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::rc::Rc;

/// AB-tree-backed `findNext` (spec.md §4.2 steps 4-5). Does not exploit
/// `ub` - it returns the same interval-bound result a linear scan would
/// (argmin matching distance over the interval), just found via a bounded
/// leaf-chain range scan instead of a full vertex scan.
///
/// AB-trees are keyed by whichever vertex is acting as the current anchor
/// (not only the query's original source - every solver step calls
/// `find_next` from whatever vertex it is currently standing on), so this
/// backend keeps its own build-once-per-anchor cache, shared with the
/// owning [`crate::session::Session`] via `cache`.
pub struct AbBackend<'a> {
    graph: &'a Graph,
    order: usize,
    cache: &'a RefCell<FxHashMap<VertexId, Rc<AbTree>>>,
    steps: RefCell<Vec<IndexStep>>,
}

impl<'a> AbBackend<'a> {
    pub fn new(graph: &'a Graph, order: usize, cache: &'a RefCell<FxHashMap<VertexId, Rc<AbTree>>>) -> Self {
        AbBackend {
            graph,
            order,
            cache,
            steps: RefCell::new(Vec::new()),
        }
    }

    fn tree_for(&self, source: VertexId) -> Option<Rc<AbTree>> {
        if let Some(tree) = self.cache.borrow().get(&source) {
            return Some(tree.clone());
        }

        let tree = Rc::new(AbTree::build(self.graph, source, self.order).ok()?);
        self.cache.borrow_mut().insert(source, tree.clone());
        Some(tree)
    }
}

impl<'a> FindNextBackend for AbBackend<'a> {
    fn find_next(
        &self,
        u: VertexId,
        clue: &Clue,
        theta: f64,
        _ub: f64,
        excluded: &FxHashSet<VertexId>,
    ) -> Option<Candidate> {
        let tree = self.tree_for(u)?;

        let l_d = clue.lower_bound();
        let r_d = clue.upper_bound();

        // Argmin matching distance over the whole [lD, rD] window, not just
        // the two boundary entries - a bounded range scan over the leaf
        // chain, equivalent in result to the linear backend's full scan.
        let mut best: Option<(&TreeEntry, f64)> = None;
        for entry in tree.range(l_d, r_d, &clue.keyword) {
            if excluded.contains(&entry.vertex) {
                continue;
            }
            let matching = clue.matching_distance(entry.distance);
            if best.map(|(_, m)| matching < m).unwrap_or(true) {
                best = Some((entry, matching));
            }
        }

        self.steps.borrow_mut().push(IndexStep::new(format!(
            "ab: range-scan over [{l_d:.3},{r_d:.3}] -> {:?}",
            best.map(|(e, _)| e.vertex),
        )));

        let Some((chosen, matching)) = best else {
            self.steps
                .borrow_mut()
                .push(IndexStep::new("ab: no entry found in interval"));
            return None;
        };

        if matching >= theta {
            Some(Candidate {
                vertex: chosen.vertex,
                distance: chosen.distance,
                matching,
            })
        } else {
            self.steps
                .borrow_mut()
                .push(IndexStep::new("ab: chosen candidate below theta"));
            None
        }
    }

    fn take_index_steps(&self) -> Vec<IndexStep> {
        std::mem::take(&mut self.steps.borrow_mut())
    }
}
