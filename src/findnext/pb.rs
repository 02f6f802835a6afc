use crate::clue::Clue;
use crate::findnext::{Candidate, FindNextBackend};
use crate::graph::VertexId;
use crate::index::{DistanceTree, PivotIndex, TreeEntry};
use crate::label::TwoHopLabel;
use crate::trace::IndexStep;

use rustc_hash::FxHashSet;
use std::cell::RefCell;

/// PB-tree-backed `findNext` (spec.md §4.4): decomposes `d(u,v) = δ + δ'`
/// through shared pivots of `u`'s 2-hop label, probing each pivot's
/// PB-tree and verifying candidate decompositions against the label
/// index. Exploits `ub` to shrink the search window as better candidates
/// are found.
pub struct PbBackend<'a> {
    label: &'a TwoHopLabel,
    pivots: &'a PivotIndex,
    steps: RefCell<Vec<IndexStep>>,
}

impl<'a> PbBackend<'a> {
    pub fn new(label: &'a TwoHopLabel, pivots: &'a PivotIndex) -> Self {
        PbBackend {
            label,
            pivots,
            steps: RefCell::new(Vec::new()),
        }
    }

    /// Picks the entry in `tree` that lies closest to `upper` from below,
    /// within `[lower, upper]`, matching `w` and not in `excluded` - the
    /// PB-tree analogue of the AB-tree successor probe, bounded on both
    /// sides by the UB-derived window.
    fn windowed_successor<'t>(
        tree: &'t DistanceTree,
        lower: f64,
        upper: f64,
        w: &str,
        excluded: &FxHashSet<VertexId>,
    ) -> Option<&'t TreeEntry> {
        if upper < 0.0 {
            return None;
        }
        let hit = tree.largest_at_most(upper, w, excluded)?;
        (hit.distance >= lower).then_some(hit)
    }

    fn windowed_predecessor<'t>(
        tree: &'t DistanceTree,
        lower: f64,
        upper: f64,
        w: &str,
        excluded: &FxHashSet<VertexId>,
    ) -> Option<&'t TreeEntry> {
        Self::windowed_successor(tree, lower, upper, w, excluded)
    }
}

impl<'a> FindNextBackend for PbBackend<'a> {
    fn find_next(
        &self,
        u: VertexId,
        clue: &Clue,
        theta: f64,
        ub: f64,
        excluded: &FxHashSet<VertexId>,
    ) -> Option<Candidate> {
        let d = clue.distance;
        let eps = clue.tolerance;

        let l_d = d * (1.0 - eps) + theta;
        let r_d = d * (1.0 + eps) - theta;
        let mut l_b = (d - d * eps * ub).max(0.0);
        let mut r_b = d + d * eps * ub;

        let mut best: Option<Candidate> = None;

        for entry in self.label.label(u) {
            let delta = entry.distance;
            if delta > r_b {
                self.steps.borrow_mut().push(IndexStep::new(format!(
                    "pb: pivot {:?} at delta={delta:.3} exceeds rB={r_b:.3}, stopping",
                    entry.pivot
                )));
                break;
            }

            let Some(tree) = self.pivots.tree(entry.pivot) else {
                continue;
            };

            let l_do = l_d - delta;
            let r_do = r_d - delta;
            let l_bo = (l_b - delta).max(0.0);
            let r_bo = r_b - delta;

            if r_bo >= 0.0 && r_do <= r_bo {
                if let Some(hit) =
                    Self::windowed_successor(tree, r_do.max(0.0), r_bo, &clue.keyword, excluded)
                {
                    let total = delta + hit.distance;
                    if (self.label.label_distance(u, hit.vertex) - total).abs() <= 1e-3 {
                        let matching = clue.matching_distance(total);
                        self.steps.borrow_mut().push(IndexStep::new(format!(
                            "pb: successor via pivot {:?}: {:?} at {total:.3}m, m={matching:.3}",
                            entry.pivot, hit.vertex
                        )));
                        if best.map(|b| matching < b.matching).unwrap_or(true) {
                            best = Some(Candidate {
                                vertex: hit.vertex,
                                distance: total,
                                matching,
                            });
                            r_b = d + d * eps * matching;
                            l_b = (d - d * eps * matching).max(0.0);
                        }
                    }
                }
            }

            if let Some(hit) = Self::windowed_predecessor(tree, l_bo, l_do, &clue.keyword, excluded) {
                let total = delta + hit.distance;
                if (self.label.label_distance(u, hit.vertex) - total).abs() <= 1e-3 {
                    let matching = clue.matching_distance(total);
                    self.steps.borrow_mut().push(IndexStep::new(format!(
                        "pb: predecessor via pivot {:?}: {:?} at {total:.3}m, m={matching:.3}",
                        entry.pivot, hit.vertex
                    )));
                    if best.map(|b| matching < b.matching).unwrap_or(true) {
                        best = Some(Candidate {
                            vertex: hit.vertex,
                            distance: total,
                            matching,
                        });
                        r_b = d + d * eps * matching;
                        l_b = (d - d * eps * matching).max(0.0);
                    }
                }
            }
        }

        match best {
            Some(c) if c.matching >= theta => Some(c),
            Some(_) => {
                self.steps
                    .borrow_mut()
                    .push(IndexStep::new("pb: best candidate below theta"));
                None
            }
            None => {
                self.steps
                    .borrow_mut()
                    .push(IndexStep::new("pb: no candidate found"));
                None
            }
        }
    }

    fn take_index_steps(&self) -> Vec<IndexStep> {
        std::mem::take(&mut self.steps.borrow_mut())
    }
}
