//! Per-source AB-tree (spec.md §4.2): answers predecessor/successor
//! queries on the distance-from-`s` axis, filtered by keyword, with
//! distance-range gating.

use crate::graph::{Graph, VertexId};
use crate::index::btree::{DistanceTree, RangeIter, TreeEntry};
use crate::index::IndexError;

use rustc_hash::FxHashSet;

pub struct AbTree {
    source: VertexId,
    tree: DistanceTree,
}

impl AbTree {
    /// Builds the AB-tree for `source`: runs `all_distances_from(source)`,
    /// emits one entry per reachable, non-source vertex with a non-empty
    /// keyword set, and bulk-loads a [`DistanceTree`] of the given order.
    pub fn build(graph: &Graph, source: VertexId, order: usize) -> Result<Self, IndexError> {
        let distances = graph.all_distances_from(source);

        let entries: Vec<TreeEntry> = distances
            .into_iter()
            .filter(|&(v, _)| v != source)
            .filter_map(|(v, distance)| {
                let vertex = graph.vertex(v)?;
                if vertex.keywords().next().is_none() {
                    return None;
                }
                Some(TreeEntry {
                    distance,
                    vertex: v,
                    keywords: vertex.keywords().cloned().collect(),
                })
            })
            .collect();

        let tree = DistanceTree::build(entries, order)?;
        Ok(AbTree { source, tree })
    }

    pub fn source(&self) -> VertexId {
        self.source
    }

    /// Largest distance `<= lD` with keyword `w`, excluding `excluded`.
    pub fn predecessor(&self, l_d: f64, w: &str, excluded: &FxHashSet<VertexId>) -> Option<&TreeEntry> {
        self.tree.largest_at_most(l_d, w, excluded)
    }

    /// Largest distance `<= rD` with keyword `w`, excluding `excluded`
    /// (spec.md §4.2/§9: kept as the reference behaves, not "fixed" to a
    /// conventional ascending successor).
    pub fn successor(&self, r_d: f64, w: &str, excluded: &FxHashSet<VertexId>) -> Option<&TreeEntry> {
        self.tree.largest_at_most(r_d, w, excluded)
    }

    pub fn range<'a>(&'a self, min_d: f64, max_d: f64, w: &'a str) -> RangeIter<'a> {
        self.tree.range(min_d, max_d, w)
    }

    #[cfg(test)]
    pub(crate) fn tree(&self) -> &DistanceTree {
        &self.tree
    }
}
