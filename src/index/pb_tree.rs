//! PB-tree / pivot-reverse index (spec.md §4.4): one B+-tree per pivot
//! `o`, keyed by `d(o, v)` over vertices whose 2-hop label contains `o`.

use crate::graph::{Graph, VertexId};
use crate::index::btree::{DistanceTree, TreeEntry};
use crate::index::IndexError;
use crate::label::TwoHopLabel;

use rustc_hash::FxHashMap;

/// The pivot-reverse index: a [`DistanceTree`] per pivot, collectively
/// covering every label entry in the 2-hop label.
pub struct PivotIndex {
    trees: FxHashMap<VertexId, DistanceTree>,
}

impl PivotIndex {
    /// Builds one [`DistanceTree`] per pivot from `label`: a vertex `v`
    /// contributes `(d(o,v), v, v.keywords)` to pivot `o`'s tree for
    /// every `(o, d(o,v))` entry in `L(v)`, provided `v`'s keyword set is
    /// non-empty (spec.md §4.4).
    pub fn build(graph: &Graph, label: &TwoHopLabel, order: usize) -> Result<Self, IndexError> {
        let mut by_pivot: FxHashMap<VertexId, Vec<TreeEntry>> = FxHashMap::default();

        for v in graph.vertex_ids() {
            let Some(vertex) = graph.vertex(v) else {
                continue;
            };
            if vertex.keywords().next().is_none() {
                continue;
            }
            let keywords: rustc_hash::FxHashSet<_> = vertex.keywords().cloned().collect();

            for entry in label.label(v) {
                by_pivot.entry(entry.pivot).or_default().push(TreeEntry {
                    distance: entry.distance,
                    vertex: v,
                    keywords: keywords.clone(),
                });
            }
        }

        let mut trees = FxHashMap::default();
        for (pivot, entries) in by_pivot {
            trees.insert(pivot, DistanceTree::build(entries, order)?);
        }

        Ok(PivotIndex { trees })
    }

    pub fn tree(&self, pivot: VertexId) -> Option<&DistanceTree> {
        self.trees.get(&pivot)
    }

    pub fn pivot_count(&self) -> usize {
        self.trees.len()
    }
}
