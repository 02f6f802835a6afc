//! Generic distance-keyed B+-tree, arena-allocated, shared by the AB-tree
//! (§4.2) and PB-tree (§4.4) - spec.md is explicit that the two indices
//! are "the same shape", differing only in what their key represents
//! (distance-from-source vs distance-from-pivot) and in how they're
//! constructed.
//!
//! Grounded in the teacher's design note (spec.md §9 / `DESIGN.md`): arena
//! allocation with index-based child links, never owning pointers, so the
//! tree's internal references can't form cycles in the type system - the
//! same approach the teacher takes for `ecs`/ai-curve style arena types.

use crate::graph::{Keyword, VertexId};
use crate::index::IndexError;

use rustc_hash::FxHashSet;

/// One leaf entry: a vertex at a known distance, carrying its full
/// keyword set for membership filtering (spec.md §3).
#[derive(Clone, Debug)]
pub struct TreeEntry {
    pub distance: f64,
    pub vertex: VertexId,
    pub keywords: FxHashSet<Keyword>,
}

enum NodeKind {
    Leaf {
        entries: Vec<TreeEntry>,
        next: Option<usize>,
        prev: Option<usize>,
    },
    Internal {
        children: Vec<usize>,
        /// Routing keys; `keys.len() == children.len() - 1`. Child `i`
        /// covers `[keys[i-1], keys[i])` with sentinels `-inf`/`+inf`.
        keys: Vec<f64>,
    },
}

struct Node {
    kind: NodeKind,
    subtree_keywords: FxHashSet<Keyword>,
    /// Smallest entry distance in this node's subtree; equal to the
    /// leftmost descendant leaf's first entry distance.
    min_distance: f64,
}

/// A bulk-loaded, read-only distance-keyed B+-tree. Built once from a
/// fully-known entry set (spec.md §4.2's "bulk-insert into an empty
/// B+-tree"); CRS never incrementally inserts into an index after
/// construction, so a static arena built bottom-up from sorted entries is
/// sufficient and avoids re-implementing B+-tree node splitting.
pub struct DistanceTree {
    arena: Vec<Node>,
    root: usize,
    first_leaf: Option<usize>,
    order: usize,
}

impl DistanceTree {
    /// Bulk-builds a tree of the given order (fan-out bound `M`) from an
    /// unsorted entry set.
    pub fn build(mut entries: Vec<TreeEntry>, order: usize) -> Result<Self, IndexError> {
        if order < 2 {
            return Err(IndexError::InvalidOrder(order));
        }

        entries.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.vertex.cmp(&b.vertex)));

        let mut arena = Vec::new();

        if entries.is_empty() {
            let root = arena.len();
            arena.push(Node {
                kind: NodeKind::Leaf {
                    entries: Vec::new(),
                    next: None,
                    prev: None,
                },
                subtree_keywords: FxHashSet::default(),
                min_distance: f64::INFINITY,
            });
            return Ok(DistanceTree {
                arena,
                root,
                first_leaf: Some(root),
                order,
            });
        }

        let mut leaf_indices = Vec::new();
        for chunk in entries.chunks(order) {
            let mut subtree_keywords = FxHashSet::default();
            for e in chunk {
                subtree_keywords.extend(e.keywords.iter().cloned());
            }
            let min_distance = chunk[0].distance;

            let idx = arena.len();
            arena.push(Node {
                kind: NodeKind::Leaf {
                    entries: chunk.to_vec(),
                    next: None,
                    prev: None,
                },
                subtree_keywords,
                min_distance,
            });
            leaf_indices.push(idx);
        }

        for window in 0..leaf_indices.len() {
            if window + 1 < leaf_indices.len() {
                let (left, right) = (leaf_indices[window], leaf_indices[window + 1]);
                if let NodeKind::Leaf { next, .. } = &mut arena[left].kind {
                    *next = Some(right);
                }
                if let NodeKind::Leaf { prev, .. } = &mut arena[right].kind {
                    *prev = Some(left);
                }
            }
        }

        let first_leaf = leaf_indices.first().copied();

        let mut level = leaf_indices;
        while level.len() > 1 {
            let mut parents = Vec::new();
            for chunk in level.chunks(order) {
                let keys: Vec<f64> = chunk[1..].iter().map(|&c| arena[c].min_distance).collect();
                let mut subtree_keywords = FxHashSet::default();
                for &c in chunk {
                    subtree_keywords.extend(arena[c].subtree_keywords.iter().cloned());
                }
                let min_distance = arena[chunk[0]].min_distance;

                let idx = arena.len();
                arena.push(Node {
                    kind: NodeKind::Internal {
                        children: chunk.to_vec(),
                        keys,
                    },
                    subtree_keywords,
                    min_distance,
                });
                parents.push(idx);
            }
            level = parents;
        }

        let root = level[0];
        Ok(DistanceTree {
            arena,
            root,
            first_leaf,
            order,
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Entry with the largest distance `<= bound` whose keyword set
    /// contains `w` and whose vertex isn't in `excluded`.
    ///
    /// Per spec.md §4.2/§4.5: the AB-tree's `findSuccessor` and
    /// `findPredecessor` are *both* this operation, just called with
    /// different bounds (`lD` for predecessor, `rD` for successor) - kept
    /// as specified rather than "fixed" to a conventional ascending
    /// successor, per spec.md §9's open question.
    pub fn largest_at_most(
        &self,
        bound: f64,
        w: &str,
        excluded: &FxHashSet<VertexId>,
    ) -> Option<&TreeEntry> {
        self.largest_at_most_in(self.root, bound, w, excluded)
    }

    fn largest_at_most_in(
        &self,
        node_idx: usize,
        bound: f64,
        w: &str,
        excluded: &FxHashSet<VertexId>,
    ) -> Option<&TreeEntry> {
        let node = &self.arena[node_idx];
        if !node.subtree_keywords.contains(w) {
            return None;
        }

        match &node.kind {
            NodeKind::Leaf { entries, .. } => entries
                .iter()
                .rev()
                .find(|e| e.distance <= bound && e.keywords.contains(w) && !excluded.contains(&e.vertex)),
            NodeKind::Internal { children, keys } => {
                let mut slot = children.len() - 1;
                for (i, &k) in keys.iter().enumerate() {
                    if bound < k {
                        slot = i;
                        break;
                    }
                }

                for i in (0..=slot).rev() {
                    let local_bound = if i == slot { bound } else { f64::INFINITY };
                    if let Some(hit) = self.largest_at_most_in(children[i], local_bound, w, excluded) {
                        return Some(hit);
                    }
                }
                None
            }
        }
    }

    /// Entries with `distance in [min_d, max_d]` and keyword `w`, in
    /// ascending distance order - exposed as a lazy forward iterator over
    /// the leaf chain (spec.md §9's design note), so PB-tree verification
    /// can short-circuit mid-iteration.
    pub fn range<'a>(&'a self, min_d: f64, max_d: f64, w: &'a str) -> RangeIter<'a> {
        let leaf = Some(self.find_leaf_for(min_d));
        RangeIter {
            tree: self,
            leaf,
            pos: 0,
            min_d,
            max_d,
            keyword: w,
        }
    }

    fn find_leaf_for(&self, distance: f64) -> usize {
        let mut idx = self.root;
        loop {
            match &self.arena[idx].kind {
                NodeKind::Leaf { .. } => return idx,
                NodeKind::Internal { children, keys } => {
                    let mut slot = children.len() - 1;
                    for (i, &k) in keys.iter().enumerate() {
                        if distance < k {
                            slot = i;
                            break;
                        }
                    }
                    idx = children[slot];
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn in_order_entries(&self) -> Vec<&TreeEntry> {
        let mut out = Vec::new();
        let mut leaf = self.first_leaf;
        while let Some(idx) = leaf {
            let NodeKind::Leaf { entries, next, .. } = &self.arena[idx].kind else {
                unreachable!()
            };
            out.extend(entries.iter());
            leaf = *next;
        }
        out
    }

    #[cfg(test)]
    pub(crate) fn check_keyword_union_invariant(&self) -> bool {
        self.arena.iter().all(|node| match &node.kind {
            NodeKind::Leaf { entries, .. } => {
                let union: FxHashSet<Keyword> =
                    entries.iter().flat_map(|e| e.keywords.iter().cloned()).collect();
                union == node.subtree_keywords
            }
            NodeKind::Internal { children, .. } => {
                let union: FxHashSet<Keyword> = children
                    .iter()
                    .flat_map(|&c| self.arena[c].subtree_keywords.iter().cloned())
                    .collect();
                union == node.subtree_keywords
            }
        })
    }
}

/// Lazy forward iterator over the leaf chain, yielding entries with
/// `distance <= max_d` matching a keyword (spec.md §4.2's `range` query).
pub struct RangeIter<'a> {
    tree: &'a DistanceTree,
    leaf: Option<usize>,
    pos: usize,
    min_d: f64,
    max_d: f64,
    keyword: &'a str,
}

impl<'a> Iterator for RangeIter<'a> {
    type Item = &'a TreeEntry;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf_idx = self.leaf?;
            let NodeKind::Leaf { entries, next, .. } = &self.tree.arena[leaf_idx].kind else {
                unreachable!()
            };

            if self.pos >= entries.len() {
                self.leaf = *next;
                self.pos = 0;
                continue;
            }

            let entry = &entries[self.pos];
            self.pos += 1;

            if entry.distance > self.max_d {
                self.leaf = None;
                return None;
            }

            // `find_leaf_for(min_d)` only locates the *leaf* covering
            // min_d; entries earlier in that same leaf can still be
            // below it, so skip (don't stop on) those rather than
            // terminating the whole iteration.
            if entry.distance < self.min_d {
                continue;
            }

            if entry.keywords.contains(self.keyword) {
                return Some(entry);
            }
        }
    }
}
