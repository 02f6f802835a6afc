use crate::graph::VertexId;
use rustc_hash::FxHashMap;

/// Write-once-per-key memoization of pairwise network distances.
///
/// Grounded in the read-through `CacheMap`/`Calculable` pattern from the
/// teacher's `transition/primitives/cache.rs`, generalized from its
/// routing-specific successor/predicate caches down to a plain distance
/// cache. Unbounded by design (spec.md §4.1/§5); call [`DistanceCache::clear`]
/// to release. A value already present is never overwritten - edge
/// weights never change once the graph is built, so a second computation
/// of the same key is guaranteed to agree with the first.
#[derive(Debug, Default)]
pub(crate) struct DistanceCache {
    pairwise: FxHashMap<(VertexId, VertexId), f64>,
}

impl DistanceCache {
    pub(crate) fn get(&self, from: VertexId, to: VertexId) -> Option<f64> {
        self.pairwise.get(&(from, to)).copied()
    }

    /// Inserts `distance` for `(from, to)` unless a value is already
    /// present.
    pub(crate) fn insert_if_absent(&mut self, from: VertexId, to: VertexId, distance: f64) {
        self.pairwise.entry((from, to)).or_insert(distance);
    }

    /// Merges a freshly-computed full distance vector from `source`,
    /// populating one cache entry per reached vertex (spec.md §4.1).
    pub(crate) fn absorb_vector(&mut self, source: VertexId, distances: &FxHashMap<VertexId, f64>) {
        for (&to, &distance) in distances {
            self.insert_if_absent(source, to, distance);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.pairwise.clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.pairwise.len()
    }
}
