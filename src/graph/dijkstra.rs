use crate::graph::{GraphStructure, VertexId};

use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Min-heap entry ordered by tentative distance (smallest first). Plain
/// `f64` isn't `Ord`; edge weights and accumulated distances are never
/// NaN (ingestion requires `weight_meters > 0`), so `total_cmp` is a safe
/// total order here.
#[derive(Copy, Clone, PartialEq)]
struct HeapEntry(f64, VertexId);

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.total_cmp(&self.0)
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dijkstra from `source` over the connected component reachable from it.
/// Returns a distance map; unreachable vertices are simply absent
/// (equivalently, +inf) per spec.md §4.1.
pub(crate) fn distances_from(graph: &GraphStructure, source: VertexId) -> FxHashMap<VertexId, f64> {
    let mut dist: FxHashMap<VertexId, f64> = FxHashMap::default();
    let mut visited: rustc_hash::FxHashSet<VertexId> = rustc_hash::FxHashSet::default();
    let mut heap = BinaryHeap::new();

    dist.insert(source, 0.0);
    heap.push(HeapEntry(0.0, source));

    while let Some(HeapEntry(d, u)) = heap.pop() {
        if !visited.insert(u) {
            continue;
        }

        for (_, v, weight) in graph.edges(u) {
            let candidate = d + *weight;
            let better = dist.get(&v).map(|&known| candidate < known).unwrap_or(true);

            if better {
                dist.insert(v, candidate);
                heap.push(HeapEntry(candidate, v));
            }
        }
    }

    dist
}

/// Dijkstra from `source`, recording predecessors so a path to `target`
/// can be reconstructed. Returns `None` if `target` is unreachable.
pub(crate) fn shortest_path(
    graph: &GraphStructure,
    source: VertexId,
    target: VertexId,
) -> Option<(f64, Vec<VertexId>)> {
    if source == target {
        return Some((0.0, vec![source]));
    }

    let mut dist: FxHashMap<VertexId, f64> = FxHashMap::default();
    let mut prev: FxHashMap<VertexId, VertexId> = FxHashMap::default();
    let mut visited: rustc_hash::FxHashSet<VertexId> = rustc_hash::FxHashSet::default();
    let mut heap = BinaryHeap::new();

    dist.insert(source, 0.0);
    heap.push(HeapEntry(0.0, source));

    while let Some(HeapEntry(d, u)) = heap.pop() {
        if !visited.insert(u) {
            continue;
        }

        if u == target {
            break;
        }

        for (_, v, weight) in graph.edges(u) {
            let candidate = d + *weight;
            let better = dist.get(&v).map(|&known| candidate < known).unwrap_or(true);

            if better {
                dist.insert(v, candidate);
                prev.insert(v, u);
                heap.push(HeapEntry(candidate, v));
            }
        }
    }

    let &target_dist = dist.get(&target)?;

    let mut path = vec![target];
    let mut current = target;
    while let Some(&parent) = prev.get(&current) {
        path.push(parent);
        current = parent;
    }
    path.reverse();

    Some((target_dist, path))
}
