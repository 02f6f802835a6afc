#![doc = "The shared road-network graph: vertex table, adjacency, keyword index, and the Dijkstra-backed shortest-path service (spec.md §4.1)."]

mod cache;
mod dijkstra;
mod error;
mod vertex;

#[cfg(test)]
mod test;

pub use error::GraphError;
pub use vertex::{Keyword, Vertex, VertexId};

use cache::DistanceCache;

use indexmap::{IndexMap, IndexSet};
use petgraph::prelude::GraphMap;
use petgraph::Directed;
use rustc_hash::{FxBuildHasher, FxHashMap};
use std::fmt::{Debug, Formatter};
use std::sync::Mutex;
#[cfg(feature = "tracing")]
use tracing::Level;

/// Directed weight-keyed adjacency structure. Mirrors the teacher's
/// `GraphStructure<E> = DiGraphMap<E, (Weight, ...), BuildHasherDefault<FxHasher>>`
/// (`graph/item.rs`), simplified to a bare `f64` edge weight since CRS has
/// no per-edge routing metadata beyond the weight.
pub(crate) type GraphStructure = GraphMap<VertexId, f64, Directed, FxBuildHasher>;

/// Vertex records handed to the graph by the ingestion collaborator.
/// Keywords must already be case-folded or will be folded on ingestion
/// (spec.md §6); the ingester need not fold them itself.
pub struct VertexRecord {
    pub id: VertexId,
    pub lat: f64,
    pub lon: f64,
    pub keywords: Vec<String>,
}

/// Edge records handed to the graph by the ingestion collaborator.
pub struct EdgeRecord {
    pub from: VertexId,
    pub to: VertexId,
    pub weight_meters: f64,
}

/// Read-only road network: vertex table, adjacency, and a keyword
/// inverted index. Built once at load time; the shortest-path service
/// (§4.1) operates directly on this structure, with a write-once distance
/// cache behind a `Mutex` so the [`Graph`] can be shared across concurrent
/// queries (spec.md §5) without requiring `&mut`.
pub struct Graph {
    graph: GraphStructure,
    vertices: FxHashMap<VertexId, Vertex>,
    keyword_index: IndexMap<Keyword, IndexSet<VertexId>>,
    cache: Mutex<DistanceCache>,
}

impl Debug for Graph {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Graph with {} vertices, {} edges",
            self.vertices.len(),
            self.graph.edge_count()
        )
    }
}

impl Graph {
    /// Builds a graph from ingested vertex and edge records.
    ///
    /// Invariants enforced (spec.md §3/§6): vertex ids are unique, every
    /// edge endpoint resolves to a declared vertex, and weights are
    /// strictly positive. Keyword folding happens here, once, so the
    /// keyword index never drifts out of sync with per-vertex keyword
    /// sets (closing the rebuild-window bug spec.md §9 calls out in the
    /// reference).
    pub fn build(
        vertex_records: Vec<VertexRecord>,
        edge_records: Vec<EdgeRecord>,
    ) -> Result<Self, GraphError> {
        let mut graph = GraphStructure::with_capacity(vertex_records.len(), edge_records.len());
        let mut vertices = FxHashMap::default();
        let mut keyword_index: IndexMap<Keyword, IndexSet<VertexId>> = IndexMap::new();

        for record in vertex_records {
            if vertices.contains_key(&record.id) {
                return Err(GraphError::DuplicateVertex(record.id));
            }

            let keywords: Vec<Keyword> = record.keywords.iter().map(|k| Keyword::new(k)).collect();
            for keyword in &keywords {
                keyword_index
                    .entry(keyword.clone())
                    .or_default()
                    .insert(record.id);
            }

            let vertex = Vertex::new(record.id, record.lat, record.lon, keywords);
            graph.add_node(record.id);
            vertices.insert(record.id, vertex);
        }

        for record in edge_records {
            if record.weight_meters <= 0.0 {
                return Err(GraphError::NonPositiveWeight(record.weight_meters));
            }
            if !vertices.contains_key(&record.from) {
                return Err(GraphError::UnknownEndpoint(record.from));
            }
            if !vertices.contains_key(&record.to) {
                return Err(GraphError::UnknownEndpoint(record.to));
            }

            graph.add_edge(record.from, record.to, record.weight_meters);
        }

        Ok(Graph {
            graph,
            vertices,
            keyword_index,
            cache: Mutex::new(DistanceCache::default()),
        })
    }

    #[inline]
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.vertices.len()
    }

    /// Outgoing neighbours of `v`, as `(neighbour, weight_meters)` pairs.
    pub fn neighbors(&self, v: VertexId) -> impl Iterator<Item = (VertexId, f64)> + '_ {
        self.graph.edges(v).map(|(_, to, &weight)| (to, weight))
    }

    /// Vertex ids whose keyword set contains `keyword` (case-insensitive).
    pub fn vertices_with_keyword<'a>(&'a self, keyword: &str) -> impl Iterator<Item = VertexId> + 'a {
        self.keyword_index
            .get(keyword)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn has_vertex(&self, id: VertexId) -> bool {
        self.vertices.contains_key(&id)
    }

    /// All vertex ids in the graph, in arbitrary order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.keys().copied()
    }

    /// Network (Dijkstra shortest-path) distance between `u` and `v`, or
    /// `+inf` if unreachable (spec.md §4.1). Memoized: a full distance
    /// vector from `u` is computed and cached on first use.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), level = Level::DEBUG))]
    pub fn network_distance(&self, u: VertexId, v: VertexId) -> f64 {
        if u == v {
            return 0.0;
        }

        if let Some(d) = self.cache.lock().unwrap().get(u, v) {
            return d;
        }

        let distances = self.all_distances_from(u);
        distances.get(&v).copied().unwrap_or(f64::INFINITY)
    }

    /// Full distance vector from `s` over its connected component.
    /// Unreachable vertices are absent. Populates the write-once
    /// memoization cache for every reached vertex (spec.md §4.1).
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), level = Level::DEBUG))]
    pub fn all_distances_from(&self, s: VertexId) -> FxHashMap<VertexId, f64> {
        log::trace!("computing full distance vector from {s:?}");
        let distances = dijkstra::distances_from(&self.graph, s);
        self.cache.lock().unwrap().absorb_vector(s, &distances);
        distances
    }

    /// Shortest path between `u` and `v`, with the full vertex sequence.
    /// Returns an empty sequence and `+inf` if `v` is unreachable from `u`
    /// (spec.md §4.1).
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), level = Level::DEBUG))]
    pub fn shortest_path(&self, u: VertexId, v: VertexId) -> (f64, Vec<VertexId>) {
        match dijkstra::shortest_path(&self.graph, u, v) {
            Some((distance, path)) => {
                self.cache.lock().unwrap().insert_if_absent(u, v, distance);
                (distance, path)
            }
            None => (f64::INFINITY, Vec::new()),
        }
    }

    /// Releases the memoized distance cache. No other resource needs
    /// finalizer magic (spec.md §5) - caches are simply dropped.
    pub fn clear_cache(&self) {
        self.cache.lock().unwrap().clear();
    }

    #[cfg(test)]
    pub(crate) fn cache_len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }
}

/// Great-circle (Haversine) distance between two vertices, in meters.
/// Not used by the shortest-path service itself (edges carry explicit
/// network weights); this is the ambient geographic helper spec.md §2
/// names for diagnostics and any caller needing straight-line distance.
pub fn haversine_distance(a: &Vertex, b: &Vertex) -> f64 {
    use geo::{Distance, Haversine};
    Haversine.distance(a.point(), b.point())
}
