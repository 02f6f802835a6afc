//! Session (spec.md §4.11): owns the graph, the optional 2-hop label and
//! pivot-reverse index, and the per-source AB-tree cache; dispatches
//! queries to the requested solver/backend combination.

use crate::clue::{ClueError, Query};
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::findnext::{AbBackend, FindNextBackend, LinearBackend, PbBackend};
use crate::graph::{Graph, VertexId};
use crate::index::{AbTree, PivotIndex};
use crate::label::TwoHopLabel;
use crate::solver::{BabSolver, CdpSolver, GcsSolver, SearchResult, Solver};
use crate::trace::TraceMode;

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Which solver to run a query with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SolverKind {
    Gcs,
    Cdp,
    Bab,
}

/// Which `findNext` backend BAB (or GCS, for comparison purposes) should
/// use. CDP never consults a backend - it queries the graph directly.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FindNextKind {
    Linear,
    AbTree,
    PbTree,
}

/// Single-threaded-cooperative session (spec.md §5): caches use interior
/// mutability (`RefCell`) since one solver invocation holds exclusive
/// access to its own stacks and buffers, and the session itself is never
/// shared across threads directly - see [`SharedSession`] for that.
pub struct Session {
    graph: Graph,
    config: SessionConfig,
    label: RefCell<Option<Rc<TwoHopLabel>>>,
    pivot_index: RefCell<Option<Rc<PivotIndex>>>,
    ab_cache: RefCell<FxHashMap<VertexId, Rc<AbTree>>>,
}

impl Session {
    pub fn new(graph: Graph, config: SessionConfig) -> Self {
        let session = Session {
            graph,
            config,
            label: RefCell::new(None),
            pivot_index: RefCell::new(None),
            ab_cache: RefCell::new(FxHashMap::default()),
        };

        if !session.config.build_indices_lazily {
            session.ensure_label();
        }

        session
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    fn ensure_label(&self) -> Rc<TwoHopLabel> {
        if let Some(label) = self.label.borrow().as_ref() {
            return label.clone();
        }

        let label = Rc::new(
            TwoHopLabel::build(
                &self.graph,
                self.config.label_pivot_order,
                self.config.distance_tolerance_epsilon,
            )
            .expect("pivot ordering must only reference vertices present in the graph"),
        );
        *self.label.borrow_mut() = Some(label.clone());
        label
    }

    fn ensure_pivot_index(&self) -> Rc<PivotIndex> {
        if let Some(index) = self.pivot_index.borrow().as_ref() {
            return index.clone();
        }

        let label = self.ensure_label();
        let index = Rc::new(
            PivotIndex::build(&self.graph, &label, self.config.pb_tree_order)
                .expect("tree order validated by config"),
        );
        *self.pivot_index.borrow_mut() = Some(index.clone());
        index
    }

    /// Runs `query` with the given solver/backend combination.
    pub fn query(&self, query: &Query, solver: SolverKind, find_next: FindNextKind) -> Result<SearchResult> {
        if !self.graph.has_vertex(query.source) {
            return Err(Error::from(ClueError::UnknownSource(query.source)));
        }

        let started = Instant::now();

        let mut result = match solver {
            SolverKind::Cdp => {
                CdpSolver::new(&self.graph, self.config.trace_mode, self.config.max_iterations).solve(query)
            }
            SolverKind::Gcs => self.dispatch_with_backend(query, find_next, |backend| {
                GcsSolver::new(backend, self.config.trace_mode).solve(query)
            }),
            SolverKind::Bab => self.dispatch_with_backend(query, find_next, |backend| {
                BabSolver::new(backend, self.config.trace_mode, self.config.max_iterations).solve(query)
            }),
        };

        result.execution_time_ms = started.elapsed().as_millis() as u64;
        Ok(result)
    }

    fn dispatch_with_backend(
        &self,
        query: &Query,
        find_next: FindNextKind,
        run: impl Fn(&dyn FindNextBackend) -> SearchResult,
    ) -> SearchResult {
        match find_next {
            FindNextKind::Linear => {
                let backend = LinearBackend::new(&self.graph);
                run(&backend)
            }
            FindNextKind::AbTree => {
                let backend = AbBackend::new(&self.graph, self.config.ab_tree_order, &self.ab_cache);
                run(&backend)
            }
            FindNextKind::PbTree => {
                let label = self.ensure_label();
                let pivots = self.ensure_pivot_index();
                let backend = PbBackend::new(&label, &pivots);
                run(&backend)
            }
        }
    }

    /// Drops all memoized caches (distance cache, AB-tree cache) plus the
    /// lazily-built label and pivot index (spec.md §5: no finalizer
    /// magic, just drop-and-rebuild-on-next-use).
    pub fn clear_caches(&self) {
        self.graph.clear_cache();
        self.ab_cache.borrow_mut().clear();
        *self.label.borrow_mut() = None;
        *self.pivot_index.borrow_mut() = None;
    }

    /// Wraps this session for sharing across threads (spec.md §5's
    /// optional concurrent discipline).
    pub fn into_shared(self) -> SharedSession {
        SharedSession {
            inner: Arc::new(Mutex::new(self)),
        }
    }
}

/// `Arc<Mutex<_>>`-backed wrapper for concurrent callers (spec.md §5).
/// Every query still runs to completion holding the lock - CRS is
/// single-threaded-cooperative per query, not internally parallel; this
/// only serializes concurrent callers rather than adding concurrency.
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<Session>>,
}

impl SharedSession {
    pub fn query(&self, query: &Query, solver: SolverKind, find_next: FindNextKind) -> Result<SearchResult> {
        let session = self.inner.lock().expect("session mutex poisoned");
        session.query(query, solver, find_next)
    }

    pub fn clear_caches(&self) {
        self.inner.lock().expect("session mutex poisoned").clear_caches();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clue::Clue;
    use crate::graph::{EdgeRecord, VertexRecord};

    fn vr(id: u64, keywords: &[&str]) -> VertexRecord {
        VertexRecord {
            id: VertexId(id),
            lat: 0.0,
            lon: id as f64,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn er(from: u64, to: u64, weight: f64) -> EdgeRecord {
        EdgeRecord {
            from: VertexId(from),
            to: VertexId(to),
            weight_meters: weight,
        }
    }

    fn trivial_chain() -> Graph {
        let vertices = vec![vr(1, &["start"]), vr(2, &["p"]), vr(3, &["q"])];
        let edges = vec![er(1, 2, 100.0), er(2, 1, 100.0), er(2, 3, 150.0), er(3, 2, 150.0)];
        Graph::build(vertices, edges).unwrap()
    }

    #[test]
    fn query_rejects_unknown_source() {
        let session = Session::new(trivial_chain(), SessionConfig::default());
        let query = Query::new(VertexId(99), vec![Clue::new("p", 100.0, 0.2).unwrap()]).unwrap();
        let result = session.query(&query, SolverKind::Gcs, FindNextKind::Linear);
        assert!(result.is_err());
    }

    #[test]
    fn all_backends_agree_through_session() {
        let session = Session::new(trivial_chain(), SessionConfig::default());
        let query = Query::new(
            VertexId(1),
            vec![Clue::new("p", 100.0, 0.2).unwrap(), Clue::new("q", 150.0, 0.2).unwrap()],
        )
        .unwrap();

        let linear = session.query(&query, SolverKind::Bab, FindNextKind::Linear).unwrap();
        let ab = session.query(&query, SolverKind::Bab, FindNextKind::AbTree).unwrap();
        let pb = session.query(&query, SolverKind::Bab, FindNextKind::PbTree).unwrap();

        assert!((linear.best_matching_distance - ab.best_matching_distance).abs() < 1e-6);
        assert!((linear.best_matching_distance - pb.best_matching_distance).abs() < 1e-6);
    }

    #[test]
    fn clear_caches_allows_reuse() {
        let session = Session::new(trivial_chain(), SessionConfig::default());
        let query = Query::new(VertexId(1), vec![Clue::new("p", 100.0, 0.2).unwrap()]).unwrap();
        session.query(&query, SolverKind::Gcs, FindNextKind::AbTree).unwrap();
        session.clear_caches();
        let result = session.query(&query, SolverKind::Gcs, FindNextKind::AbTree).unwrap();
        assert!(result.is_feasible());
    }
}
