use crate::clue::Query;
use crate::graph::{Graph, VertexId};
use crate::solver::{SearchResult, Solver};
use crate::trace::{ActionTag, Trace, TraceMode, TraceStep};

use rustc_hash::FxHashMap;

/// Exact dynamic-programming solver (spec.md §4.7): `D(i,u)` is the
/// minimum, over predecessors `v` at level `i-1`, of
/// `max(D(i-1,v), m_i(d(v,u)))`. Guaranteed optimal; `O(sum |V_{i-1}|*|V_i|)`
/// memoized distance queries.
pub struct CdpSolver<'a> {
    graph: &'a Graph,
    trace_mode: TraceMode,
    max_iterations: u64,
}

impl<'a> CdpSolver<'a> {
    pub fn new(graph: &'a Graph, trace_mode: TraceMode, max_iterations: u64) -> Self {
        CdpSolver {
            graph,
            trace_mode,
            max_iterations,
        }
    }

    fn capped(trace: Trace, iterations: u64) -> SearchResult {
        let mut result = SearchResult::infeasible(trace);
        result.iterations = iterations;
        result
    }
}

impl<'a> Solver for CdpSolver<'a> {
    fn solve(&self, query: &Query) -> SearchResult {
        let mut trace = Trace::new(self.trace_mode);
        trace.push(TraceStep {
            sequence_no: 0,
            action_tag: ActionTag::Init,
            stack_v: vec![query.source],
            stack_d: Vec::new(),
            upper_bound: None,
            candidate: None,
            candidate_matching: None,
            accepted: true,
            reason: "cdp start".into(),
            nested_index_steps: Vec::new(),
        });

        let k = query.clues.len();
        // parents[i] maps a level-(i+1) vertex to its level-i predecessor
        // (or the query source when i == 0).
        let mut parents: Vec<FxHashMap<VertexId, VertexId>> = Vec::with_capacity(k);
        let mut iterations = 0u64;

        let first_clue = &query.clues[0];
        let mut d_prev: FxHashMap<VertexId, f64> = FxHashMap::default();
        let mut level_parents: FxHashMap<VertexId, VertexId> = FxHashMap::default();

        for v in self.graph.vertices_with_keyword(&first_clue.keyword) {
            if iterations >= self.max_iterations {
                trace.push(TraceStep {
                    sequence_no: 0,
                    action_tag: ActionTag::IterationCapExceeded,
                    stack_v: vec![query.source],
                    stack_d: Vec::new(),
                    upper_bound: None,
                    candidate: None,
                    candidate_matching: None,
                    accepted: false,
                    reason: "iteration cap exceeded while seeding level 1".into(),
                    nested_index_steps: Vec::new(),
                });
                return Self::capped(trace, iterations);
            }
            iterations += 1;
            let dist = self.graph.network_distance(query.source, v);
            if first_clue.in_interval(dist) {
                d_prev.insert(v, first_clue.matching_distance(dist));
                level_parents.insert(v, query.source);
            }
        }
        parents.push(level_parents);

        if d_prev.is_empty() {
            trace.push(TraceStep {
                sequence_no: 0,
                action_tag: ActionTag::Done,
                stack_v: vec![query.source],
                stack_d: Vec::new(),
                upper_bound: None,
                candidate: None,
                candidate_matching: None,
                accepted: false,
                reason: "no reachable state at level 1".into(),
                nested_index_steps: Vec::new(),
            });
            let mut result = SearchResult::infeasible(trace);
            result.iterations = iterations;
            return result;
        }

        for clue in &query.clues[1..] {
            let mut d_cur: FxHashMap<VertexId, f64> = FxHashMap::default();
            let mut level_parents: FxHashMap<VertexId, VertexId> = FxHashMap::default();

            for u in self.graph.vertices_with_keyword(&clue.keyword) {
                let mut best: Option<(f64, VertexId)> = None;
                for (&v, &d_prev_v) in &d_prev {
                    if iterations >= self.max_iterations {
                        trace.push(TraceStep {
                            sequence_no: 0,
                            action_tag: ActionTag::IterationCapExceeded,
                            stack_v: vec![query.source],
                            stack_d: Vec::new(),
                            upper_bound: None,
                            candidate: None,
                            candidate_matching: None,
                            accepted: false,
                            reason: format!("iteration cap exceeded while evaluating clue {}", clue.keyword),
                            nested_index_steps: Vec::new(),
                        });
                        return Self::capped(trace, iterations);
                    }
                    iterations += 1;
                    let dist = self.graph.network_distance(v, u);
                    if !clue.in_interval(dist) {
                        continue;
                    }
                    let candidate = d_prev_v.max(clue.matching_distance(dist));
                    if best.map(|(b, _)| candidate < b).unwrap_or(true) {
                        best = Some((candidate, v));
                    }
                }
                if let Some((value, predecessor)) = best {
                    d_cur.insert(u, value);
                    level_parents.insert(u, predecessor);
                }
            }

            parents.push(level_parents);

            if d_cur.is_empty() {
                trace.push(TraceStep {
                    sequence_no: 0,
                    action_tag: ActionTag::Done,
                    stack_v: vec![query.source],
                    stack_d: Vec::new(),
                    upper_bound: None,
                    candidate: None,
                    candidate_matching: None,
                    accepted: false,
                    reason: format!("no reachable state for clue {}", clue.keyword),
                    nested_index_steps: Vec::new(),
                });
                let mut result = SearchResult::infeasible(trace);
                result.iterations = iterations;
                return result;
            }

            d_prev = d_cur;
        }

        let (&best_vertex, &best_value) = d_prev
            .iter()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .expect("non-empty by loop invariant");

        let mut path = vec![best_vertex];
        let mut current = best_vertex;
        for level in (0..k).rev() {
            let predecessor = parents[level][&current];
            path.push(predecessor);
            current = predecessor;
        }
        path.reverse();

        trace.push(TraceStep {
            sequence_no: 0,
            action_tag: ActionTag::Done,
            stack_v: path.clone(),
            stack_d: Vec::new(),
            upper_bound: Some(best_value),
            candidate: Some(best_vertex),
            candidate_matching: Some(best_value),
            accepted: true,
            reason: "cdp optimum found".into(),
            nested_index_steps: Vec::new(),
        });

        SearchResult {
            best_path: path,
            best_matching_distance: best_value,
            trace,
            execution_time_ms: 0,
            iterations,
            index_build_time_ms: None,
        }
    }
}
