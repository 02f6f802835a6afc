use crate::clue::Query;
use crate::findnext::FindNextBackend;
use crate::solver::{SearchResult, Solver};
use crate::trace::{ActionTag, Trace, TraceMode, TraceStep};

use rustc_hash::FxHashSet;

/// Greedy solver (spec.md §4.6): invokes `findNext` once per clue with
/// `theta=0, UB=+inf` from the last accepted vertex. Deterministic, no
/// backtracking; on the first failed clue it stops and reports the
/// partial path.
pub struct GcsSolver<'b, B: FindNextBackend> {
    backend: &'b B,
    trace_mode: TraceMode,
}

impl<'b, B: FindNextBackend> GcsSolver<'b, B> {
    pub fn new(backend: &'b B, trace_mode: TraceMode) -> Self {
        GcsSolver { backend, trace_mode }
    }
}

impl<'b, B: FindNextBackend> Solver for GcsSolver<'b, B> {
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
            reason: "gcs start".into(),
            nested_index_steps: Vec::new(),
        });

        let excluded = FxHashSet::default();
        let mut current = query.source;
        let mut path = vec![query.source];
        let mut matching_values = Vec::new();
        let mut iterations = 0u64;

        for clue in &query.clues {
            iterations += 1;
            let hit = self.backend.find_next(current, clue, 0.0, f64::INFINITY, &excluded);
            let nested = self.backend.take_index_steps();

            match hit {
                Some(candidate) => {
                    trace.push(TraceStep {
                        sequence_no: 0,
                        action_tag: ActionTag::Push,
                        stack_v: path.clone(),
                        stack_d: matching_values.clone(),
                        upper_bound: None,
                        candidate: Some(candidate.vertex),
                        candidate_matching: Some(candidate.matching),
                        accepted: true,
                        reason: format!("accepted {:?} for clue {}", candidate.vertex, clue.keyword),
                        nested_index_steps: nested,
                    });
                    current = candidate.vertex;
                    path.push(candidate.vertex);
                    matching_values.push(candidate.matching);
                }
                None => {
                    trace.push(TraceStep {
                        sequence_no: 0,
                        action_tag: ActionTag::Prune,
                        stack_v: path.clone(),
                        stack_d: matching_values.clone(),
                        upper_bound: None,
                        candidate: None,
                        candidate_matching: None,
                        accepted: false,
                        reason: format!("no candidate for clue {}", clue.keyword),
                        nested_index_steps: nested,
                    });
                    break;
                }
            }
        }

        // spec.md §4.10: matching distance is the max of whatever matches
        // were obtained, or +inf if the very first clue already failed.
        let best_matching_distance = if matching_values.is_empty() {
            f64::INFINITY
        } else {
            matching_values.iter().cloned().fold(0.0_f64, f64::max)
        };

        trace.push(TraceStep {
            sequence_no: 0,
            action_tag: ActionTag::Done,
            stack_v: path.clone(),
            stack_d: matching_values.clone(),
            upper_bound: None,
            candidate: None,
            candidate_matching: None,
            accepted: matching_values.len() == query.clues.len(),
            reason: "gcs done".into(),
            nested_index_steps: Vec::new(),
        });

        SearchResult {
            best_path: path,
            best_matching_distance,
            trace,
            execution_time_ms: 0,
            iterations,
            index_build_time_ms: None,
        }
    }
}
