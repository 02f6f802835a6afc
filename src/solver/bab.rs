use crate::clue::Query;
use crate::findnext::FindNextBackend;
use crate::graph::VertexId;
use crate::solver::{SearchResult, Solver};
use crate::trace::{ActionTag, Trace, TraceMode, TraceStep};

use rustc_hash::{FxHashMap, FxHashSet};

/// Depth-first branch-and-bound (spec.md §4.8), parameterized by a
/// [`FindNextBackend`] so that BAB/AB-tree and BAB/PB-tree are the same
/// struct instantiated with a different backend, per spec.md §9's
/// "no runtime type hierarchy needed" note.
pub struct BabSolver<'b, B: FindNextBackend> {
    backend: &'b B,
    trace_mode: TraceMode,
    max_iterations: u64,
}

impl<'b, B: FindNextBackend> BabSolver<'b, B> {
    pub fn new(backend: &'b B, trace_mode: TraceMode, max_iterations: u64) -> Self {
        BabSolver {
            backend,
            trace_mode,
            max_iterations,
        }
    }
}

impl<'b, B: FindNextBackend> Solver for BabSolver<'b, B> {
    fn solve(&self, query: &Query) -> SearchResult {
        let k = query.clues.len();
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
            reason: "bab start".into(),
            nested_index_steps: Vec::new(),
        });

        let mut stack_v = vec![query.source];
        let mut stack_m: Vec<f64> = Vec::new();
        let mut theta = 0.0f64;
        let mut ub = f64::INFINITY;
        let mut excluded: FxHashMap<usize, FxHashSet<VertexId>> = FxHashMap::default();
        let mut best_path: Vec<VertexId> = Vec::new();
        let mut best_matching = f64::INFINITY;
        let mut iterations = 0u64;
        let mut capped = false;

        while !stack_v.is_empty() {
            if iterations >= self.max_iterations {
                capped = true;
                trace.push(TraceStep {
                    sequence_no: 0,
                    action_tag: ActionTag::IterationCapExceeded,
                    stack_v: stack_v.clone(),
                    stack_d: stack_m.clone(),
                    upper_bound: Some(ub),
                    candidate: None,
                    candidate_matching: None,
                    accepted: false,
                    reason: "iteration cap exceeded".into(),
                    nested_index_steps: Vec::new(),
                });
                break;
            }

            let level = stack_v.len();
            if level > k {
                stack_v.pop();
                stack_m.pop();
                continue;
            }

            iterations += 1;
            let u = *stack_v.last().expect("loop guard ensures non-empty");
            let clue = &query.clues[level - 1];
            excluded.entry(level).or_default();
            let ex = excluded.get(&level).expect("just inserted").clone();

            let candidate = self.backend.find_next(u, clue, theta, ub, &ex);
            let nested = self.backend.take_index_steps();

            match candidate {
                None => {
                    trace.push(TraceStep {
                        sequence_no: 0,
                        action_tag: ActionTag::Backtrack,
                        stack_v: stack_v.clone(),
                        stack_d: stack_m.clone(),
                        upper_bound: Some(ub),
                        candidate: None,
                        candidate_matching: None,
                        accepted: false,
                        reason: format!("no candidate for clue {} from {u:?}", clue.keyword),
                        nested_index_steps: nested,
                    });
                    stack_v.pop();
                    theta = stack_m.pop().unwrap_or(0.0);
                    excluded.retain(|&l, _| l <= level);
                    // u itself is exhausted as a continuation point: bar it
                    // from being re-picked as the (level-1)-th vertex so the
                    // retry above doesn't just re-select it and loop forever.
                    excluded.entry(level.saturating_sub(1)).or_default().insert(u);
                    continue;
                }
                Some(c) if c.matching > ub => {
                    trace.push(TraceStep {
                        sequence_no: 0,
                        action_tag: ActionTag::Prune,
                        stack_v: stack_v.clone(),
                        stack_d: stack_m.clone(),
                        upper_bound: Some(ub),
                        candidate: Some(c.vertex),
                        candidate_matching: Some(c.matching),
                        accepted: false,
                        reason: format!("candidate {:?} exceeds UB {ub:.3}", c.vertex),
                        nested_index_steps: nested,
                    });
                    excluded.entry(level).or_default().insert(c.vertex);
                    stack_v.pop();
                    theta = stack_m.pop().unwrap_or(0.0);
                    excluded.entry(level.saturating_sub(1)).or_default().insert(u);
                    continue;
                }
                Some(c) => {
                    stack_v.push(c.vertex);
                    stack_m.push(c.matching);
                    theta = 0.0;

                    trace.push(TraceStep {
                        sequence_no: 0,
                        action_tag: ActionTag::Push,
                        stack_v: stack_v.clone(),
                        stack_d: stack_m.clone(),
                        upper_bound: Some(ub),
                        candidate: Some(c.vertex),
                        candidate_matching: Some(c.matching),
                        accepted: true,
                        reason: format!("pushed {:?} for clue {}", c.vertex, clue.keyword),
                        nested_index_steps: nested,
                    });

                    if stack_v.len() == k + 1 {
                        let path_max = stack_m.iter().cloned().fold(0.0_f64, f64::max);
                        if path_max <= ub {
                            ub = path_max;
                            best_path = stack_v.clone();
                            best_matching = path_max;
                            trace.push(TraceStep {
                                sequence_no: 0,
                                action_tag: ActionTag::UpdateUb,
                                stack_v: stack_v.clone(),
                                stack_d: stack_m.clone(),
                                upper_bound: Some(ub),
                                candidate: Some(c.vertex),
                                candidate_matching: Some(path_max),
                                accepted: true,
                                reason: "new best path found".into(),
                                nested_index_steps: Vec::new(),
                            });
                        } else {
                            trace.push(TraceStep {
                                sequence_no: 0,
                                action_tag: ActionTag::FeasibleNoUpdate,
                                stack_v: stack_v.clone(),
                                stack_d: stack_m.clone(),
                                upper_bound: Some(ub),
                                candidate: Some(c.vertex),
                                candidate_matching: Some(path_max),
                                accepted: false,
                                reason: "feasible but not better than current UB".into(),
                                nested_index_steps: Vec::new(),
                            });
                        }

                        // Force exploration of alternative predecessors
                        // (spec.md §4.8/§9): pop the last-pushed vertex
                        // into excluded[level], pop one more level into
                        // excluded[level-1], then clear excluded[level].
                        let popped1 = stack_v.pop().expect("just pushed");
                        stack_m.pop();
                        excluded.entry(level).or_default().insert(popped1);

                        if let Some(popped2) = stack_v.pop() {
                            stack_m.pop();
                            excluded.entry(level.saturating_sub(1)).or_default().insert(popped2);
                        }
                        excluded.remove(&level);
                        theta = stack_m.last().copied().unwrap_or(0.0);
                    }
                    continue;
                }
            }
        }

        if !capped {
            trace.push(TraceStep {
                sequence_no: 0,
                action_tag: ActionTag::Done,
                stack_v: best_path.clone(),
                stack_d: Vec::new(),
                upper_bound: Some(ub),
                candidate: None,
                candidate_matching: None,
                accepted: best_matching.is_finite(),
                reason: "search space exhausted".into(),
                nested_index_steps: Vec::new(),
            });
        }

        SearchResult {
            best_path,
            best_matching_distance: best_matching,
            trace,
            execution_time_ms: 0,
            iterations,
            index_build_time_ms: None,
        }
    }
}
