//! Append-only trace/step collector (spec.md §4.9/§6): every solver and
//! every `findNext` call emits [`TraceStep`]s describing its decisions.
//! Never mutated after emission - readers see the final list via
//! `SearchResult`.

use crate::graph::VertexId;

use serde::{Deserialize, Serialize};

/// What kind of decision a [`TraceStep`] records.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionTag {
    Init,
    FindNext,
    Push,
    Prune,
    Backtrack,
    UpdateUb,
    FeasibleNoUpdate,
    Done,
    Cancelled,
    IterationCapExceeded,
}

/// A sub-step emitted by a `findNext` backend (spec.md §4.9): subtree
/// pruning, leaf scans, predecessor/successor selection, threshold
/// failures, and the no-candidate outcome. Nested under the solver's
/// [`TraceStep`] for the call that produced them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexStep {
    pub description: String,
}

impl IndexStep {
    pub fn new(description: impl Into<String>) -> Self {
        IndexStep {
            description: description.into(),
        }
    }
}

/// One append-only trace entry (spec.md §6's wire shape).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TraceStep {
    pub sequence_no: u64,
    pub action_tag: ActionTag,
    pub stack_v: Vec<VertexId>,
    pub stack_d: Vec<f64>,
    pub upper_bound: Option<f64>,
    pub candidate: Option<VertexId>,
    pub candidate_matching: Option<f64>,
    pub accepted: bool,
    pub reason: String,
    pub nested_index_steps: Vec<IndexStep>,
}

/// How verbose a trace should be (spec.md §9): correctness of the search
/// never depends on this, only the volume of recorded detail.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TraceMode {
    None,
    #[default]
    Summary,
    Full,
}

/// An append-only sequence of [`TraceStep`]s.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Trace {
    mode: TraceMode,
    steps: Vec<TraceStep>,
    next_sequence_no: u64,
}

impl Trace {
    pub fn new(mode: TraceMode) -> Self {
        Trace {
            mode,
            steps: Vec::new(),
            next_sequence_no: 0,
        }
    }

    pub fn mode(&self) -> TraceMode {
        self.mode
    }

    /// Appends a step, stamping it with the next sequence number (spec.md
    /// §9: "BAB traces can grow very large on deep searches... downsample;
    /// correctness of search must not depend on trace mode"). `NONE` drops
    /// the step entirely; `SUMMARY` keeps every top-level decision step but
    /// discards its `nested_index_steps` - the per-backend leaf-scan detail
    /// that dominates trace size on deep searches, since the top-level
    /// action/candidate/accepted fields already capture the decision;
    /// `FULL` keeps everything.
    pub fn push(&mut self, mut step: TraceStep) {
        if self.mode == TraceMode::None {
            return;
        }
        if self.mode == TraceMode::Summary {
            step.nested_index_steps.clear();
        }
        step.sequence_no = self.next_sequence_no;
        self.next_sequence_no += 1;
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn into_steps(self) -> Vec<TraceStep> {
        self.steps
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn step(tag: ActionTag) -> TraceStep {
        TraceStep {
            sequence_no: 0,
            action_tag: tag,
            stack_v: Vec::new(),
            stack_d: Vec::new(),
            upper_bound: None,
            candidate: None,
            candidate_matching: None,
            accepted: false,
            reason: String::new(),
            nested_index_steps: Vec::new(),
        }
    }

    #[test]
    fn sequence_numbers_increment() {
        let mut trace = Trace::new(TraceMode::Full);
        trace.push(step(ActionTag::Init));
        trace.push(step(ActionTag::Push));
        assert_eq!(trace.steps()[0].sequence_no, 0);
        assert_eq!(trace.steps()[1].sequence_no, 1);
    }

    #[test]
    fn none_mode_drops_steps() {
        let mut trace = Trace::new(TraceMode::None);
        trace.push(step(ActionTag::Init));
        assert!(trace.is_empty());
    }

    #[test]
    fn summary_mode_keeps_steps_but_drops_nested_index_steps() {
        let mut with_nested = step(ActionTag::Push);
        with_nested.nested_index_steps.push(IndexStep::new("leaf scan"));

        let mut summary = Trace::new(TraceMode::Summary);
        summary.push(with_nested.clone());
        assert_eq!(summary.len(), 1);
        assert!(summary.steps()[0].nested_index_steps.is_empty());

        let mut full = Trace::new(TraceMode::Full);
        full.push(with_nested);
        assert_eq!(full.steps()[0].nested_index_steps.len(), 1);
    }
}
