use crate::clue::ClueError;
use crate::graph::GraphError;
use crate::index::IndexError;
use crate::label::LabelError;

/// Construction- and query-time errors surfaced by the public API.
///
/// Per spec.md §7: construction-time errors (`InvalidGraph`) are fatal to
/// [`crate::session::Session`] initialisation. Query-time conditions never
/// panic; infeasibility and iteration caps are not errors, they are
/// [`crate::solver::SearchResult`]s the caller inspects.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] ClueError),

    #[error("invalid graph: {0}")]
    InvalidGraph(#[from] GraphError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("label error: {0}")]
    Label(#[from] LabelError),
}

pub type Result<T> = std::result::Result<T, Error>;
