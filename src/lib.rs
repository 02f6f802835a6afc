//! Clue-based route search (CRS): given a source vertex and an ordered
//! sequence of clues - keyword, expected network distance, tolerance -
//! find a path that visits one vertex per clue within its distance
//! window, minimizing the worst per-hop deviation.
//!
//! The query-time engine is layered as: the road-network [`graph`] with
//! its keyword index and shortest-path service; the [`index`] structures
//! (AB-tree, PB-tree) and the [`label`] 2-hop index that accelerate
//! candidate search; the [`findnext`] primitive shared by all solvers;
//! the [`solver`] implementations (GCS, CDP, BAB); and [`session`], which
//! owns everything and dispatches queries.

#![allow(clippy::too_many_arguments)]

pub mod clue;
pub mod config;
pub mod error;
pub mod findnext;
pub mod graph;
pub mod index;
pub mod label;
pub mod session;
pub mod solver;
pub mod trace;

pub use clue::{Clue, ClueError, Query};
pub use config::SessionConfig;
pub use error::{Error, Result};
pub use graph::{EdgeRecord, Graph, GraphError, Keyword, Vertex, VertexId, VertexRecord};
pub use session::{FindNextKind, Session, SharedSession, SolverKind};
pub use solver::SearchResult;
pub use trace::{ActionTag, Trace, TraceMode, TraceStep};
