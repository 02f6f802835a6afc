use crate::graph::VertexId;

/// Construction-time failures for [`super::Graph`]. Per spec.md §7 these
/// are fatal to session initialisation - unlike query-time conditions,
/// they are allowed to stop the caller in its tracks.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("duplicate vertex id {0:?}")]
    DuplicateVertex(VertexId),

    #[error("edge references unknown vertex {0:?}")]
    UnknownEndpoint(VertexId),

    #[error("edge weight must be positive, got {0}")]
    NonPositiveWeight(f64),
}
