//! Clue and query types (spec.md §3/§4.2): a clue names a keyword, an
//! expected network distance, and a tolerance; a query is a source vertex
//! plus an ordered sequence of clues.

use crate::graph::VertexId;

/// Construction-time validation failures for a [`Clue`] or [`Query`].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ClueError {
    #[error("clue target distance must be positive, got {0}")]
    NonPositiveDistance(f64),

    #[error("clue tolerance must be in (0, 1], got {0}")]
    ToleranceOutOfRange(f64),

    #[error("query must contain at least one clue")]
    EmptyClueList,

    #[error("source vertex {0:?} is not present in the graph")]
    UnknownSource(VertexId),
}

/// A single clue: `(keyword, target distance d, tolerance ε)`.
///
/// Derived: `lD = d(1-ε)`, `rD = d(1+ε)` bound the confidence interval;
/// `m(dist) = |dist - d| / (ε·d)` is the matching distance, in `[0, 1]`
/// iff `dist` falls inside the interval (spec.md §3).
#[derive(Clone, Debug, PartialEq)]
pub struct Clue {
    pub keyword: String,
    pub distance: f64,
    pub tolerance: f64,
}

impl Clue {
    pub fn new(keyword: impl Into<String>, distance: f64, tolerance: f64) -> Result<Self, ClueError> {
        if distance <= 0.0 {
            return Err(ClueError::NonPositiveDistance(distance));
        }
        if !(tolerance > 0.0 && tolerance <= 1.0) {
            return Err(ClueError::ToleranceOutOfRange(tolerance));
        }

        Ok(Clue {
            keyword: keyword.into(),
            distance,
            tolerance,
        })
    }

    /// Lower bound of the clue's confidence interval: `d(1-ε)`.
    #[inline]
    pub fn lower_bound(&self) -> f64 {
        self.distance * (1.0 - self.tolerance)
    }

    /// Upper bound of the clue's confidence interval: `d(1+ε)`.
    #[inline]
    pub fn upper_bound(&self) -> f64 {
        self.distance * (1.0 + self.tolerance)
    }

    /// Matching distance for an observed network distance: normalized
    /// deviation from the clue's target, in `[0, 1]` iff `dist` lies
    /// inside `[lD, rD]`.
    #[inline]
    pub fn matching_distance(&self, dist: f64) -> f64 {
        (dist - self.distance).abs() / (self.tolerance * self.distance)
    }

    /// Whether `dist` lies within the clue's confidence interval.
    #[inline]
    pub fn in_interval(&self, dist: f64) -> bool {
        dist >= self.lower_bound() && dist <= self.upper_bound()
    }
}

/// A query: a source vertex together with an ordered sequence of clues.
#[derive(Clone, Debug)]
pub struct Query {
    pub source: VertexId,
    pub clues: Vec<Clue>,
}

impl Query {
    pub fn new(source: VertexId, clues: Vec<Clue>) -> Result<Self, ClueError> {
        if clues.is_empty() {
            return Err(ClueError::EmptyClueList);
        }
        Ok(Query { source, clues })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.clues.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.clues.is_empty()
    }
}
