use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{Debug, Display, Formatter};

/// Stable identifier for a vertex in the road network.
///
/// Newtype over the raw `u64` per spec.md §3, grounded in the teacher's
/// habit of wrapping entry identifiers (`E: Entry` / `OsmEntryId`) rather
/// than passing bare integers around (`graph/item.rs`).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(pub u64);

impl Debug for VertexId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl Display for VertexId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl From<u64> for VertexId {
    fn from(value: u64) -> Self {
        VertexId(value)
    }
}

/// A case-folded keyword. Folding happens once, at construction, so the
/// keyword index never needs the late-reindex the reference implementation
/// performs (spec.md §9's open question about the rebuild window) -
/// ingesters are required to hand over a vertex's complete keyword set
/// up front.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Keyword(Box<str>);

impl Keyword {
    pub fn new(raw: &str) -> Self {
        Keyword(raw.to_lowercase().into_boxed_str())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Keyword {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Debug for Keyword {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Keyword {
    fn from(value: &str) -> Self {
        Keyword::new(value)
    }
}

impl From<String> for Keyword {
    fn from(value: String) -> Self {
        Keyword::new(&value)
    }
}

/// A road-network vertex: a stable id, a geographic position, and a
/// case-folded keyword set. Immutable once constructed - keyword
/// additions only ever happen at load time (spec.md §3).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub lat: f64,
    pub lon: f64,
    pub(crate) keywords: FxHashSet<Keyword>,
}

impl Vertex {
    pub fn new(id: VertexId, lat: f64, lon: f64, keywords: impl IntoIterator<Item = Keyword>) -> Self {
        Vertex {
            id,
            lat,
            lon,
            keywords: keywords.into_iter().collect(),
        }
    }

    #[inline]
    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.contains(keyword)
    }

    pub fn keywords(&self) -> impl Iterator<Item = &Keyword> {
        self.keywords.iter()
    }

    /// Geographic position as a [`geo::Point`], for Haversine helpers.
    #[inline]
    pub fn point(&self) -> geo::Point<f64> {
        geo::Point::new(self.lon, self.lat)
    }
}
