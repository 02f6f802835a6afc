#![doc = "Distance-keyed index structures: the AB-tree (per-source) and the PB-tree / pivot-reverse index (per-pivot, built from the 2-hop label) - spec.md §4.2/§4.4."]

mod ab_tree;
mod btree;
mod error;
mod pb_tree;

#[cfg(test)]
mod test;

pub use ab_tree::AbTree;
pub use btree::{DistanceTree, RangeIter, TreeEntry};
pub use error::IndexError;
pub use pb_tree::PivotIndex;
