use super::*;
use crate::graph::{EdgeRecord, Graph, VertexId, VertexRecord};
use crate::label::{PivotOrder, TwoHopLabel};

use rustc_hash::FxHashSet;

fn vr(id: u64, keywords: &[&str]) -> VertexRecord {
    VertexRecord {
        id: VertexId(id),
        lat: 0.0,
        lon: id as f64,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

fn er(from: u64, to: u64, weight: f64) -> EdgeRecord {
    EdgeRecord {
        from: VertexId(from),
        to: VertexId(to),
        weight_meters: weight,
    }
}

// 1 -- 2 -- 3 -- 4 -- 5, bidirectional, unit weights, "cafe" on 2 and 4.
fn line_graph() -> Graph {
    let vertices = vec![
        vr(1, &[]),
        vr(2, &["cafe"]),
        vr(3, &[]),
        vr(4, &["cafe"]),
        vr(5, &["museum"]),
    ];
    let edges = vec![
        er(1, 2, 1.0),
        er(2, 1, 1.0),
        er(2, 3, 1.0),
        er(3, 2, 1.0),
        er(3, 4, 1.0),
        er(4, 3, 1.0),
        er(4, 5, 1.0),
        er(5, 4, 1.0),
    ];
    Graph::build(vertices, edges).unwrap()
}

#[test]
fn ab_tree_predecessor_and_successor_quirk() {
    let graph = line_graph();
    let tree = AbTree::build(&graph, VertexId(1), 4).unwrap();
    let excluded = FxHashSet::default();

    // Distances from 1: 2 -> 1, 3 -> 2, 4 -> 3, 5 -> 4.
    let pred = tree.predecessor(2.5, "cafe", &excluded).unwrap();
    assert_eq!(pred.vertex, VertexId(2));

    // successor() is documented to be the same "largest <= bound" operation.
    let succ = tree.successor(3.5, "cafe", &excluded).unwrap();
    assert_eq!(succ.vertex, VertexId(4));
}

#[test]
fn ab_tree_excludes_and_misses_absent_keyword() {
    let graph = line_graph();
    let tree = AbTree::build(&graph, VertexId(1), 4).unwrap();

    let mut excluded = FxHashSet::default();
    excluded.insert(VertexId(4));
    let pred = tree.predecessor(10.0, "cafe", &excluded).unwrap();
    assert_eq!(pred.vertex, VertexId(2));

    let empty = FxHashSet::default();
    assert!(tree.predecessor(10.0, "stadium", &empty).is_none());
}

#[test]
fn ab_tree_range_is_ascending_and_bounded() {
    let graph = line_graph();
    let tree = AbTree::build(&graph, VertexId(1), 4).unwrap();

    let hits: Vec<VertexId> = tree.range(0.0, 3.0, "cafe").map(|e| e.vertex).collect();
    assert_eq!(hits, vec![VertexId(2), VertexId(4)]);
}

#[test]
fn ab_tree_range_excludes_entries_below_min_d_in_the_starting_leaf() {
    let graph = line_graph();
    // order=2 packs cafe@d1 and cafe@d3 into the same leaf, so a naive
    // "descend to the leaf covering min_d, then take everything <= max_d"
    // scan would wrongly include the d1 entry too.
    let tree = AbTree::build(&graph, VertexId(1), 2).unwrap();

    let hits: Vec<VertexId> = tree.range(2.0, 10.0, "cafe").map(|e| e.vertex).collect();
    assert_eq!(hits, vec![VertexId(4)]);
}

#[test]
fn ab_tree_keyword_union_invariant_holds() {
    let graph = line_graph();
    let tree = AbTree::build(&graph, VertexId(1), 2).unwrap();
    assert!(tree.tree().check_keyword_union_invariant());
}

#[test]
fn pivot_index_covers_every_vertex_with_keywords() {
    let graph = line_graph();
    let label = TwoHopLabel::build(&graph, PivotOrder::DegreeDesc, 1e-3).unwrap();
    let pivots = PivotIndex::build(&graph, &label, 4).unwrap();

    assert!(pivots.pivot_count() > 0);

    // Every labelled pivot for vertex 2 must have a tree reachable and
    // containing vertex 2 at the right distance.
    for entry in label.label(VertexId(2)) {
        let tree = pivots.tree(entry.pivot).expect("pivot tree must exist");
        let hit = tree.largest_at_most(entry.distance, "cafe", &FxHashSet::default());
        assert!(hit.is_some(), "pivot {:?} tree missing vertex 2", entry.pivot);
    }
}
