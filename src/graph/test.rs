use crate::graph::{EdgeRecord, Graph, VertexId, VertexRecord};

fn vr(id: u64, lat: f64, lon: f64, keywords: &[&str]) -> VertexRecord {
    VertexRecord {
        id: VertexId(id),
        lat,
        lon,
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

fn line_graph() -> Graph {
    // A -> B -> C, undirected roads as two edges each, per spec.md §3.
    let vertices = vec![
        vr(1, 0.0, 0.0, &["start"]),
        vr(2, 0.0, 1.0, &["p"]),
        vr(3, 0.0, 2.0, &["q"]),
    ];
    let edges = vec![
        er(1, 2, 100.0),
        er(2, 1, 100.0),
        er(2, 3, 150.0),
        er(3, 2, 150.0),
    ];
    Graph::build(vertices, edges).unwrap()
}

#[test]
fn network_distance_matches_manual_sum() {
    let graph = line_graph();
    assert_eq!(graph.network_distance(VertexId(1), VertexId(2)), 100.0);
    assert_eq!(graph.network_distance(VertexId(1), VertexId(3)), 250.0);
}

#[test]
fn unreachable_is_infinite() {
    let vertices = vec![vr(1, 0.0, 0.0, &[]), vr(2, 0.0, 1.0, &[])];
    let graph = Graph::build(vertices, vec![]).unwrap();
    assert_eq!(
        graph.network_distance(VertexId(1), VertexId(2)),
        f64::INFINITY
    );
    let (d, path) = graph.shortest_path(VertexId(1), VertexId(2));
    assert_eq!(d, f64::INFINITY);
    assert!(path.is_empty());
}

#[test]
fn symmetry_holds_for_undirected_input() {
    let graph = line_graph();
    assert_eq!(
        graph.network_distance(VertexId(1), VertexId(3)),
        graph.network_distance(VertexId(3), VertexId(1))
    );
}

#[test]
fn triangle_inequality() {
    let graph = line_graph();
    let d_ac = graph.network_distance(VertexId(1), VertexId(3));
    let d_ab = graph.network_distance(VertexId(1), VertexId(2));
    let d_bc = graph.network_distance(VertexId(2), VertexId(3));
    assert!(d_ac <= d_ab + d_bc + 1e-9);
}

#[test]
fn memoization_agrees_with_fresh_computation() {
    let graph = line_graph();
    let first = graph.network_distance(VertexId(1), VertexId(3));
    assert!(graph.cache_len() > 0);
    let second = graph.network_distance(VertexId(1), VertexId(3));
    assert_eq!(first, second);
}

#[test]
fn shortest_path_reconstructs_vertex_sequence() {
    let graph = line_graph();
    let (distance, path) = graph.shortest_path(VertexId(1), VertexId(3));
    assert_eq!(distance, 250.0);
    assert_eq!(path, vec![VertexId(1), VertexId(2), VertexId(3)]);
}

#[test]
fn vertices_with_keyword_finds_matches() {
    let graph = line_graph();
    let matches: Vec<_> = graph.vertices_with_keyword("p").collect();
    assert_eq!(matches, vec![VertexId(2)]);
    assert_eq!(graph.vertices_with_keyword("missing").count(), 0);
}

#[test]
fn duplicate_vertex_rejected() {
    let vertices = vec![vr(1, 0.0, 0.0, &[]), vr(1, 0.0, 1.0, &[])];
    assert!(Graph::build(vertices, vec![]).is_err());
}

#[test]
fn unknown_edge_endpoint_rejected() {
    let vertices = vec![vr(1, 0.0, 0.0, &[])];
    let edges = vec![er(1, 2, 10.0)];
    assert!(Graph::build(vertices, edges).is_err());
}

#[test]
fn non_positive_weight_rejected() {
    let vertices = vec![vr(1, 0.0, 0.0, &[]), vr(2, 0.0, 1.0, &[])];
    let edges = vec![er(1, 2, 0.0)];
    assert!(Graph::build(vertices, edges).is_err());
}

#[test]
fn clear_cache_releases_entries() {
    let graph = line_graph();
    graph.network_distance(VertexId(1), VertexId(3));
    assert!(graph.cache_len() > 0);
    graph.clear_cache();
    assert_eq!(graph.cache_len(), 0);
}
