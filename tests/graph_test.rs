//! Tests for WeightedGraph distance compilation

use rstest::rstest;

use termgraph::domain::{WeightedGraph, UNREACHABLE};
use termgraph::util::testing::init_test_setup;

fn build(edges: &[(&'static str, &'static str)], isolated: &[&'static str]) -> WeightedGraph<&'static str> {
    init_test_setup();
    let mut graph = WeightedGraph::new();
    for &(a, b) in edges {
        graph.add_edge(a, b).unwrap();
    }
    for &node in isolated {
        graph.create_node(node).unwrap();
    }
    graph
}

#[rstest]
#[case::path(&[("a", "b"), ("b", "c")], &[])]
#[case::triangle(&[("a", "b"), ("b", "c"), ("c", "a"), ("a", "b")], &[])]
#[case::star(&[("hub", "a"), ("hub", "b"), ("hub", "c"), ("hub", "a")], &["lonely"])]
#[case::components(&[("a", "b"), ("x", "y"), ("y", "z")], &["q"])]
fn given_graph_when_compiling_then_matrix_symmetric_with_zero_diagonal(
    #[case] edges: &[(&'static str, &'static str)],
    #[case] isolated: &[&'static str],
) {
    let compiled = build(edges, isolated).compile();

    assert!(compiled.is_symmetric());
    for i in 0..compiled.len() {
        assert_eq!(compiled.matrix[i][i], 0);
        assert_eq!(compiled.matrix[i].len(), compiled.len());
    }
}

#[test]
fn given_two_edges_when_one_repeated_then_distance_follows_multiplicity() {
    let before = build(&[("A", "B"), ("B", "C")], &[]).compile();
    assert_eq!(before.distance(&"A", &"C"), Some(2));
    assert_eq!(before.distance(&"A", &"B"), Some(1));

    let after = build(&[("A", "B"), ("B", "C"), ("A", "B")], &[]).compile();
    assert_eq!(after.distance(&"A", &"B"), Some(2));
    assert_eq!(after.distance(&"A", &"C"), Some(3));
}

#[test]
fn given_node_without_edges_when_compiling_then_off_diagonal_is_unreachable() {
    let compiled = build(&[("a", "b"), ("b", "c")], &["solo"]).compile();
    let i = compiled.index_of(&"solo").unwrap();

    for j in 0..compiled.len() {
        if i != j {
            assert_eq!(compiled.matrix[i][j], UNREACHABLE);
            assert_eq!(compiled.matrix[j][i], UNREACHABLE);
        }
    }
}

#[test]
fn given_compiled_matrix_when_serialized_then_ids_and_matrix_keys() {
    let compiled = build(&[("a", "b")], &["c"]).compile();

    let value = serde_json::to_value(&compiled).unwrap();

    assert_eq!(
        value,
        serde_json::json!({
            "ids": ["a", "b", "c"],
            "matrix": [[0, 1, -1], [1, 0, -1], [-1, -1, 0]]
        })
    );
}

#[test]
fn given_long_chain_when_compiling_then_distances_are_hop_counts() {
    let names = ["n0", "n1", "n2", "n3", "n4", "n5", "n6", "n7"];
    let edges: Vec<(&'static str, &'static str)> = names.windows(2).map(|w| (w[0], w[1])).collect();

    let compiled = build(&edges, &[]).compile();

    for (i, a) in names.iter().enumerate() {
        for (j, b) in names.iter().enumerate() {
            let expected = (i as i64 - j as i64).abs();
            assert_eq!(compiled.distance(a, b), Some(expected), "{a} -> {b}");
        }
    }
}
