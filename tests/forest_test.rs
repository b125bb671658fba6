//! Tests for ForestBuilder

use rstest::{fixture, rstest};
use serde_json::json;

use termgraph::domain::{DomainError, ForestBuilder, Named};
use termgraph::util::testing::init_test_setup;

#[derive(Debug, Clone, PartialEq)]
struct Record {
    id: &'static str,
    broader: Option<&'static str>,
}

impl Named for Record {}

fn record(id: &'static str) -> Record {
    Record { id, broader: None }
}

#[fixture]
fn builder() -> ForestBuilder<Record, String> {
    init_test_setup();
    ForestBuilder::with_identifier(|r: &Record| r.id.to_string())
}

#[rstest]
fn given_root_x_y_records_when_compiling_then_produces_nested_forest() {
    init_test_setup();
    let mut builder: ForestBuilder<String> = ForestBuilder::new();
    builder.add_child("root".into(), "x".into()).unwrap();
    builder.add_child("x".into(), "y".into()).unwrap();

    let forest = builder.compile().unwrap();

    assert_eq!(
        serde_json::to_value(&forest).unwrap(),
        json!({
            "displayName": "root",
            "children": [{
                "id": "root",
                "displayName": "root",
                "payload": "root",
                "children": [{
                    "id": "x",
                    "displayName": "x",
                    "payload": "x",
                    "children": [{
                        "id": "y",
                        "displayName": "y",
                        "payload": "y",
                        "children": []
                    }]
                }]
            }]
        })
    );
}

#[rstest]
#[case::chain(&[("a", "b"), ("b", "c"), ("c", "d")])]
#[case::fan_out(&[("a", "b"), ("a", "c"), ("a", "d")])]
#[case::two_trees(&[("a", "b"), ("x", "y"), ("b", "c"), ("y", "z")])]
#[case::child_before_parent(&[("b", "c"), ("a", "b")])]
fn given_edges_without_repeated_child_when_compiling_then_every_node_has_one_parent(
    mut builder: ForestBuilder<Record, String>,
    #[case] edges: &[(&'static str, &'static str)],
) {
    for &(parent, child) in edges {
        builder.add_child(record(parent), record(child)).unwrap();
    }

    let forest = builder.compile().unwrap();

    assert_eq!(forest.len(), builder.len());
    for (depth, node) in forest.iter() {
        assert!(depth >= 1);
        let registered = builder.get_node(&node.id).unwrap();
        if depth == 1 {
            assert!(registered.parent.is_none(), "{} should be a root", node.id);
        } else {
            let parents = edges.iter().filter(|(_, c)| *c == node.id).count();
            assert_eq!(parents, 1, "{} should have exactly one parent", node.id);
        }
    }
}

#[rstest]
fn given_attached_child_when_equivalent_record_attached_again_then_already_has_parent(
    mut builder: ForestBuilder<Record, String>,
) {
    builder
        .add_child(record("p"), Record { id: "c", broader: Some("p") })
        .unwrap();

    let err = builder
        .add_child(record("q"), Record { id: "c", broader: Some("q") })
        .unwrap_err();

    assert!(matches!(err, DomainError::AlreadyHasParent { .. }));
    let c = builder.get_node(&"c".to_string()).unwrap();
    assert_eq!(c.parent.as_deref(), Some("p"));
    assert_eq!(c.payload.broader, Some("p"));
    let forest = builder.compile().unwrap();
    assert_eq!(forest.find(&"c".to_string()).map(|n| n.children.len()), Some(0));
    assert_eq!(forest.children.len(), 1);
}

#[rstest]
fn given_two_records_with_same_id_when_creating_then_duplicate_id(
    mut builder: ForestBuilder<Record, String>,
) {
    builder.create_node(record("a")).unwrap();

    let err = builder
        .create_node(Record { id: "a", broader: Some("elsewhere") })
        .unwrap_err();

    assert_eq!(err.to_string(), "duplicate node id: a");
}

#[rstest]
fn given_empty_builder_when_compiling_then_root_without_children(
    builder: ForestBuilder<Record, String>,
) {
    let forest = builder.compile().unwrap();

    assert_eq!(forest.display_name, "root");
    assert!(forest.is_empty());
    assert_eq!(forest.depth(), 0);
}

#[rstest]
fn given_explicit_nodes_when_listing_ids_then_insertion_order(
    mut builder: ForestBuilder<Record, String>,
) {
    builder.create_node(record("m")).unwrap();
    builder.add_child(record("a"), record("z")).unwrap();

    assert_eq!(builder.node_ids(), vec!["m", "a", "z"]);
    assert_eq!(builder.roots(), vec!["m", "a"]);
}
