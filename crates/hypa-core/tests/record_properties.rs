use hypa_core::{Direction, Hyperedge, Incidence, Node, Provenance};
use proptest::prelude::*;

proptest! {
    #[test]
    fn confidence_accepted_iff_in_unit_interval(confidence in -2.0f64..2.0) {
        let result = Provenance::new("source", confidence);
        prop_assert_eq!(result.is_ok(), (0.0..=1.0).contains(&confidence));
    }

    #[test]
    fn node_set_ignores_order_and_duplicates(ids in prop::collection::vec("[a-e]", 1..10)) {
        let edge = Hyperedge::from_nodes("e", "t", ids.clone()).unwrap();
        let mut expected = ids.clone();
        expected.sort();
        expected.dedup();
        let found: Vec<&str> = edge.node_set().into_iter().collect();
        prop_assert_eq!(found, expected.iter().map(String::as_str).collect::<Vec<_>>());
        prop_assert_eq!(edge.nodes().len(), ids.len());
    }

    #[test]
    fn merged_node_keeps_old_only_keys(old in 0i64..100, new in 0i64..100) {
        let stored = Node::new("n", "t").unwrap().with_property("a", old).with_property("b", old);
        let incoming = Node::new("n", "t").unwrap().with_property("b", new);
        let merged = stored.merged_with(&incoming);
        prop_assert_eq!(&merged.properties()["a"], &serde_json::json!(old));
        prop_assert_eq!(&merged.properties()["b"], &serde_json::json!(new));
    }
}

#[test]
fn mixed_direction_edges_split_roles() {
    let edge = Hyperedge::new(
        "e",
        "flow",
        vec![
            Incidence::node("a").with_direction(Direction::Tail),
            Incidence::node("b").with_direction(Direction::Head),
            Incidence::node("c"),
            Incidence::edge_ref("other"),
        ],
    )
    .unwrap();
    assert!(edge.is_directed());
    assert_eq!(edge.tail_nodes(), vec!["a"]);
    assert_eq!(edge.head_nodes(), vec!["b"]);
    assert_eq!(edge.nodes(), vec!["a", "b", "c"]);
    assert_eq!(edge.edge_refs(), vec!["other"]);
}
