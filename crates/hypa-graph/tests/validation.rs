use hypa_core::{Hyperedge, Incidence, Node};
use hypa_graph::Hypergraph;

fn base() -> Hypergraph {
    let mut graph = Hypergraph::default();
    for id in ["a", "b", "c"] {
        graph.add_node(Node::new(id, "entity").unwrap());
    }
    graph.add_edge(Hyperedge::from_nodes("e1", "link", ["a", "b"]).unwrap());
    graph
}

#[test]
fn consistent_graph_is_valid() {
    let report = base().validate();
    assert!(report.valid);
    assert!(report.errors.is_empty());
    assert!(report.orphaned_edges.is_empty());
}

#[test]
fn edge_to_missing_node_is_orphaned() {
    let mut graph = base();
    graph.add_edge(Hyperedge::from_nodes("e2", "link", ["a", "ghost"]).unwrap());
    let report = graph.validate();
    assert!(!report.valid);
    assert_eq!(report.orphaned_edges, vec!["e2".to_string()]);
    assert!(report
        .errors
        .iter()
        .any(|msg| msg == "Edge 'e2' references non-existent nodes: [\"ghost\"]"));
}

#[test]
fn edge_ref_to_missing_edge_is_orphaned() {
    let mut graph = base();
    graph.add_edge(
        Hyperedge::new(
            "m",
            "about",
            vec![Incidence::node("c"), Incidence::edge_ref("nope")],
        )
        .unwrap(),
    );
    let report = graph.validate();
    assert_eq!(report.orphaned_edges, vec!["m".to_string()]);
    assert!(report
        .errors
        .iter()
        .any(|msg| msg.contains("references non-existent edges")));
}

#[test]
fn validation_never_mutates() {
    let mut graph = base();
    graph.delete_node("b");
    let before = graph.to_plain();
    let first = graph.validate();
    let second = graph.validate();
    assert_eq!(first, second);
    assert_eq!(graph.to_plain(), before);
}

#[test]
fn cascade_repairs_what_plain_delete_leaves_behind() {
    let mut graph = base();
    graph.delete_node("b");
    assert!(!graph.validate().valid);
    graph.delete_edge("e1");
    assert!(graph.validate().valid);
}
