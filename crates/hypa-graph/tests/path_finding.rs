use hypa_core::{Direction, Hyperedge, Incidence, Node};
use hypa_graph::{DirectionMode, Hypergraph, PathDefaults, PathQuery};

fn build(edges: Vec<Hyperedge>) -> Hypergraph {
    let mut graph = Hypergraph::default();
    for edge in &edges {
        for id in edge.node_set() {
            graph.add_node(Node::new(id, "entity").unwrap());
        }
    }
    for edge in edges {
        graph.add_edge(edge);
    }
    graph
}

fn edge(id: &str, kind: &str, nodes: &[&str]) -> Hyperedge {
    Hyperedge::from_nodes(id, kind, nodes.iter().copied()).unwrap()
}

fn directed(id: &str, tails: &[&str], heads: &[&str]) -> Hyperedge {
    let incidences = tails
        .iter()
        .map(|n| Incidence::node(*n).with_direction(Direction::Tail))
        .chain(
            heads
                .iter()
                .map(|n| Incidence::node(*n).with_direction(Direction::Head)),
        )
        .collect();
    Hyperedge::new(id, "flow", incidences).unwrap()
}

fn ids(paths: &[Vec<&Hyperedge>]) -> Vec<Vec<String>> {
    paths
        .iter()
        .map(|path| path.iter().map(|edge| edge.id().to_string()).collect())
        .collect()
}

fn sample_graph() -> Hypergraph {
    build(vec![
        edge("e1", "link", &["A", "B"]),
        edge("e2", "fk", &["B", "C", "D"]),
    ])
}

#[test]
fn single_shared_node_connects_two_edges() {
    let graph = sample_graph();
    let query = PathQuery::new(["A"], ["D"]).min_intersection(1).max_hops(2);
    let paths = graph.find_paths(&query);
    assert_eq!(ids(&paths), vec![vec!["e1".to_string(), "e2".to_string()]]);
}

#[test]
fn higher_intersection_threshold_blocks_the_path() {
    let graph = sample_graph();
    let query = PathQuery::new(["A"], ["D"]).min_intersection(2).max_hops(2);
    assert!(graph.find_paths(&query).is_empty());
}

#[test]
fn max_hops_bounds_path_length() {
    let graph = build(vec![
        edge("e1", "link", &["A", "B"]),
        edge("e2", "link", &["B", "C"]),
        edge("e3", "link", &["C", "D"]),
    ]);
    let short = PathQuery::new(["A"], ["D"]).max_hops(2);
    assert!(graph.find_paths(&short).is_empty());
    let long = PathQuery::new(["A"], ["D"]).max_hops(3);
    assert_eq!(graph.find_paths(&long).len(), 1);
}

#[test]
fn empty_start_or_target_returns_nothing() {
    let graph = sample_graph();
    assert!(graph.find_paths(&PathQuery::new(["Z"], ["D"])).is_empty());
    assert!(graph.find_paths(&PathQuery::new(["A"], ["Z"])).is_empty());
    assert!(graph
        .find_paths(&PathQuery::new(["A"], ["D"]).max_paths(0))
        .is_empty());
}

#[test]
fn edge_type_filter_prunes_traversal() {
    let graph = build(vec![
        edge("e1", "link", &["A", "B"]),
        edge("e2", "fk", &["B", "C"]),
        edge("e3", "link", &["B", "X"]),
        edge("e4", "link", &["X", "C"]),
    ]);
    let query = PathQuery::new(["A"], ["C"]).edge_types(["link"]);
    let paths = graph.find_paths(&query);
    assert_eq!(
        ids(&paths),
        vec![vec!["e1".to_string(), "e3".to_string(), "e4".to_string()]]
    );

    let unfiltered = graph.find_paths(&PathQuery::new(["A"], ["C"]));
    assert_eq!(
        ids(&unfiltered),
        vec![
            vec!["e1".to_string(), "e2".to_string()],
            vec!["e1".to_string(), "e3".to_string(), "e4".to_string()],
        ]
    );
}

#[test]
fn forward_and_backward_follow_head_tail_roles() {
    // A -> B, then B -> C
    let graph = build(vec![
        directed("f1", &["A"], &["B"]),
        directed("f2", &["B"], &["C"]),
    ]);
    let forward = PathQuery::new(["A"], ["C"]).direction_mode(DirectionMode::Forward);
    assert_eq!(graph.find_paths(&forward).len(), 1);

    let backward = PathQuery::new(["A"], ["C"]).direction_mode(DirectionMode::Backward);
    assert!(graph.find_paths(&backward).is_empty());

    let reversed = PathQuery::new(["C"], ["A"]).direction_mode(DirectionMode::Backward);
    assert_eq!(graph.find_paths(&reversed).len(), 1);
}

#[test]
fn undirected_edges_fall_back_to_full_node_sets_in_forward_mode() {
    let graph = build(vec![
        directed("f1", &["A"], &["B"]),
        edge("u1", "link", &["B", "C"]),
    ]);
    let query = PathQuery::new(["A"], ["C"]).direction_mode(DirectionMode::Forward);
    assert_eq!(graph.find_paths(&query).len(), 1);
}

#[test]
fn unknown_direction_mode_is_a_domain_error() {
    let err = PathQuery::new(["A"], ["D"])
        .direction_mode_str("diagonal")
        .unwrap_err();
    assert_eq!(err.code(), "invalid-direction-mode");
    assert_eq!(err.info().context["direction_mode"], "diagonal");
}

#[test]
fn visited_edges_are_not_shared_between_branches() {
    let graph = build(vec![
        edge("s1", "link", &["A", "B"]),
        edge("s2", "link", &["A", "C"]),
        edge("mid", "link", &["B", "C", "M"]),
        edge("end", "link", &["M", "Z"]),
    ]);
    let paths = graph.find_paths(&PathQuery::new(["A"], ["Z"]).max_paths(10));
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].len(), 3);
}

#[test]
fn max_paths_stops_the_search_early() {
    let graph = build(vec![
        edge("s1", "link", &["A", "Z"]),
        edge("s2", "link", &["A", "Y", "Z"]),
        edge("s3", "link", &["A", "Z", "X"]),
    ]);
    let paths = graph.find_paths(&PathQuery::new(["A"], ["Z"]).max_paths(2));
    assert_eq!(paths.len(), 2);
}

#[test]
fn graph_config_seeds_query_defaults() {
    let graph = sample_graph();
    let query = graph.path_query(["A"], ["D"]);
    assert_eq!(
        (query.min_intersection, query.max_hops, query.max_paths),
        (1, 4, 10)
    );
    let custom = PathQuery::with_defaults(
        ["A"],
        ["D"],
        PathDefaults {
            min_intersection: 2,
            max_hops: 1,
            max_paths: 1,
        },
    );
    assert!(graph.find_paths(&custom).is_empty());
}
