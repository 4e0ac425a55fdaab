use hypa_core::errors::{ErrorInfo, HypaError};
use hypa_core::rng::RngHandle;
use hypa_core::{Hyperedge, Node};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::flags::HypergraphConfig;
use crate::graph::Hypergraph;

const FALLBACK_TYPE: &str = "entity";

/// Generates a random hypergraph with deterministic randomness.
///
/// Nodes are named `n0..n{n_nodes}` and edges `e0..e{n_edges}`. Each edge
/// connects `arity` distinct nodes (capped at `n_nodes`); node and edge types
/// are drawn from `types`, or `"entity"` when it is empty.
pub fn gen_random_hypergraph(
    n_nodes: usize,
    n_edges: usize,
    arity: usize,
    types: &[&str],
    rng: &mut RngHandle,
) -> Result<Hypergraph, HypaError> {
    if n_nodes == 0 {
        return Err(HypaError::Validation(ErrorInfo::new(
            "empty-graph",
            "random hypergraph generator requires at least one node",
        )));
    }
    let mut graph = Hypergraph::new(HypergraphConfig::default());
    let node_ids: Vec<String> = (0..n_nodes).map(|i| format!("n{i}")).collect();
    for node_id in &node_ids {
        graph.add_node(Node::new(node_id.as_str(), pick_type(types, rng))?);
    }

    let arity = arity.clamp(1, n_nodes);
    for edge_index in 0..n_edges {
        let members = sample_subset(&node_ids, arity, rng);
        let edge = Hyperedge::from_nodes(format!("e{edge_index}"), pick_type(types, rng), members)?;
        graph.add_edge(edge);
    }
    Ok(graph)
}

fn pick_type<'a>(types: &[&'a str], rng: &mut RngHandle) -> &'a str {
    if types.is_empty() {
        return FALLBACK_TYPE;
    }
    types[rng.gen_range(0..types.len())]
}

fn sample_subset(nodes: &[String], count: usize, rng: &mut RngHandle) -> Vec<String> {
    let mut buffer: Vec<String> = nodes
        .choose_multiple(rng, count.min(nodes.len()))
        .cloned()
        .collect();
    buffer.sort();
    buffer
}
