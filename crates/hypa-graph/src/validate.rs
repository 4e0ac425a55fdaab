use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::graph::Hypergraph;
use crate::index::VertexSet;

/// Outcome of a consistency scan. Invalid graphs are data, not errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True when no finding was recorded.
    pub valid: bool,
    /// Human readable findings, in scan order.
    pub errors: Vec<String>,
    /// Edges with at least one incidence naming a missing node or edge.
    pub orphaned_edges: Vec<String>,
}

impl Hypergraph {
    /// Scans records and indexes for dangling references and index drift.
    pub fn validate(&self) -> ValidationReport {
        let mut errors = Vec::new();
        let mut orphaned_edges = Vec::new();
        self.check_incidences(&mut errors, &mut orphaned_edges);
        self.check_index_entries(&mut errors);
        self.check_index_coverage(&mut errors);
        ValidationReport {
            valid: errors.is_empty(),
            errors,
            orphaned_edges,
        }
    }

    fn check_incidences(&self, errors: &mut Vec<String>, orphaned: &mut Vec<String>) {
        for (edge_id, edge) in self.edge_map() {
            let missing_nodes: Vec<&str> = edge
                .nodes()
                .into_iter()
                .filter(|node| !self.has_node(node))
                .collect();
            let missing_refs: Vec<&str> = edge
                .edge_refs()
                .into_iter()
                .filter(|target| !self.has_edge(target))
                .collect();
            if !missing_nodes.is_empty() {
                errors.push(format!(
                    "Edge '{edge_id}' references non-existent nodes: {missing_nodes:?}"
                ));
            }
            if !missing_refs.is_empty() {
                errors.push(format!(
                    "Edge '{edge_id}' references non-existent edges: {missing_refs:?}"
                ));
            }
            if !missing_nodes.is_empty() || !missing_refs.is_empty() {
                orphaned.push(edge_id.clone());
            }
        }
    }

    /// Every id named by an index bucket must exist in the primary maps.
    fn check_index_entries(&self, errors: &mut Vec<String>) {
        let index = &self.index;
        for (node_id, edge_ids) in &index.node_edges {
            if !self.has_node(node_id) {
                errors.push(format!(
                    "Node-to-edges index contains non-existent node: '{node_id}'"
                ));
            }
            for edge_id in edge_ids.iter().filter(|id| !self.has_edge(id)) {
                errors.push(format!(
                    "Node-to-edges index for '{node_id}' references non-existent edge: '{edge_id}'"
                ));
            }
        }
        for (target, referrers) in &index.edge_refs {
            if !self.has_edge(target) {
                errors.push(format!(
                    "Edge-to-edges index contains non-existent referenced edge: '{target}'"
                ));
            }
            for edge_id in referrers.iter().filter(|id| !self.has_edge(id)) {
                errors.push(format!(
                    "Edge-to-edges index for '{target}' references non-existent edge: '{edge_id}'"
                ));
            }
        }
        for (target, referrers) in &index.detached_refs {
            if self.has_edge(target) {
                errors.push(format!(
                    "Detached-reference index holds existing edge: '{target}'"
                ));
            }
            for edge_id in referrers.iter().filter(|id| !self.has_edge(id)) {
                errors.push(format!(
                    "Detached-reference index for '{target}' references non-existent edge: '{edge_id}'"
                ));
            }
        }
        for (node_type, node_ids) in &index.nodes_by_type {
            for node_id in node_ids.iter().filter(|id| !self.has_node(id)) {
                errors.push(format!(
                    "Nodes-by-type index for '{node_type}' contains non-existent node: '{node_id}'"
                ));
            }
        }
        for (edge_type, edge_ids) in &index.edges_by_type {
            for edge_id in edge_ids.iter().filter(|id| !self.has_edge(id)) {
                errors.push(format!(
                    "Edges-by-type index for '{edge_type}' contains non-existent edge: '{edge_id}'"
                ));
            }
        }
        for (key, edge_ids) in &index.vertex_sets {
            for edge_id in edge_ids {
                match self.get_edge(edge_id) {
                    None => errors.push(format!(
                        "Vertex-set index for {:?} references non-existent edge: '{edge_id}'",
                        key.as_slice()
                    )),
                    Some(edge) if VertexSet::of(edge) != *key => errors.push(format!(
                        "Vertex-set index for {:?} holds edge '{edge_id}' with a different vertex set",
                        key.as_slice()
                    )),
                    Some(_) => {}
                }
            }
        }
        report_empty_buckets("Nodes-by-type", &index.nodes_by_type, errors);
        report_empty_buckets("Edges-by-type", &index.edges_by_type, errors);
        report_empty_buckets("Node-to-edges", &index.node_edges, errors);
        report_empty_buckets("Edge-to-edges", &index.edge_refs, errors);
        report_empty_buckets("Detached-reference", &index.detached_refs, errors);
        if index.vertex_sets.values().any(BTreeSet::is_empty) {
            errors.push("Vertex-set index contains an empty bucket".to_string());
        }
    }

    /// Every stored record must be present in the buckets that describe it.
    fn check_index_coverage(&self, errors: &mut Vec<String>) {
        let index = &self.index;
        for (node_id, node) in self.node_map() {
            if !bucket_contains(&index.nodes_by_type, node.node_type(), node_id) {
                errors.push(format!(
                    "Node '{node_id}' is missing from the nodes-by-type index for '{}'",
                    node.node_type()
                ));
            }
        }
        for (edge_id, edge) in self.edge_map() {
            if !bucket_contains(&index.edges_by_type, edge.edge_type(), edge_id) {
                errors.push(format!(
                    "Edge '{edge_id}' is missing from the edges-by-type index for '{}'",
                    edge.edge_type()
                ));
            }
            for node_id in edge.node_set() {
                if !bucket_contains(&index.node_edges, node_id, edge_id) {
                    errors.push(format!(
                        "Edge '{edge_id}' is missing from the node-to-edges index for '{node_id}'"
                    ));
                }
            }
            for target in edge.edge_refs() {
                if self.has_edge(target) && !bucket_contains(&index.edge_refs, target, edge_id) {
                    errors.push(format!(
                        "Edge '{edge_id}' is missing from the edge-to-edges index for '{target}'"
                    ));
                }
            }
            let key = VertexSet::of(edge);
            let indexed = index
                .vertex_sets
                .get(&key)
                .is_some_and(|ids| ids.contains(edge_id));
            if !key.is_empty() && !indexed {
                errors.push(format!(
                    "Edge '{edge_id}' is missing from the vertex-set index"
                ));
            }
        }
    }
}

fn bucket_contains(buckets: &BTreeMap<String, BTreeSet<String>>, key: &str, id: &str) -> bool {
    buckets.get(key).is_some_and(|ids| ids.contains(id))
}

fn report_empty_buckets(
    label: &str,
    buckets: &BTreeMap<String, BTreeSet<String>>,
    errors: &mut Vec<String>,
) {
    for (key, ids) in buckets {
        if ids.is_empty() {
            errors.push(format!("{label} index contains an empty bucket for '{key}'"));
        }
    }
}
