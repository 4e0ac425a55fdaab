use std::collections::{BTreeMap, BTreeSet};

use hypa_core::errors::{ErrorInfo, HypaError};
use hypa_core::{Hyperedge, Incidence, Node, Properties, Provenance};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::flags::HypergraphConfig;
use crate::index::{IndexSet, VertexSet};

/// Caller supplied merge step for upserts: `(existing, incoming) -> merged`.
///
/// The merged edge must keep the id of the existing edge.
pub type MergeFn<'a> = &'a dyn Fn(&Hyperedge, &Hyperedge) -> Result<Hyperedge, HypaError>;

/// Hypergraph records plus their derived indexes.
///
/// This is the unsynchronized core: every operation assumes exclusive access
/// and never locks. [`HypergraphStore`](crate::HypergraphStore) wraps it in a
/// mutex for shared use, and [`Batch`](crate::Batch) hands it out for
/// multi-operation critical sections.
#[derive(Debug, Clone, Default)]
pub struct Hypergraph {
    config: HypergraphConfig,
    nodes: BTreeMap<String, Node>,
    edges: BTreeMap<String, Hyperedge>,
    pub(crate) index: IndexSet,
}

/// Record and per-type counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    /// Number of nodes.
    pub num_nodes: usize,
    /// Number of hyperedges.
    pub num_edges: usize,
    /// Node count per node type.
    pub nodes_by_type: BTreeMap<String, usize>,
    /// Edge count per edge type.
    pub edges_by_type: BTreeMap<String, usize>,
}

impl Hypergraph {
    /// Creates an empty hypergraph with the provided configuration.
    pub fn new(config: HypergraphConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Returns the configuration used by this graph.
    pub fn config(&self) -> &HypergraphConfig {
        &self.config
    }

    // ----- nodes -----

    /// Inserts or overwrites a node by id.
    pub fn add_node(&mut self, node: Node) {
        if let Some(existing) = self.nodes.remove(node.id()) {
            self.index.unindex_node(&existing);
        }
        self.index.index_node(&node);
        self.nodes.insert(node.id().to_string(), node);
    }

    /// Removes a node without touching the edges that reference it.
    ///
    /// Edges keep their now dangling incidences until they are deleted or
    /// rewritten; [`Hypergraph::validate`] reports them.
    pub fn delete_node(&mut self, node_id: &str) -> bool {
        let Some(node) = self.nodes.remove(node_id) else {
            return false;
        };
        self.index.unindex_node(&node);
        true
    }

    /// Removes a node together with every hyperedge incident on it.
    ///
    /// Returns `(node_deleted, edges_deleted)`; a missing node yields
    /// `(false, 0)` and changes nothing.
    pub fn delete_node_cascade(&mut self, node_id: &str) -> (bool, usize) {
        if !self.nodes.contains_key(node_id) {
            return (false, 0);
        }
        let incident: Vec<String> = self
            .index
            .edges_of(node_id)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default();
        let edges_deleted = incident
            .iter()
            .filter(|edge_id| self.delete_edge(edge_id))
            .count();
        let node_deleted = self.delete_node(node_id);
        tracing::debug!(node_id, edges_deleted, "cascade deleted node");
        (node_deleted, edges_deleted)
    }

    /// Inserts the node, or updates the stored one.
    ///
    /// With `merge_properties` the stored properties are kept underneath the
    /// incoming ones; otherwise the incoming property map replaces them.
    pub fn upsert_node(&mut self, node: Node, merge_properties: bool) -> Node {
        let updated = match self.nodes.get(node.id()) {
            Some(existing) if merge_properties => existing.merged_with(&node),
            _ => node,
        };
        self.add_node(updated.clone());
        updated
    }

    /// Returns the node with the given id.
    pub fn get_node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    /// Returns whether the node exists.
    pub fn has_node(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    /// Returns the nodes of a given type.
    pub fn get_nodes_by_type(&self, node_type: &str) -> Vec<&Node> {
        self.index
            .nodes_by_type
            .get(node_type)
            .into_iter()
            .flatten()
            .filter_map(|id| self.nodes.get(id))
            .collect()
    }

    /// Returns the nodes whose properties contain every given key/value pair.
    pub fn find_nodes(&self, properties: &Properties) -> Vec<&Node> {
        self.nodes
            .values()
            .filter(|node| matches_properties(node.properties(), properties))
            .collect()
    }

    /// Iterates over every node in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ----- edges -----

    /// Inserts or overwrites a hyperedge by id.
    ///
    /// On overwrite only the index buckets whose membership changes are
    /// touched. Referenced nodes are not auto-created.
    pub fn add_edge(&mut self, edge: Hyperedge) {
        match self.edges.remove(edge.id()) {
            Some(existing) => self.index.reindex_edge(&existing, &edge),
            None => {
                self.index.index_edge(&edge);
                self.index.reattach_referenced(edge.id());
            }
        }
        self.edges.insert(edge.id().to_string(), edge);
    }

    /// Removes a hyperedge from the records and from every index.
    ///
    /// Edges that referenced it keep a dangling edge-ref incidence, which
    /// [`Hypergraph::validate`] reports.
    pub fn delete_edge(&mut self, edge_id: &str) -> bool {
        let Some(edge) = self.edges.remove(edge_id) else {
            return false;
        };
        self.index.unindex_edge(&edge);
        let referrers = self.index.detach_referenced(edge_id);
        if referrers > 0 {
            tracing::debug!(edge_id, referrers, "deleted edge was referenced by other edges");
        }
        true
    }

    /// Inserts the edge, or replaces the stored one.
    ///
    /// When `merge` is given and the edge exists, the merged result is
    /// computed before any state changes; a failing merge leaves the graph
    /// untouched and its error is returned unchanged.
    pub fn upsert_edge(
        &mut self,
        edge: Hyperedge,
        merge: Option<MergeFn<'_>>,
    ) -> Result<Hyperedge, HypaError> {
        let final_edge = match (self.edges.get(edge.id()), merge) {
            (Some(existing), Some(merge)) => {
                let merged = merge(existing, &edge)?;
                if merged.id() != existing.id() {
                    return Err(HypaError::Validation(
                        ErrorInfo::new("merge-id-mismatch", "merge result must keep the edge id")
                            .with_context("expected", existing.id())
                            .with_context("found", merged.id()),
                    ));
                }
                tracing::debug!(edge_id = existing.id(), "merged hyperedge on upsert");
                merged
            }
            _ => edge,
        };
        self.add_edge(final_edge.clone());
        Ok(final_edge)
    }

    /// Upserts the hyperedge identified by its exact vertex set and type.
    ///
    /// An existing `(vertex set, type)` match keeps its id and goes through
    /// [`Hypergraph::upsert_edge`]; otherwise a new edge with a random id is
    /// inserted.
    pub fn upsert_edge_by_node_set<I, S>(
        &mut self,
        node_ids: I,
        edge_type: &str,
        properties: Properties,
        merge: Option<MergeFn<'_>>,
        provenance: Provenance,
    ) -> Result<Hyperedge, HypaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let key = VertexSet::new(node_ids);
        let existing_id = self
            .get_edge_by_node_set(key.as_slice(), Some(edge_type))
            .map(|edge| edge.id().to_string());
        let id = existing_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let incidences = key.as_slice().iter().map(Incidence::node).collect();
        let edge = Hyperedge::new(id, edge_type, incidences)?
            .with_properties(properties)
            .with_provenance(provenance);
        match existing_id {
            Some(_) => self.upsert_edge(edge, merge),
            None => {
                self.add_edge(edge.clone());
                Ok(edge)
            }
        }
    }

    /// Returns the hyperedge with the given id.
    pub fn get_edge(&self, edge_id: &str) -> Option<&Hyperedge> {
        self.edges.get(edge_id)
    }

    /// Returns whether the hyperedge exists.
    pub fn has_edge(&self, edge_id: &str) -> bool {
        self.edges.contains_key(edge_id)
    }

    /// Returns the hyperedges of a given type.
    pub fn get_edges_by_type(&self, edge_type: &str) -> Vec<&Hyperedge> {
        self.index
            .edges_by_type
            .get(edge_type)
            .into_iter()
            .flatten()
            .filter_map(|id| self.edges.get(id))
            .collect()
    }

    /// Returns the hyperedges containing any (`match_all = false`) or all
    /// (`match_all = true`) of the given nodes, in id order.
    pub fn get_edges_containing<I, S>(&self, node_ids: I, match_all: bool) -> Vec<&Hyperedge>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids = self.edge_ids_containing(node_ids, match_all);
        ids.iter().filter_map(|id| self.edges.get(*id)).collect()
    }

    pub(crate) fn edge_ids_containing<I, S>(&self, node_ids: I, match_all: bool) -> BTreeSet<&str>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut buckets = node_ids.into_iter().map(|id| {
            self.index
                .edges_of(id.as_ref())
                .map(|ids| ids.iter().map(String::as_str).collect::<BTreeSet<_>>())
                .unwrap_or_default()
        });
        if match_all {
            let Some(first) = buckets.next() else {
                return BTreeSet::new();
            };
            buckets.fold(first, |acc, bucket| &acc & &bucket)
        } else {
            buckets.flatten().collect()
        }
    }

    /// Returns the hyperedges whose properties contain every given pair.
    pub fn find_edges(&self, properties: &Properties) -> Vec<&Hyperedge> {
        self.edges
            .values()
            .filter(|edge| matches_properties(edge.properties(), properties))
            .collect()
    }

    /// Iterates over every hyperedge in id order.
    pub fn edges(&self) -> impl Iterator<Item = &Hyperedge> + '_ {
        self.edges.values()
    }

    /// Returns the number of hyperedges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the hyperedges that reference `edge_id` through an edge-ref incidence.
    pub fn edges_referencing(&self, edge_id: &str) -> Vec<&Hyperedge> {
        self.index
            .edge_refs
            .get(edge_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.edges.get(id))
            .collect()
    }

    // ----- neighbourhood queries -----

    /// Returns the nodes sharing at least one hyperedge with `node_id`.
    pub fn neighbor_nodes(
        &self,
        node_id: &str,
        edge_types: Option<&[String]>,
        exclude_self: bool,
    ) -> BTreeSet<String> {
        let mut neighbours: BTreeSet<String> = self
            .edges_of_node(node_id, edge_types)
            .into_iter()
            .flat_map(|edge| edge.node_set())
            .map(str::to_string)
            .collect();
        if exclude_self {
            neighbours.remove(node_id);
        }
        neighbours
    }

    /// Returns the hyperedges containing `node_id`.
    pub fn edges_of_node(&self, node_id: &str, edge_types: Option<&[String]>) -> Vec<&Hyperedge> {
        self.index
            .edges_of(node_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.edges.get(id))
            .filter(|edge| type_allowed(edge_types, edge.edge_type()))
            .collect()
    }

    /// Returns the vertex sets of the hyperedges containing `node_id`.
    pub fn edge_node_sets_of_node(
        &self,
        node_id: &str,
        edge_types: Option<&[String]>,
    ) -> BTreeSet<VertexSet> {
        self.edges_of_node(node_id, edge_types)
            .into_iter()
            .map(VertexSet::of)
            .collect()
    }

    /// Returns the number of hyperedges containing `node_id`.
    pub fn node_degree(&self, node_id: &str, edge_types: Option<&[String]>) -> usize {
        self.edges_of_node(node_id, edge_types).len()
    }

    /// Returns the number of distinct nodes in a hyperedge, or 0 when absent.
    pub fn edge_cardinality(&self, edge_id: &str) -> usize {
        self.edges
            .get(edge_id)
            .map(|edge| edge.node_set().len())
            .unwrap_or(0)
    }

    /// Sum of the degrees of the nodes of the edge with this exact vertex set.
    pub fn hyperedge_degree<I, S>(&self, node_ids: I, edge_type: Option<&str>) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.get_edge_by_node_set(node_ids, edge_type)
            .map(|edge| {
                edge.node_set()
                    .into_iter()
                    .map(|node| self.node_degree(node, None))
                    .sum()
            })
            .unwrap_or(0)
    }

    // ----- vertex-set lookups -----

    /// Returns the first hyperedge (in id order) with exactly this vertex set.
    pub fn get_edge_by_node_set<I, S>(&self, node_ids: I, edge_type: Option<&str>) -> Option<&Hyperedge>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.get_edges_by_node_set(node_ids, edge_type)
            .into_iter()
            .next()
    }

    /// Returns every hyperedge with exactly this vertex set.
    pub fn get_edges_by_node_set<I, S>(&self, node_ids: I, edge_type: Option<&str>) -> Vec<&Hyperedge>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let key = VertexSet::new(node_ids);
        self.index
            .vertex_sets
            .get(&key)
            .into_iter()
            .flatten()
            .filter_map(|id| self.edges.get(id))
            .filter(|edge| edge_type.map_or(true, |kind| edge.edge_type() == kind))
            .collect()
    }

    /// Returns whether a hyperedge with exactly this vertex set exists.
    pub fn has_edge_with_nodes<I, S>(&self, node_ids: I, edge_type: Option<&str>) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.get_edge_by_node_set(node_ids, edge_type).is_some()
    }

    /// Returns record and per-type counts.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            num_nodes: self.nodes.len(),
            num_edges: self.edges.len(),
            nodes_by_type: bucket_sizes(&self.index.nodes_by_type),
            edges_by_type: bucket_sizes(&self.index.edges_by_type),
        }
    }

    pub(crate) fn node_map(&self) -> &BTreeMap<String, Node> {
        &self.nodes
    }

    pub(crate) fn edge_map(&self) -> &BTreeMap<String, Hyperedge> {
        &self.edges
    }
}

pub(crate) fn type_allowed(edge_types: Option<&[String]>, edge_type: &str) -> bool {
    match edge_types {
        Some(types) if !types.is_empty() => types.iter().any(|kind| kind == edge_type),
        _ => true,
    }
}

fn matches_properties(candidate: &Properties, wanted: &Properties) -> bool {
    wanted
        .iter()
        .all(|(key, value)| candidate.get(key) == Some(value))
}

fn bucket_sizes(buckets: &BTreeMap<String, BTreeSet<String>>) -> BTreeMap<String, usize> {
    buckets
        .iter()
        .map(|(kind, ids)| (kind.clone(), ids.len()))
        .collect()
}
