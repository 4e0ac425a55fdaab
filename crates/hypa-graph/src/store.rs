//! Mutex-guarded handle for sharing one hypergraph across threads.

use std::collections::BTreeSet;
use std::ops::{Deref, DerefMut};

use hypa_core::errors::HypaError;
use hypa_core::{Hyperedge, Node, Properties, Provenance};
use parking_lot::{Mutex, MutexGuard};

use crate::flags::HypergraphConfig;
use crate::graph::{GraphStats, Hypergraph, MergeFn};
use crate::hash::canonical_hash;
use crate::hif::HifDocument;
use crate::index::VertexSet;
use crate::paths::PathQuery;
use crate::serialization::GraphRecord;
use crate::validate::ValidationReport;

/// Thread-safe hypergraph.
///
/// Every public operation takes the single store lock for its duration and
/// runs the matching [`Hypergraph`] method, which never locks. Results are
/// returned owned so no reference outlives the lock. Use
/// [`HypergraphStore::batch`] to run several operations under one
/// acquisition.
///
/// The lock is not reentrant: calling a store method while holding a
/// [`Batch`] on the same store from the same thread deadlocks. Inside a
/// batch, call the methods on the batch itself; helpers that run inside a
/// batch take `&mut Hypergraph` and are passed `&mut batch`.
#[derive(Debug, Default)]
pub struct HypergraphStore {
    inner: Mutex<Hypergraph>,
}

/// Exclusive access to a store's graph for a multi-operation critical
/// section. The lock is released when the batch is dropped, including
/// during unwinding; mutations applied before a panic are kept.
pub struct Batch<'a> {
    guard: MutexGuard<'a, Hypergraph>,
}

impl Deref for Batch<'_> {
    type Target = Hypergraph;

    fn deref(&self) -> &Hypergraph {
        &self.guard
    }
}

impl DerefMut for Batch<'_> {
    fn deref_mut(&mut self) -> &mut Hypergraph {
        &mut self.guard
    }
}

impl Clone for HypergraphStore {
    /// Deep copy taken under the source lock; the copy gets its own lock.
    fn clone(&self) -> Self {
        Self::from_graph(self.snapshot())
    }
}

impl From<Hypergraph> for HypergraphStore {
    fn from(graph: Hypergraph) -> Self {
        Self::from_graph(graph)
    }
}

impl HypergraphStore {
    /// Creates an empty store with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with the provided configuration.
    pub fn with_config(config: HypergraphConfig) -> Self {
        Self::from_graph(Hypergraph::new(config))
    }

    /// Wraps an existing graph.
    pub fn from_graph(graph: Hypergraph) -> Self {
        Self {
            inner: Mutex::new(graph),
        }
    }

    /// Acquires the store lock until the returned batch is dropped.
    pub fn batch(&self) -> Batch<'_> {
        Batch {
            guard: self.inner.lock(),
        }
    }

    /// Runs `f` against the graph under the store lock.
    pub fn read<R>(&self, f: impl FnOnce(&Hypergraph) -> R) -> R {
        f(&self.inner.lock())
    }

    /// Runs `f` against the mutable graph under the store lock.
    pub fn write<R>(&self, f: impl FnOnce(&mut Hypergraph) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Returns a deep copy of the current graph.
    pub fn snapshot(&self) -> Hypergraph {
        self.inner.lock().clone()
    }

    /// Replaces the stored graph, returning the previous one.
    pub fn replace(&self, graph: Hypergraph) -> Hypergraph {
        std::mem::replace(&mut *self.inner.lock(), graph)
    }

    /// Consumes the store and returns its graph.
    pub fn into_inner(self) -> Hypergraph {
        self.inner.into_inner()
    }

    /// See [`Hypergraph::add_node`].
    pub fn add_node(&self, node: Node) {
        self.inner.lock().add_node(node)
    }

    /// See [`Hypergraph::delete_node`].
    pub fn delete_node(&self, node_id: &str) -> bool {
        self.inner.lock().delete_node(node_id)
    }

    /// See [`Hypergraph::delete_node_cascade`].
    pub fn delete_node_cascade(&self, node_id: &str) -> (bool, usize) {
        self.inner.lock().delete_node_cascade(node_id)
    }

    /// See [`Hypergraph::upsert_node`].
    pub fn upsert_node(&self, node: Node, merge_properties: bool) -> Node {
        self.inner.lock().upsert_node(node, merge_properties)
    }

    /// See [`Hypergraph::add_edge`].
    pub fn add_edge(&self, edge: Hyperedge) {
        self.inner.lock().add_edge(edge)
    }

    /// See [`Hypergraph::delete_edge`].
    pub fn delete_edge(&self, edge_id: &str) -> bool {
        self.inner.lock().delete_edge(edge_id)
    }

    /// See [`Hypergraph::upsert_edge`].
    pub fn upsert_edge(
        &self,
        edge: Hyperedge,
        merge: Option<MergeFn<'_>>,
    ) -> Result<Hyperedge, HypaError> {
        self.inner.lock().upsert_edge(edge, merge)
    }

    /// See [`Hypergraph::upsert_edge_by_node_set`].
    pub fn upsert_edge_by_node_set<I, S>(
        &self,
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
        self.inner
            .lock()
            .upsert_edge_by_node_set(node_ids, edge_type, properties, merge, provenance)
    }

    /// Returns a copy of the node with the given id.
    pub fn get_node(&self, node_id: &str) -> Option<Node> {
        self.inner.lock().get_node(node_id).cloned()
    }

    /// Returns a copy of the hyperedge with the given id.
    pub fn get_edge(&self, edge_id: &str) -> Option<Hyperedge> {
        self.inner.lock().get_edge(edge_id).cloned()
    }

    /// Returns whether the node exists.
    pub fn has_node(&self, node_id: &str) -> bool {
        self.inner.lock().has_node(node_id)
    }

    /// Returns whether the hyperedge exists.
    pub fn has_edge(&self, edge_id: &str) -> bool {
        self.inner.lock().has_edge(edge_id)
    }

    /// Returns copies of the nodes of a given type.
    pub fn get_nodes_by_type(&self, node_type: &str) -> Vec<Node> {
        owned(self.inner.lock().get_nodes_by_type(node_type))
    }

    /// Returns copies of the nodes whose properties contain every given pair.
    pub fn find_nodes(&self, properties: &Properties) -> Vec<Node> {
        owned(self.inner.lock().find_nodes(properties))
    }

    /// Returns copies of every node in id order.
    pub fn all_nodes(&self) -> Vec<Node> {
        self.inner.lock().nodes().cloned().collect()
    }

    /// Returns copies of the hyperedges of a given type.
    pub fn get_edges_by_type(&self, edge_type: &str) -> Vec<Hyperedge> {
        owned(self.inner.lock().get_edges_by_type(edge_type))
    }

    /// Returns copies of the hyperedges whose properties contain every given pair.
    pub fn find_edges(&self, properties: &Properties) -> Vec<Hyperedge> {
        owned(self.inner.lock().find_edges(properties))
    }

    /// Returns copies of every hyperedge in id order.
    pub fn all_edges(&self) -> Vec<Hyperedge> {
        self.inner.lock().edges().cloned().collect()
    }

    /// Returns copies of the hyperedges referencing `edge_id`.
    pub fn edges_referencing(&self, edge_id: &str) -> Vec<Hyperedge> {
        owned(self.inner.lock().edges_referencing(edge_id))
    }

    /// See [`Hypergraph::neighbor_nodes`].
    pub fn neighbor_nodes(
        &self,
        node_id: &str,
        edge_types: Option<&[String]>,
        exclude_self: bool,
    ) -> BTreeSet<String> {
        self.inner
            .lock()
            .neighbor_nodes(node_id, edge_types, exclude_self)
    }

    /// Returns copies of the hyperedges containing `node_id`.
    pub fn edges_of_node(&self, node_id: &str, edge_types: Option<&[String]>) -> Vec<Hyperedge> {
        owned(self.inner.lock().edges_of_node(node_id, edge_types))
    }

    /// See [`Hypergraph::edge_node_sets_of_node`].
    pub fn edge_node_sets_of_node(
        &self,
        node_id: &str,
        edge_types: Option<&[String]>,
    ) -> BTreeSet<VertexSet> {
        self.inner.lock().edge_node_sets_of_node(node_id, edge_types)
    }

    /// See [`Hypergraph::node_degree`].
    pub fn node_degree(&self, node_id: &str, edge_types: Option<&[String]>) -> usize {
        self.inner.lock().node_degree(node_id, edge_types)
    }

    /// See [`Hypergraph::edge_cardinality`].
    pub fn edge_cardinality(&self, edge_id: &str) -> usize {
        self.inner.lock().edge_cardinality(edge_id)
    }

    /// See [`Hypergraph::hyperedge_degree`].
    pub fn hyperedge_degree<I, S>(&self, node_ids: I, edge_type: Option<&str>) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.inner.lock().hyperedge_degree(node_ids, edge_type)
    }

    /// Returns a copy of the first hyperedge with exactly this vertex set.
    pub fn get_edge_by_node_set<I, S>(&self, node_ids: I, edge_type: Option<&str>) -> Option<Hyperedge>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.inner
            .lock()
            .get_edge_by_node_set(node_ids, edge_type)
            .cloned()
    }

    /// See [`Hypergraph::has_edge_with_nodes`].
    pub fn has_edge_with_nodes<I, S>(&self, node_ids: I, edge_type: Option<&str>) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.inner.lock().has_edge_with_nodes(node_ids, edge_type)
    }

    /// Returns copies of the hyperedges containing any or all of the nodes.
    pub fn get_edges_containing<I, S>(&self, node_ids: I, match_all: bool) -> Vec<Hyperedge>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        owned(self.inner.lock().get_edges_containing(node_ids, match_all))
    }

    /// Returns copies of the hyperedges with exactly this vertex set.
    pub fn get_edges_by_node_set<I, S>(&self, node_ids: I, edge_type: Option<&str>) -> Vec<Hyperedge>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        owned(self.inner.lock().get_edges_by_node_set(node_ids, edge_type))
    }

    /// See [`Hypergraph::find_paths`].
    pub fn find_paths(&self, query: &PathQuery) -> Vec<Vec<Hyperedge>> {
        let graph = self.inner.lock();
        graph
            .find_paths(query)
            .into_iter()
            .map(|path| path.into_iter().cloned().collect())
            .collect()
    }

    /// See [`Hypergraph::validate`].
    pub fn validate(&self) -> ValidationReport {
        self.inner.lock().validate()
    }

    /// See [`Hypergraph::stats`].
    pub fn stats(&self) -> GraphStats {
        self.inner.lock().stats()
    }

    /// See [`Hypergraph::to_plain`].
    pub fn to_plain(&self) -> GraphRecord {
        self.inner.lock().to_plain()
    }

    /// Replaces the contents with a graph rebuilt from its nested-record form.
    ///
    /// The payload is fully decoded before the lock is taken; on error the
    /// store is unchanged.
    pub fn load_plain(&self, record: GraphRecord) -> Result<(), HypaError> {
        let config = self.inner.lock().config().clone();
        let graph = Hypergraph::from_plain_with_config(record, config)?;
        self.replace(graph);
        Ok(())
    }

    /// See [`Hypergraph::to_hif`].
    pub fn to_hif(&self) -> HifDocument {
        self.inner.lock().to_hif()
    }

    /// Replaces the contents with an imported HIF document.
    pub fn load_hif(&self, document: HifDocument, strict: bool) -> Result<(), HypaError> {
        let config = self.inner.lock().config().clone();
        let graph = Hypergraph::from_hif_with_config(document, strict, config)?;
        self.replace(graph);
        Ok(())
    }

    /// See [`canonical_hash`].
    pub fn canonical_hash(&self) -> Result<String, HypaError> {
        canonical_hash(&self.inner.lock())
    }
}

fn owned<T: Clone>(records: Vec<&T>) -> Vec<T> {
    records.into_iter().cloned().collect()
}
