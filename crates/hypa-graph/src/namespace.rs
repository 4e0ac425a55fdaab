//! In-memory directory of independently locked hypergraphs.

use std::collections::BTreeMap;
use std::sync::Arc;

use hypa_core::errors::{ErrorInfo, HypaError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::flags::HypergraphConfig;
use crate::graph::Hypergraph;
use crate::store::HypergraphStore;

/// Name of the namespace selected by [`HypergraphDb::new`].
pub const DEFAULT_NAMESPACE: &str = "default";

/// Named collection of [`HypergraphStore`]s with a current selection.
///
/// Namespaces are created on first access. Each store keeps its own lock, so
/// threads working in different namespaces never contend; the directory lock
/// only covers the name table.
#[derive(Debug)]
pub struct HypergraphDb {
    config: HypergraphConfig,
    state: RwLock<Directory>,
}

#[derive(Debug)]
struct Directory {
    current: String,
    namespaces: BTreeMap<String, Arc<HypergraphStore>>,
}

/// Per-namespace record counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceStats {
    /// Number of nodes.
    pub num_nodes: usize,
    /// Number of hyperedges.
    pub num_edges: usize,
}

/// Aggregated statistics over every namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbStats {
    /// Number of namespaces.
    pub num_namespaces: usize,
    /// Currently selected namespace.
    pub current_namespace: String,
    /// Sum of nodes over every namespace.
    pub total_nodes: usize,
    /// Sum of hyperedges over every namespace.
    pub total_edges: usize,
    /// Counts per namespace.
    pub namespaces: BTreeMap<String, NamespaceStats>,
}

impl Default for HypergraphDb {
    fn default() -> Self {
        Self::new()
    }
}

impl HypergraphDb {
    /// Creates a directory holding only the `"default"` namespace.
    pub fn new() -> Self {
        Self::with_default_namespace(DEFAULT_NAMESPACE, HypergraphConfig::default())
    }

    /// Creates a directory whose initial namespace is `name`; every store it
    /// creates uses `config`.
    pub fn with_default_namespace(name: impl Into<String>, config: HypergraphConfig) -> Self {
        let name = name.into();
        let mut namespaces = BTreeMap::new();
        namespaces.insert(name.clone(), Arc::new(HypergraphStore::with_config(config.clone())));
        Self {
            config,
            state: RwLock::new(Directory {
                current: name,
                namespaces,
            }),
        }
    }

    /// Returns the store of the current namespace.
    pub fn store(&self) -> Arc<HypergraphStore> {
        let mut state = self.state.write();
        let current = state.current.clone();
        self.entry(&mut state, &current)
    }

    /// Returns the current namespace name.
    pub fn current_namespace(&self) -> String {
        self.state.read().current.clone()
    }

    /// Returns the store for `name`, creating it if needed. The current
    /// selection is not changed.
    pub fn namespace(&self, name: &str) -> Arc<HypergraphStore> {
        let mut state = self.state.write();
        self.entry(&mut state, name)
    }

    /// Makes `name` the current namespace, creating it if needed.
    pub fn select(&self, name: &str) -> &Self {
        let mut state = self.state.write();
        self.entry(&mut state, name);
        state.current = name.to_string();
        tracing::debug!(namespace = name, "selected namespace");
        self
    }

    /// Returns every namespace name in sorted order.
    pub fn list_namespaces(&self) -> Vec<String> {
        self.state.read().namespaces.keys().cloned().collect()
    }

    /// Returns whether the namespace exists.
    pub fn namespace_exists(&self, name: &str) -> bool {
        self.state.read().namespaces.contains_key(name)
    }

    /// Returns the store for an existing namespace without creating it.
    pub fn get_namespace(&self, name: &str) -> Option<Arc<HypergraphStore>> {
        self.state.read().namespaces.get(name).cloned()
    }

    /// Deletes a namespace. Returns `false` when it does not exist.
    ///
    /// The current namespace cannot be deleted.
    pub fn delete_namespace(&self, name: &str) -> Result<bool, HypaError> {
        let mut state = self.state.write();
        if state.current == name {
            return Err(namespace_error(
                "namespace-current",
                "cannot delete the current namespace",
                name,
            ));
        }
        let removed = state.namespaces.remove(name).is_some();
        if removed {
            tracing::debug!(namespace = name, "deleted namespace");
        }
        Ok(removed)
    }

    /// Renames a namespace, following the current selection if it moves.
    /// Returns `false` when `old_name` does not exist.
    pub fn rename_namespace(&self, old_name: &str, new_name: &str) -> Result<bool, HypaError> {
        let mut state = self.state.write();
        if !state.namespaces.contains_key(old_name) {
            return Ok(false);
        }
        if state.namespaces.contains_key(new_name) {
            return Err(namespace_error(
                "namespace-exists",
                "target namespace already exists",
                new_name,
            ));
        }
        if let Some(store) = state.namespaces.remove(old_name) {
            state.namespaces.insert(new_name.to_string(), store);
        }
        if state.current == old_name {
            state.current = new_name.to_string();
        }
        tracing::debug!(from = old_name, to = new_name, "renamed namespace");
        Ok(true)
    }

    /// Deep copies `source` into a new namespace `target` with its own lock.
    pub fn copy_namespace(&self, source: &str, target: &str) -> Result<&Self, HypaError> {
        let mut state = self.state.write();
        let Some(original) = state.namespaces.get(source) else {
            return Err(namespace_error(
                "namespace-missing",
                "source namespace not found",
                source,
            ));
        };
        if state.namespaces.contains_key(target) {
            return Err(namespace_error(
                "namespace-exists",
                "target namespace already exists",
                target,
            ));
        }
        let copy = Arc::new(HypergraphStore::clone(original));
        state.namespaces.insert(target.to_string(), copy);
        tracing::debug!(from = source, to = target, "copied namespace");
        Ok(self)
    }

    /// Empties a namespace (the current one when `name` is `None`). Existing
    /// handles to the store observe the cleared graph. Returns `false` when
    /// the namespace does not exist.
    pub fn clear_namespace(&self, name: Option<&str>) -> bool {
        let state = self.state.read();
        let target = name.unwrap_or(state.current.as_str());
        let Some(store) = state.namespaces.get(target) else {
            return false;
        };
        store.replace(Hypergraph::new(self.config.clone()));
        tracing::debug!(namespace = target, "cleared namespace");
        true
    }

    /// Aggregates record counts across every namespace.
    pub fn stats(&self) -> DbStats {
        let state = self.state.read();
        let mut stats = DbStats {
            num_namespaces: state.namespaces.len(),
            current_namespace: state.current.clone(),
            ..DbStats::default()
        };
        for (name, store) in &state.namespaces {
            let graph = store.stats();
            stats.total_nodes += graph.num_nodes;
            stats.total_edges += graph.num_edges;
            stats.namespaces.insert(
                name.clone(),
                NamespaceStats {
                    num_nodes: graph.num_nodes,
                    num_edges: graph.num_edges,
                },
            );
        }
        stats
    }

    fn entry(&self, state: &mut Directory, name: &str) -> Arc<HypergraphStore> {
        if let Some(store) = state.namespaces.get(name) {
            return Arc::clone(store);
        }
        let store = Arc::new(HypergraphStore::with_config(self.config.clone()));
        state.namespaces.insert(name.to_string(), Arc::clone(&store));
        tracing::debug!(namespace = name, "created namespace");
        store
    }
}

fn namespace_error(code: &str, message: &str, name: &str) -> HypaError {
    HypaError::Namespace(ErrorInfo::new(code, message).with_context("namespace", name))
}
