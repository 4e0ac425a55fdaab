use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};

use hypa_core::{Hyperedge, Node};

/// Canonical unordered set of node ids used as an edge lookup key.
///
/// Two hyperedges share a vertex set when they connect exactly the same nodes,
/// regardless of incidence order, duplicates, direction or edge type.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexSet(Vec<String>);

impl VertexSet {
    /// Builds the canonical (sorted, deduplicated) key for the provided ids.
    pub fn new<I, S>(node_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: BTreeSet<String> = node_ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .collect();
        Self(set.into_iter().collect())
    }

    /// Returns the vertex set of a hyperedge.
    pub fn of(edge: &Hyperedge) -> Self {
        Self::new(edge.node_set())
    }

    /// Returns the sorted node ids.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Returns the number of distinct nodes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the set has no nodes (edge-ref-only hyperedges).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns whether the set contains the node.
    pub fn contains(&self, node_id: &str) -> bool {
        self.0
            .binary_search_by(|candidate| candidate.as_str().cmp(node_id))
            .is_ok()
    }
}

type Buckets<K> = BTreeMap<K, BTreeSet<String>>;

/// Derived lookup structures kept consistent with the primary record maps.
///
/// No bucket is ever left empty: every removal prunes the bucket it emptied.
#[derive(Debug, Clone, Default)]
pub(crate) struct IndexSet {
    pub(crate) nodes_by_type: Buckets<String>,
    pub(crate) edges_by_type: Buckets<String>,
    pub(crate) node_edges: Buckets<String>,
    pub(crate) vertex_sets: Buckets<VertexSet>,
    /// Referenced edge id -> ids of the edges referencing it.
    pub(crate) edge_refs: Buckets<String>,
    /// Deleted edge id -> ids of the edges still referencing it. Moved back
    /// into `edge_refs` when the id is inserted again.
    pub(crate) detached_refs: Buckets<String>,
}

impl IndexSet {
    pub(crate) fn index_node(&mut self, node: &Node) {
        insert_member(&mut self.nodes_by_type, node.node_type(), node.id());
    }

    pub(crate) fn unindex_node(&mut self, node: &Node) {
        remove_member(&mut self.nodes_by_type, node.node_type(), node.id());
    }

    pub(crate) fn index_edge(&mut self, edge: &Hyperedge) {
        let id = edge.id();
        insert_member(&mut self.edges_by_type, edge.edge_type(), id);
        for node_id in edge.nodes() {
            insert_member(&mut self.node_edges, node_id, id);
        }
        for target in edge.edge_refs() {
            insert_member(&mut self.edge_refs, target, id);
        }
        let key = VertexSet::of(edge);
        if !key.is_empty() {
            self.vertex_sets.entry(key).or_default().insert(id.to_string());
        }
    }

    /// Removes every entry the edge contributed as a member. Entries where
    /// the edge is the referenced target are left to [`Self::detach_referenced`].
    pub(crate) fn unindex_edge(&mut self, edge: &Hyperedge) {
        let id = edge.id();
        remove_member(&mut self.edges_by_type, edge.edge_type(), id);
        for node_id in edge.nodes() {
            remove_member(&mut self.node_edges, node_id, id);
        }
        for target in edge.edge_refs() {
            remove_member(&mut self.edge_refs, target, id);
            remove_member(&mut self.detached_refs, target, id);
        }
        let key = VertexSet::of(edge);
        if !key.is_empty() {
            remove_member(&mut self.vertex_sets, &key, id);
        }
    }

    /// Moves an edge from its old shape to its new shape, touching only the
    /// buckets whose membership actually changes.
    pub(crate) fn reindex_edge(&mut self, old: &Hyperedge, new: &Hyperedge) {
        let id = new.id();
        if old.edge_type() != new.edge_type() {
            remove_member(&mut self.edges_by_type, old.edge_type(), id);
        }
        insert_member(&mut self.edges_by_type, new.edge_type(), id);

        let old_nodes = old.node_set();
        let new_nodes = new.node_set();
        for node_id in old_nodes.difference(&new_nodes) {
            remove_member(&mut self.node_edges, *node_id, id);
        }
        for node_id in new_nodes.difference(&old_nodes) {
            insert_member(&mut self.node_edges, *node_id, id);
        }

        let old_refs: BTreeSet<&str> = old.edge_refs().into_iter().collect();
        let new_refs: BTreeSet<&str> = new.edge_refs().into_iter().collect();
        for target in old_refs.difference(&new_refs) {
            remove_member(&mut self.edge_refs, *target, id);
            remove_member(&mut self.detached_refs, *target, id);
        }
        for target in new_refs.difference(&old_refs) {
            insert_member(&mut self.edge_refs, *target, id);
        }

        let old_key = VertexSet::new(old_nodes);
        let new_key = VertexSet::new(new_nodes);
        if old_key != new_key {
            if !old_key.is_empty() {
                remove_member(&mut self.vertex_sets, &old_key, id);
            }
            if !new_key.is_empty() {
                self.vertex_sets
                    .entry(new_key)
                    .or_default()
                    .insert(id.to_string());
            }
        }
    }

    /// Moves the referrers of a deleted edge out of the live index and
    /// returns how many there were.
    pub(crate) fn detach_referenced(&mut self, edge_id: &str) -> usize {
        let Some(referrers) = self.edge_refs.remove(edge_id) else {
            return 0;
        };
        let count = referrers.len();
        self.detached_refs
            .entry(edge_id.to_string())
            .or_default()
            .extend(referrers);
        count
    }

    /// Restores the referrers parked by [`Self::detach_referenced`] once the
    /// edge id exists again.
    pub(crate) fn reattach_referenced(&mut self, edge_id: &str) {
        if let Some(referrers) = self.detached_refs.remove(edge_id) {
            self.edge_refs
                .entry(edge_id.to_string())
                .or_default()
                .extend(referrers);
        }
    }

    pub(crate) fn edges_of(&self, node_id: &str) -> Option<&BTreeSet<String>> {
        self.node_edges.get(node_id)
    }
}

fn insert_member<K, Q>(buckets: &mut Buckets<K>, key: &Q, member: &str)
where
    K: Ord + Borrow<Q>,
    Q: Ord + ToOwned<Owned = K> + ?Sized,
{
    match buckets.get_mut(key) {
        Some(bucket) => {
            bucket.insert(member.to_string());
        }
        None => {
            buckets.insert(key.to_owned(), BTreeSet::from([member.to_string()]));
        }
    }
}

fn remove_member<K, Q>(buckets: &mut Buckets<K>, key: &Q, member: &str) -> bool
where
    K: Ord + Borrow<Q>,
    Q: Ord + ?Sized,
{
    let Some(bucket) = buckets.get_mut(key) else {
        return false;
    };
    let removed = bucket.remove(member);
    if bucket.is_empty() {
        buckets.remove(key);
        tracing::trace!(member, "pruned empty index bucket");
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypa_core::Incidence;

    fn edge(id: &str, kind: &str, nodes: &[&str]) -> Hyperedge {
        Hyperedge::from_nodes(id, kind, nodes.iter().copied()).unwrap()
    }

    #[test]
    fn vertex_set_is_order_and_duplicate_insensitive() {
        assert_eq!(VertexSet::new(["b", "a", "b"]), VertexSet::new(["a", "b"]));
        assert!(VertexSet::new(["a", "b"]).contains("b"));
        assert!(!VertexSet::new(["a", "b"]).contains("c"));
    }

    #[test]
    fn unindex_prunes_every_bucket() {
        let mut index = IndexSet::default();
        let e = Hyperedge::new(
            "e1",
            "fk",
            vec![Incidence::node("a"), Incidence::node("b"), Incidence::edge_ref("e0")],
        )
        .unwrap();
        index.index_edge(&e);
        assert_eq!(index.edge_refs["e0"].len(), 1);
        index.unindex_edge(&e);
        assert!(index.edges_by_type.is_empty());
        assert!(index.node_edges.is_empty());
        assert!(index.vertex_sets.is_empty());
        assert!(index.edge_refs.is_empty());
    }

    #[test]
    fn reindex_touches_only_changed_buckets() {
        let mut index = IndexSet::default();
        let old = edge("e1", "fk", &["a", "b"]);
        let new = edge("e1", "concept", &["b", "c"]);
        index.index_edge(&old);
        index.reindex_edge(&old, &new);
        assert!(!index.node_edges.contains_key("a"));
        assert!(index.node_edges["b"].contains("e1"));
        assert!(index.node_edges["c"].contains("e1"));
        assert!(!index.edges_by_type.contains_key("fk"));
        assert!(index.edges_by_type["concept"].contains("e1"));
        assert!(!index.vertex_sets.contains_key(&VertexSet::new(["a", "b"])));
        assert!(index.vertex_sets.contains_key(&VertexSet::new(["b", "c"])));
    }

    #[test]
    fn edge_ref_only_edges_skip_vertex_index() {
        let mut index = IndexSet::default();
        let meta = Hyperedge::new("m", "about", vec![Incidence::edge_ref("e1")]).unwrap();
        index.index_edge(&meta);
        assert!(index.vertex_sets.is_empty());
        assert_eq!(index.detach_referenced("e1"), 1);
        assert!(index.edge_refs.is_empty());
        assert!(index.detached_refs["e1"].contains("m"));
    }

    #[test]
    fn detached_referrers_follow_unindex_and_reattach() {
        let mut index = IndexSet::default();
        let first = Hyperedge::new("m1", "about", vec![Incidence::edge_ref("e1")]).unwrap();
        let second = Hyperedge::new("m2", "about", vec![Incidence::edge_ref("e1")]).unwrap();
        index.index_edge(&first);
        index.index_edge(&second);
        index.detach_referenced("e1");

        index.unindex_edge(&first);
        let retargeted = Hyperedge::new("m2", "about", vec![Incidence::edge_ref("e2")]).unwrap();
        index.reindex_edge(&second, &retargeted);
        assert!(index.detached_refs.is_empty());

        index.reindex_edge(&retargeted, &second);
        index.detach_referenced("e1");
        index.reattach_referenced("e1");
        assert!(index.detached_refs.is_empty());
        assert_eq!(index.edge_refs["e1"], BTreeSet::from(["m2".to_string()]));
    }
}
