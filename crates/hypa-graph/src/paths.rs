//! Breadth-first search over hyperedges with an intersection-constrained
//! adjacency rule.

use std::collections::{BTreeSet, VecDeque};
use std::fmt::{self, Display};
use std::str::FromStr;

use hypa_core::errors::{ErrorInfo, HypaError};
use hypa_core::Hyperedge;
use serde::{Deserialize, Serialize};

use crate::flags::PathDefaults;
use crate::graph::{type_allowed, Hypergraph};

/// How incidence directions constrain adjacency between consecutive edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionMode {
    /// Compare full node sets.
    #[default]
    Undirected,
    /// Head nodes of the predecessor against tail nodes of the successor.
    Forward,
    /// Tail nodes of the predecessor against head nodes of the successor.
    Backward,
}

impl DirectionMode {
    /// Returns the wire spelling of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectionMode::Undirected => "undirected",
            DirectionMode::Forward => "forward",
            DirectionMode::Backward => "backward",
        }
    }
}

impl Display for DirectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DirectionMode {
    type Err = HypaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "undirected" => Ok(DirectionMode::Undirected),
            "forward" => Ok(DirectionMode::Forward),
            "backward" => Ok(DirectionMode::Backward),
            other => Err(HypaError::Domain(
                ErrorInfo::new(
                    "invalid-direction-mode",
                    "direction mode must be 'undirected', 'forward' or 'backward'",
                )
                .with_context("direction_mode", other),
            )),
        }
    }
}

/// Parameters of one path search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathQuery {
    /// Nodes the paths start from.
    pub start_nodes: BTreeSet<String>,
    /// Nodes the paths must reach.
    pub end_nodes: BTreeSet<String>,
    /// Minimum shared active nodes between consecutive edges.
    pub min_intersection: usize,
    /// Maximum number of edges in a path.
    pub max_hops: usize,
    /// Search stops once this many paths are found.
    pub max_paths: usize,
    /// Restricts traversal to these edge types; `None` or empty allows all.
    pub edge_types: Option<Vec<String>>,
    /// Direction handling for adjacency.
    pub direction_mode: DirectionMode,
}

impl PathQuery {
    /// Creates a query with the default limits.
    pub fn new<I, J, S, T>(start_nodes: I, end_nodes: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self::with_defaults(start_nodes, end_nodes, PathDefaults::default())
    }

    /// Creates a query seeded from the provided limits.
    pub fn with_defaults<I, J, S, T>(start_nodes: I, end_nodes: J, defaults: PathDefaults) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            start_nodes: start_nodes.into_iter().map(Into::into).collect(),
            end_nodes: end_nodes.into_iter().map(Into::into).collect(),
            min_intersection: defaults.min_intersection,
            max_hops: defaults.max_hops,
            max_paths: defaults.max_paths,
            edge_types: None,
            direction_mode: DirectionMode::Undirected,
        }
    }

    /// Sets the minimum intersection size.
    pub fn min_intersection(mut self, value: usize) -> Self {
        self.min_intersection = value;
        self
    }

    /// Sets the maximum path length in edges.
    pub fn max_hops(mut self, value: usize) -> Self {
        self.max_hops = value;
        self
    }

    /// Sets the maximum number of returned paths.
    pub fn max_paths(mut self, value: usize) -> Self {
        self.max_paths = value;
        self
    }

    /// Restricts traversal to the given edge types.
    pub fn edge_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edge_types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the direction mode.
    pub fn direction_mode(mut self, mode: DirectionMode) -> Self {
        self.direction_mode = mode;
        self
    }

    /// Parses and sets the direction mode, failing on unknown spellings.
    pub fn direction_mode_str(self, mode: &str) -> Result<Self, HypaError> {
        Ok(self.direction_mode(mode.parse()?))
    }

    fn allows(&self, edge: &Hyperedge) -> bool {
        type_allowed(self.edge_types.as_deref(), edge.edge_type())
    }
}

#[derive(Clone, Copy)]
enum Side {
    Predecessor,
    Successor,
}

impl Hypergraph {
    /// Creates a path query seeded from this graph's configured defaults.
    pub fn path_query<I, J, S, T>(&self, start_nodes: I, end_nodes: J) -> PathQuery
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        PathQuery::with_defaults(start_nodes, end_nodes, self.config().path_defaults)
    }

    /// Finds paths of hyperedges from any start node to any end node.
    ///
    /// Paths are explored breadth first; an edge is visited at most once per
    /// search, so competing branches never share an edge. A branch ends when
    /// it reaches an edge touching an end node or when it holds `max_hops`
    /// edges.
    pub fn find_paths(&self, query: &PathQuery) -> Vec<Vec<&Hyperedge>> {
        let start_edges: Vec<&Hyperedge> = self
            .get_edges_containing(&query.start_nodes, false)
            .into_iter()
            .filter(|edge| query.allows(edge))
            .collect();
        let targets: BTreeSet<&str> = self
            .get_edges_containing(&query.end_nodes, false)
            .into_iter()
            .filter(|edge| query.allows(edge))
            .map(Hyperedge::id)
            .collect();
        if start_edges.is_empty() || targets.is_empty() || query.max_paths == 0 {
            return Vec::new();
        }

        let mut visited: BTreeSet<&str> = start_edges.iter().copied().map(Hyperedge::id).collect();
        let mut queue: VecDeque<Vec<&Hyperedge>> =
            start_edges.into_iter().map(|edge| vec![edge]).collect();
        let mut found = Vec::new();

        while found.len() < query.max_paths {
            let Some(path) = queue.pop_front() else {
                break;
            };
            let Some(current) = path.last().copied() else {
                continue;
            };
            if targets.contains(current.id()) {
                found.push(path);
                continue;
            }
            if path.len() >= query.max_hops {
                continue;
            }
            for next in self.adjacent_edges(current, query) {
                if visited.insert(next.id()) {
                    let mut extended = path.clone();
                    extended.push(next);
                    queue.push_back(extended);
                }
            }
        }
        tracing::trace!(
            paths = found.len(),
            mode = %query.direction_mode,
            "path search finished"
        );
        found
    }

    fn adjacent_edges<'a>(&'a self, edge: &Hyperedge, query: &PathQuery) -> Vec<&'a Hyperedge> {
        let outgoing = active_nodes(edge, query.direction_mode, Side::Predecessor);
        self.get_edges_containing(&outgoing, false)
            .into_iter()
            .filter(|candidate| candidate.id() != edge.id() && query.allows(candidate))
            .filter(|candidate| {
                let incoming = active_nodes(candidate, query.direction_mode, Side::Successor);
                outgoing.intersection(&incoming).count() >= query.min_intersection
            })
            .collect()
    }
}

/// Node set of `edge` that takes part in the adjacency test for its role.
fn active_nodes(edge: &Hyperedge, mode: DirectionMode, side: Side) -> BTreeSet<&str> {
    let directed = match (mode, side) {
        (DirectionMode::Undirected, _) => return edge.node_set(),
        (DirectionMode::Forward, Side::Predecessor) | (DirectionMode::Backward, Side::Successor) => {
            edge.head_nodes()
        }
        (DirectionMode::Forward, Side::Successor) | (DirectionMode::Backward, Side::Predecessor) => {
            edge.tail_nodes()
        }
    };
    if directed.is_empty() {
        edge.node_set()
    } else {
        directed.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_mode_parses_known_values_only() {
        assert_eq!("forward".parse::<DirectionMode>().unwrap(), DirectionMode::Forward);
        let err = "sideways".parse::<DirectionMode>().unwrap_err();
        assert_eq!(err.code(), "invalid-direction-mode");
        assert_eq!(err.info().context["direction_mode"], "sideways");
    }

    #[test]
    fn undirected_members_fall_back_to_full_node_set() {
        let edge = Hyperedge::from_nodes("e", "t", ["a", "b"]).unwrap();
        let active = active_nodes(&edge, DirectionMode::Forward, Side::Predecessor);
        assert_eq!(active, BTreeSet::from(["a", "b"]));
    }
}
