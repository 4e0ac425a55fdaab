use hypa_core::errors::{ErrorInfo, HypaError};
use hypa_core::{Hyperedge, Incidence, Node, Properties, Provenance, SchemaVersion};
use serde::{Deserialize, Serialize};

use crate::flags::{HypergraphConfig, SCHEMA_VERSION};
use crate::graph::Hypergraph;

/// Lossless nested-record mirror of a hypergraph, used for snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRecord {
    /// Schema version of the payload.
    #[serde(default = "default_schema")]
    pub schema_version: SchemaVersion,
    /// Every node.
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    /// Every hyperedge.
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

/// Nested-record form of a [`Node`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node id.
    pub id: String,
    /// Node type.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Node metadata.
    #[serde(default)]
    pub properties: Properties,
}

/// Nested-record form of an [`Incidence`]; exactly one id field is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidenceRecord {
    /// Member node id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    /// Referenced edge id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_ref_id: Option<String>,
    /// `"head"`, `"tail"` or absent.
    #[serde(default)]
    pub direction: Option<String>,
    /// Incidence metadata.
    #[serde(default)]
    pub properties: Properties,
}

/// Nested-record form of a [`Hyperedge`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Edge id.
    pub id: String,
    /// Edge type.
    #[serde(rename = "type")]
    pub edge_type: String,
    /// Ordered incidences.
    pub incidences: Vec<IncidenceRecord>,
    /// Edge metadata.
    #[serde(default)]
    pub properties: Properties,
    /// Flattened `source` and `confidence`, range-checked on deserialize.
    #[serde(flatten)]
    pub provenance: Provenance,
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id().to_string(),
            node_type: node.node_type().to_string(),
            properties: node.properties().clone(),
        }
    }
}

impl From<&Incidence> for IncidenceRecord {
    fn from(incidence: &Incidence) -> Self {
        Self {
            node_id: incidence.node_id().map(str::to_string),
            edge_ref_id: incidence.edge_ref_id().map(str::to_string),
            direction: incidence.direction().map(|d| d.as_str().to_string()),
            properties: incidence.properties().clone(),
        }
    }
}

impl From<&Hyperedge> for EdgeRecord {
    fn from(edge: &Hyperedge) -> Self {
        Self {
            id: edge.id().to_string(),
            edge_type: edge.edge_type().to_string(),
            incidences: edge.incidences().iter().map(IncidenceRecord::from).collect(),
            properties: edge.properties().clone(),
            provenance: edge.provenance().clone(),
        }
    }
}

impl TryFrom<NodeRecord> for Node {
    type Error = HypaError;

    fn try_from(record: NodeRecord) -> Result<Self, Self::Error> {
        Ok(Node::new(record.id, record.node_type)?.with_properties(record.properties))
    }
}

impl TryFrom<IncidenceRecord> for Incidence {
    type Error = HypaError;

    fn try_from(record: IncidenceRecord) -> Result<Self, Self::Error> {
        Ok(Incidence::from_parts(
            record.node_id,
            record.edge_ref_id,
            record.direction.as_deref(),
        )?
        .with_properties(record.properties))
    }
}

impl TryFrom<EdgeRecord> for Hyperedge {
    type Error = HypaError;

    fn try_from(record: EdgeRecord) -> Result<Self, Self::Error> {
        let incidences = record
            .incidences
            .into_iter()
            .map(Incidence::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| err.with_context("edge", &record.id))?;
        Ok(Hyperedge::new(record.id, record.edge_type, incidences)?
            .with_properties(record.properties)
            .with_provenance(record.provenance))
    }
}

impl Hypergraph {
    /// Exports every record in the nested-record form.
    pub fn to_plain(&self) -> GraphRecord {
        GraphRecord {
            schema_version: self.config().schema_version,
            nodes: self.nodes().map(NodeRecord::from).collect(),
            edges: self.edges().map(EdgeRecord::from).collect(),
        }
    }

    /// Rebuilds a hypergraph from its nested-record form with the default configuration.
    pub fn from_plain(record: GraphRecord) -> Result<Self, HypaError> {
        Self::from_plain_with_config(record, HypergraphConfig::default())
    }

    /// Rebuilds a hypergraph from its nested-record form.
    ///
    /// Every record is validated before anything is inserted, so a malformed
    /// payload never yields a partially loaded graph.
    pub fn from_plain_with_config(
        record: GraphRecord,
        config: HypergraphConfig,
    ) -> Result<Self, HypaError> {
        if !config.schema_version.is_compatible(&record.schema_version) {
            return Err(HypaError::Serde(
                ErrorInfo::new("schema-mismatch", "unsupported nested-record schema version")
                    .with_context("expected_major", config.schema_version.major.to_string())
                    .with_context("found_major", record.schema_version.major.to_string()),
            ));
        }
        let nodes = record
            .nodes
            .into_iter()
            .map(Node::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let edges = record
            .edges
            .into_iter()
            .map(Hyperedge::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let mut graph = Hypergraph::new(config);
        for node in nodes {
            graph.add_node(node);
        }
        for edge in edges {
            graph.add_edge(edge);
        }
        Ok(graph)
    }
}

/// Serializes the graph's nested-record form to a JSON string.
pub fn graph_to_json(graph: &Hypergraph) -> Result<String, HypaError> {
    serde_json::to_string_pretty(&graph.to_plain())
        .map_err(|err| HypaError::Serde(ErrorInfo::new("serialize-json", err.to_string())))
}

/// Restores a graph from a JSON nested-record payload.
pub fn graph_from_json(json: &str) -> Result<Hypergraph, HypaError> {
    let record: GraphRecord = serde_json::from_str(json)
        .map_err(|err| HypaError::Serde(ErrorInfo::new("deserialize-json", err.to_string())))?;
    Hypergraph::from_plain(record)
}

fn default_schema() -> SchemaVersion {
    SCHEMA_VERSION
}
