//! Import and export of the Hypergraph Interchange Format (HIF).
//!
//! HIF keeps incidences in one flat root-level array and names node and edge
//! identifiers `node` and `edge`. Engine-only fields travel as reserved
//! attributes: `_type` on nodes and edges, `_source` and `_confidence` on
//! edges. Edge-ref incidences have no HIF representation; they are dropped on
//! export and counted in `metadata._hypabase_edge_refs_omitted`.

use std::collections::BTreeMap;

use hypa_core::errors::{ErrorInfo, HypaError};
use hypa_core::{
    expect_string, value_kind, Direction, Hyperedge, Incidence, Node, Properties, Provenance,
    DEFAULT_SOURCE,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::flags::{HypergraphConfig, HIF_VERSION};
use crate::graph::Hypergraph;

const TYPE_ATTR: &str = "_type";
const SOURCE_ATTR: &str = "_source";
const CONFIDENCE_ATTR: &str = "_confidence";
const UNKNOWN_TYPE: &str = "unknown";

/// Root HIF document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HifDocument {
    /// `"directed"` when any incidence carries a direction, else `"undirected"`.
    #[serde(
        rename = "network-type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub network_type: Option<String>,
    /// Free-form document metadata.
    #[serde(default)]
    pub metadata: HifMetadata,
    /// Flat incidence array.
    #[serde(default)]
    pub incidences: Vec<HifIncidence>,
    /// Node records; may be omitted by producers.
    #[serde(default)]
    pub nodes: Vec<HifNode>,
    /// Edge records; may be omitted by producers.
    #[serde(default)]
    pub edges: Vec<HifEdge>,
}

/// Document metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HifMetadata {
    /// Name of the producing tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    /// Producer format version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Number of edge-ref incidences dropped on export.
    #[serde(
        rename = "_hypabase_edge_refs_omitted",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub edge_refs_omitted: Option<u64>,
    /// Any other metadata keys, preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Identifier that producers may encode as a string, a number or a boolean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HifId {
    /// Textual identifier.
    Text(String),
    /// Numeric identifier, coerced to its decimal string on import.
    Number(serde_json::Number),
    /// Boolean identifier, coerced to `"true"` or `"false"` on import.
    Bool(bool),
}

impl HifId {
    /// Returns the identifier as a string.
    pub fn into_string(self) -> String {
        match self {
            HifId::Text(text) => text,
            HifId::Number(number) => number.to_string(),
            HifId::Bool(flag) => flag.to_string(),
        }
    }
}

impl From<&str> for HifId {
    fn from(value: &str) -> Self {
        HifId::Text(value.to_string())
    }
}

/// One node-to-edge participation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HifIncidence {
    /// Participating node.
    pub node: HifId,
    /// Containing edge.
    pub edge: HifId,
    /// `"head"`, `"tail"` or absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    /// Incidence attributes.
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub attrs: Properties,
}

/// Node entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HifNode {
    /// Node identifier.
    pub node: HifId,
    /// Node attributes, including the reserved `_type`.
    #[serde(default)]
    pub attrs: Properties,
}

/// Edge entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HifEdge {
    /// Edge identifier.
    pub edge: HifId,
    /// Edge attributes, including the reserved `_type`, `_source` and `_confidence`.
    #[serde(default)]
    pub attrs: Properties,
}

struct PendingEdge {
    edge_type: String,
    provenance: Provenance,
    properties: Properties,
    incidences: Vec<Incidence>,
}

impl PendingEdge {
    fn placeholder() -> Self {
        Self {
            edge_type: UNKNOWN_TYPE.to_string(),
            provenance: Provenance::default(),
            properties: Properties::new(),
            incidences: Vec::new(),
        }
    }
}

impl Hypergraph {
    /// Exports the graph as a HIF document.
    pub fn to_hif(&self) -> HifDocument {
        let mut incidences = Vec::new();
        let mut omitted = 0u64;
        for edge in self.edges() {
            for incidence in edge.incidences() {
                let Some(node_id) = incidence.node_id() else {
                    omitted += 1;
                    continue;
                };
                incidences.push(HifIncidence {
                    node: node_id.into(),
                    edge: edge.id().into(),
                    direction: incidence.direction().map(|d| d.as_str().to_string()),
                    attrs: incidence.properties().clone(),
                });
            }
        }
        if omitted > 0 {
            tracing::warn!(omitted, "edge-ref incidences are not representable in HIF");
        }

        let nodes = self
            .nodes()
            .map(|node| {
                let mut attrs = node.properties().clone();
                attrs.insert(TYPE_ATTR.to_string(), Value::from(node.node_type()));
                HifNode {
                    node: node.id().into(),
                    attrs,
                }
            })
            .collect();

        // user properties are applied last and win over same-named reserved attrs
        let edges = self
            .edges()
            .map(|edge| {
                let mut attrs = Properties::new();
                attrs.insert(TYPE_ATTR.to_string(), Value::from(edge.edge_type()));
                if edge.source() != DEFAULT_SOURCE {
                    attrs.insert(SOURCE_ATTR.to_string(), Value::from(edge.source()));
                }
                if edge.confidence() != 1.0 {
                    attrs.insert(CONFIDENCE_ATTR.to_string(), Value::from(edge.confidence()));
                }
                attrs.extend(edge.properties().clone());
                HifEdge {
                    edge: edge.id().into(),
                    attrs,
                }
            })
            .collect();

        let directed = self.edges().any(Hyperedge::is_directed);
        HifDocument {
            network_type: Some(if directed { "directed" } else { "undirected" }.to_string()),
            metadata: HifMetadata {
                generator: Some(self.config().hif_generator.clone()),
                version: Some(HIF_VERSION.to_string()),
                edge_refs_omitted: (omitted > 0).then_some(omitted),
                extra: BTreeMap::new(),
            },
            incidences,
            nodes,
            edges,
        }
    }

    /// Imports a HIF document with the default configuration.
    ///
    /// Nodes and edges named only by incidences are auto-created with type
    /// `"unknown"`. With `strict`, any auto-creation fails the import instead.
    pub fn from_hif(document: HifDocument, strict: bool) -> Result<Self, HypaError> {
        Self::from_hif_with_config(document, strict, HypergraphConfig::default())
    }

    /// Imports a HIF document into a graph with the given configuration.
    pub fn from_hif_with_config(
        document: HifDocument,
        strict: bool,
        config: HypergraphConfig,
    ) -> Result<Self, HypaError> {
        let mut graph = Hypergraph::new(config);
        let mut pending: BTreeMap<String, PendingEdge> = BTreeMap::new();
        let mut auto_nodes: Vec<String> = Vec::new();
        let mut auto_edges: Vec<String> = Vec::new();

        for entry in document.edges {
            let edge_id = entry.edge.into_string();
            let mut attrs = entry.attrs;
            let edge_type = take_string(&mut attrs, TYPE_ATTR)?.unwrap_or_else(|| UNKNOWN_TYPE.into());
            let source = take_string(&mut attrs, SOURCE_ATTR)?.unwrap_or_else(|| DEFAULT_SOURCE.into());
            let confidence = take_confidence(&mut attrs)?;
            let provenance = Provenance::new(source, confidence)
                .map_err(|err| err.with_context("edge", &edge_id))?;
            pending.insert(
                edge_id,
                PendingEdge {
                    edge_type,
                    provenance,
                    properties: attrs,
                    incidences: Vec::new(),
                },
            );
        }

        for entry in document.nodes {
            let mut attrs = entry.attrs;
            let node_type = take_string(&mut attrs, TYPE_ATTR)?.unwrap_or_else(|| UNKNOWN_TYPE.into());
            graph.add_node(Node::new(entry.node.into_string(), node_type)?.with_properties(attrs));
        }

        for entry in document.incidences {
            let node_id = entry.node.into_string();
            let edge_id = entry.edge.into_string();
            if !graph.has_node(&node_id) {
                graph.add_node(Node::new(node_id.clone(), UNKNOWN_TYPE)?);
                auto_nodes.push(node_id.clone());
            }
            let direction = Direction::parse_optional(entry.direction.as_deref())?;
            let mut incidence = Incidence::node(node_id).with_properties(entry.attrs);
            if let Some(direction) = direction {
                incidence = incidence.with_direction(direction);
            }
            pending
                .entry(edge_id.clone())
                .or_insert_with(|| {
                    auto_edges.push(edge_id);
                    PendingEdge::placeholder()
                })
                .incidences
                .push(incidence);
        }

        if strict && !(auto_nodes.is_empty() && auto_edges.is_empty()) {
            tracing::warn!(
                nodes = auto_nodes.len(),
                edges = auto_edges.len(),
                "strict HIF import rejected auto-created records"
            );
            return Err(HypaError::Hif(
                ErrorInfo::new(
                    "strict-auto-create",
                    "HIF import validation failed: records would be auto-created",
                )
                .with_context("auto_created_nodes", auto_nodes.join(","))
                .with_context("auto_created_edges", auto_edges.join(","))
                .with_hint("list every node and edge explicitly or import without strict mode"),
            ));
        }

        for (edge_id, edge) in pending {
            graph.add_edge(
                Hyperedge::new(edge_id, edge.edge_type, edge.incidences)?
                    .with_properties(edge.properties)
                    .with_provenance(edge.provenance),
            );
        }
        Ok(graph)
    }
}

/// Serializes the graph as a HIF JSON string.
pub fn hif_to_json(graph: &Hypergraph) -> Result<String, HypaError> {
    serde_json::to_string_pretty(&graph.to_hif())
        .map_err(|err| HypaError::Serde(ErrorInfo::new("serialize-hif", err.to_string())))
}

/// Parses a HIF JSON string and imports it.
pub fn hif_from_json(json: &str, strict: bool) -> Result<Hypergraph, HypaError> {
    let document: HifDocument = serde_json::from_str(json)
        .map_err(|err| HypaError::Hif(ErrorInfo::new("deserialize-hif", err.to_string())))?;
    Hypergraph::from_hif(document, strict)
}

fn take_string(attrs: &mut Properties, key: &str) -> Result<Option<String>, HypaError> {
    attrs
        .remove(key)
        .map(|value| expect_string(key, &value))
        .transpose()
}

fn take_confidence(attrs: &mut Properties) -> Result<f64, HypaError> {
    match attrs.remove(CONFIDENCE_ATTR) {
        None => Ok(1.0),
        Some(value) => value.as_f64().ok_or_else(|| {
            HypaError::Validation(
                ErrorInfo::new("invalid-type", "_confidence must be a number")
                    .with_context("field", CONFIDENCE_ATTR)
                    .with_context("found", value_kind(&value)),
            )
        }),
    }
}
