//! Validated value records stored by the engine: nodes, incidences and hyperedges.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{domain_error, validation_error, HypaError};
use crate::provenance::Provenance;

/// Schema-less metadata attached to nodes, incidences and hyperedges.
pub type Properties = BTreeMap<String, Value>;

/// An entity participating in hyperedges.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: String,
    node_type: String,
    properties: Properties,
}

impl Node {
    /// Creates a node with an empty property map.
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Result<Self, HypaError> {
        let id = id.into();
        check_identifier("node", &id)?;
        Ok(Self {
            id,
            node_type: node_type.into(),
            properties: Properties::new(),
        })
    }

    /// Replaces the property map.
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Sets a single property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Returns the node identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the node classification.
    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    /// Returns the node metadata.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Returns `newer` with `self`'s properties underneath it: keys in `newer`
    /// win, keys only present in `self` survive.
    pub fn merged_with(&self, newer: &Node) -> Node {
        let mut properties = self.properties.clone();
        properties.extend(
            newer
                .properties
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        Node {
            id: newer.id.clone(),
            node_type: newer.node_type.clone(),
            properties,
        }
    }
}

/// Role of a participant inside a directed hyperedge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Receiver or target of the relationship.
    Head,
    /// Sender or source of the relationship.
    Tail,
}

impl Direction {
    /// Returns the wire spelling of the direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Head => "head",
            Direction::Tail => "tail",
        }
    }

    /// Parses an optional direction string; `None` means undirected.
    pub fn parse_optional(value: Option<&str>) -> Result<Option<Direction>, HypaError> {
        value.map(Direction::from_str).transpose()
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = HypaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "head" => Ok(Direction::Head),
            "tail" => Ok(Direction::Tail),
            other => Err(domain_error(
                "invalid-direction",
                "incidence direction must be unset, 'head' or 'tail'",
            )
            .with_context("direction", other)),
        }
    }
}

/// What an incidence points at: a node, or another hyperedge (metagraph).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Participant {
    /// A node member.
    Node(String),
    /// A referenced hyperedge.
    Edge(String),
}

/// One participation record inside a hyperedge.
#[derive(Debug, Clone, PartialEq)]
pub struct Incidence {
    participant: Participant,
    direction: Option<Direction>,
    properties: Properties,
}

impl Incidence {
    /// Creates an undirected node incidence.
    pub fn node(node_id: impl Into<String>) -> Self {
        Self::with_participant(Participant::Node(node_id.into()))
    }

    /// Creates an undirected incidence referencing another hyperedge.
    pub fn edge_ref(edge_id: impl Into<String>) -> Self {
        Self::with_participant(Participant::Edge(edge_id.into()))
    }

    fn with_participant(participant: Participant) -> Self {
        Self {
            participant,
            direction: None,
            properties: Properties::new(),
        }
    }

    /// Builds an incidence from the optional-field shape used by nested records.
    ///
    /// Exactly one of `node_id` and `edge_ref_id` must be present.
    pub fn from_parts(
        node_id: Option<String>,
        edge_ref_id: Option<String>,
        direction: Option<&str>,
    ) -> Result<Self, HypaError> {
        let participant = match (node_id, edge_ref_id) {
            (Some(node), None) => Participant::Node(node),
            (None, Some(edge)) => Participant::Edge(edge),
            (None, None) => {
                return Err(validation_error(
                    "incidence-shape",
                    "incidence must have either node_id or edge_ref_id",
                ))
            }
            (Some(node), Some(edge)) => {
                return Err(validation_error(
                    "incidence-shape",
                    "incidence cannot have both node_id and edge_ref_id",
                )
                .with_context("node_id", node)
                .with_context("edge_ref_id", edge))
            }
        };
        Ok(Self {
            participant,
            direction: Direction::parse_optional(direction)?,
            properties: Properties::new(),
        })
    }

    /// Sets the direction of this incidence.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Replaces the incidence metadata.
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Returns the participant.
    pub fn participant(&self) -> &Participant {
        &self.participant
    }

    /// Returns the node id when this incidence points at a node.
    pub fn node_id(&self) -> Option<&str> {
        match &self.participant {
            Participant::Node(id) => Some(id),
            Participant::Edge(_) => None,
        }
    }

    /// Returns the referenced edge id when this incidence points at an edge.
    pub fn edge_ref_id(&self) -> Option<&str> {
        match &self.participant {
            Participant::Edge(id) => Some(id),
            Participant::Node(_) => None,
        }
    }

    /// Returns the optional direction.
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Returns the incidence metadata.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

/// An n-ary relationship between nodes and/or other hyperedges.
#[derive(Debug, Clone, PartialEq)]
pub struct Hyperedge {
    id: String,
    edge_type: String,
    incidences: Vec<Incidence>,
    properties: Properties,
    provenance: Provenance,
}

impl Hyperedge {
    /// Creates a hyperedge with default provenance and no metadata.
    pub fn new(
        id: impl Into<String>,
        edge_type: impl Into<String>,
        incidences: Vec<Incidence>,
    ) -> Result<Self, HypaError> {
        let id = id.into();
        check_identifier("edge", &id)?;
        Ok(Self {
            id,
            edge_type: edge_type.into(),
            incidences,
            properties: Properties::new(),
            provenance: Provenance::default(),
        })
    }

    /// Creates an undirected hyperedge over the given node ids.
    pub fn from_nodes<I, S>(
        id: impl Into<String>,
        edge_type: impl Into<String>,
        node_ids: I,
    ) -> Result<Self, HypaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let incidences = node_ids.into_iter().map(Incidence::node).collect();
        Self::new(id, edge_type, incidences)
    }

    /// Replaces the metadata.
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Sets a single property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Replaces the provenance record.
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// Sets source and confidence, validating the confidence range.
    pub fn with_source(self, source: impl Into<String>, confidence: f64) -> Result<Self, HypaError> {
        let provenance = Provenance::new(source, confidence)
            .map_err(|err| err.with_context("edge", &self.id))?;
        Ok(self.with_provenance(provenance))
    }

    /// Returns the edge identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the edge classification.
    pub fn edge_type(&self) -> &str {
        &self.edge_type
    }

    /// Returns the ordered incidences.
    pub fn incidences(&self) -> &[Incidence] {
        &self.incidences
    }

    /// Returns the edge metadata.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Returns the provenance record.
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Returns the provenance label.
    pub fn source(&self) -> &str {
        self.provenance.source()
    }

    /// Returns the confidence score.
    pub fn confidence(&self) -> f64 {
        self.provenance.confidence()
    }

    /// Participating node ids in incidence order.
    pub fn nodes(&self) -> Vec<&str> {
        self.incidences.iter().filter_map(Incidence::node_id).collect()
    }

    /// Participating node ids as a set.
    pub fn node_set(&self) -> BTreeSet<&str> {
        self.incidences.iter().filter_map(Incidence::node_id).collect()
    }

    /// Referenced edge ids in incidence order.
    pub fn edge_refs(&self) -> Vec<&str> {
        self.incidences
            .iter()
            .filter_map(Incidence::edge_ref_id)
            .collect()
    }

    /// Node ids whose incidence is marked `head`.
    pub fn head_nodes(&self) -> Vec<&str> {
        self.nodes_with(Direction::Head)
    }

    /// Node ids whose incidence is marked `tail`.
    pub fn tail_nodes(&self) -> Vec<&str> {
        self.nodes_with(Direction::Tail)
    }

    /// True if any incidence carries a direction.
    pub fn is_directed(&self) -> bool {
        self.incidences.iter().any(|inc| inc.direction.is_some())
    }

    fn nodes_with(&self, direction: Direction) -> Vec<&str> {
        self.incidences
            .iter()
            .filter(|inc| inc.direction == Some(direction))
            .filter_map(Incidence::node_id)
            .collect()
    }
}

/// Rejects empty identifiers.
pub fn check_identifier(kind: &str, id: &str) -> Result<(), HypaError> {
    if id.is_empty() {
        return Err(validation_error(
            "empty-identifier",
            format!("{kind} id must be a non-empty string"),
        )
        .with_context("kind", kind));
    }
    Ok(())
}

/// Extracts a string from a dynamically typed value, failing with `invalid-type`.
pub fn expect_string(field: &str, value: &Value) -> Result<String, HypaError> {
    match value {
        Value::String(text) => Ok(text.clone()),
        other => Err(validation_error(
            "invalid-type",
            format!("{field} must be a string"),
        )
        .with_context("field", field)
        .with_context("found", value_kind(other))),
    }
}

/// Names the JSON kind of a value for diagnostics.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
