use hypa_core::errors::{ErrorInfo, HypaError};
use hypa_core::SchemaVersion;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::graph::Hypergraph;
use crate::serialization::{EdgeRecord, NodeRecord};

/// Computes a SHA-256 digest over every record of the graph.
///
/// Records are visited in id order and property maps are key-sorted, so two
/// graphs holding the same records hash equal regardless of insertion order.
/// Indexes are derived state and do not contribute.
pub fn canonical_hash(graph: &Hypergraph) -> Result<String, HypaError> {
    let mut hasher = Sha256::new();
    encode_schema(&graph.config().schema_version, &mut hasher);

    hasher.update((graph.node_count() as u64).to_le_bytes());
    for node in graph.nodes() {
        update_record(&NodeRecord::from(node), &mut hasher)?;
    }
    hasher.update((graph.edge_count() as u64).to_le_bytes());
    for edge in graph.edges() {
        update_record(&EdgeRecord::from(edge), &mut hasher)?;
    }

    Ok(format!("{:x}", hasher.finalize()))
}

fn encode_schema(version: &SchemaVersion, hasher: &mut Sha256) {
    hasher.update(b"schema");
    hasher.update(version.major.to_le_bytes());
    hasher.update(version.minor.to_le_bytes());
    hasher.update(version.patch.to_le_bytes());
}

fn update_record<T: Serialize>(record: &T, hasher: &mut Sha256) -> Result<(), HypaError> {
    let bytes = serde_json::to_vec(record)
        .map_err(|err| HypaError::Serde(ErrorInfo::new("hash-encode", err.to_string())))?;
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(&bytes);
    Ok(())
}
