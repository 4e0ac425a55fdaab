use hypa_core::SchemaVersion;
use serde::{Deserialize, Serialize};

/// Schema version written into every nested-record export.
pub const SCHEMA_VERSION: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Version string written into HIF export metadata.
pub const HIF_VERSION: &str = "1.0";

/// Configuration options that control the behaviour of [`Hypergraph`](crate::Hypergraph).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypergraphConfig {
    /// Schema version stored alongside nested-record exports.
    pub schema_version: SchemaVersion,
    /// Defaults used for path queries created through the engine.
    pub path_defaults: PathDefaults,
    /// Generator label written into HIF export metadata.
    pub hif_generator: String,
}

impl Default for HypergraphConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            path_defaults: PathDefaults::default(),
            hif_generator: "hypabase".to_string(),
        }
    }
}

/// Default limits applied to path queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathDefaults {
    /// Minimum number of shared nodes between consecutive hyperedges.
    pub min_intersection: usize,
    /// Maximum number of hyperedges in a path.
    pub max_hops: usize,
    /// Maximum number of paths returned by one search.
    pub max_paths: usize,
}

impl Default for PathDefaults {
    fn default() -> Self {
        Self {
            min_intersection: 1,
            max_hops: 4,
            max_paths: 10,
        }
    }
}
