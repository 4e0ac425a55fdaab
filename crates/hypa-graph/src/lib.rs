#![deny(missing_docs)]

//! Indexed in-memory hypergraph engine built on the `hypa-core` records.
//!
//! [`Hypergraph`] is the unsynchronized core holding records and indexes.
//! [`HypergraphStore`] shares one graph across threads behind a single lock,
//! and [`HypergraphDb`] keeps a directory of named stores.

mod flags;
mod generators;
mod graph;
mod hash;
mod hif;
mod index;
mod namespace;
mod paths;
mod serialization;
mod store;
mod validate;

pub use flags::{HypergraphConfig, PathDefaults, HIF_VERSION, SCHEMA_VERSION};
pub use generators::gen_random_hypergraph;
pub use graph::{GraphStats, Hypergraph, MergeFn};
pub use hash::canonical_hash;
pub use hif::{
    hif_from_json, hif_to_json, HifDocument, HifEdge, HifId, HifIncidence, HifMetadata, HifNode,
};
pub use index::VertexSet;
pub use namespace::{DbStats, HypergraphDb, NamespaceStats, DEFAULT_NAMESPACE};
pub use paths::{DirectionMode, PathQuery};
pub use serialization::{
    graph_from_json, graph_to_json, EdgeRecord, GraphRecord, IncidenceRecord, NodeRecord,
};
pub use store::{Batch, HypergraphStore};
pub use validate::ValidationReport;
