#![deny(missing_docs)]
//! Record types, provenance descriptors and the error surface shared by the
//! hypabase hypergraph engine.

pub mod errors;
pub mod provenance;
pub mod records;
pub mod rng;

pub use errors::{ErrorInfo, HypaError};
pub use provenance::{check_confidence, Provenance, SchemaVersion, DEFAULT_SOURCE};
pub use records::{
    check_identifier, expect_string, value_kind, Direction, Hyperedge, Incidence, Node,
    Participant, Properties,
};
pub use rng::{derive_substream_seed, RngHandle};
