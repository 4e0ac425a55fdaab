//! Provenance and schema descriptors attached to hyperedges and exports.

use serde::{Deserialize, Serialize};

use crate::errors::{validation_error, HypaError};

/// Source label used when a hyperedge does not name where it came from.
pub const DEFAULT_SOURCE: &str = "unknown";

/// Semantic version describing the schema of serialized payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version incremented for breaking changes.
    pub major: u32,
    /// Minor version incremented for additive changes.
    pub minor: u32,
    /// Patch version incremented for bug fixes and documentation updates.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a new schema version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Returns whether payloads written with `other` can be read by `self`.
    pub fn is_compatible(&self, other: &SchemaVersion) -> bool {
        self.major == other.major
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// Where a hyperedge came from and how much it is trusted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Provenance {
    source: String,
    confidence: f64,
}

impl Provenance {
    /// Creates a provenance record, rejecting confidences outside `[0, 1]`.
    pub fn new(source: impl Into<String>, confidence: f64) -> Result<Self, HypaError> {
        check_confidence(confidence)?;
        Ok(Self {
            source: source.into(),
            confidence,
        })
    }

    /// Returns the provenance label.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the confidence score in `[0, 1]`.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

impl Default for Provenance {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            confidence: 1.0,
        }
    }
}

/// Rejects confidences outside the closed unit interval (NaN included).
pub fn check_confidence(confidence: f64) -> Result<(), HypaError> {
    if (0.0..=1.0).contains(&confidence) {
        return Ok(());
    }
    Err(validation_error(
        "confidence-out-of-range",
        "hyperedge confidence must be between 0.0 and 1.0",
    )
    .with_context("confidence", confidence))
}

impl<'de> Deserialize<'de> for Provenance {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default = "default_source")]
            source: String,
            #[serde(default = "default_confidence")]
            confidence: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Provenance::new(raw.source, raw.confidence).map_err(serde::de::Error::custom)
    }
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

fn default_confidence() -> f64 {
    1.0
}
