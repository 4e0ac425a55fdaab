//! Structured error types shared across hypabase crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`HypaError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (identifiers, offending values, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the hypabase engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum HypaError {
    /// Malformed record shape, out of range values or wrongly typed fields.
    #[error("validation error: {0}")]
    Validation(ErrorInfo),
    /// Enumerated parameter outside its domain (direction, direction mode).
    #[error("domain error: {0}")]
    Domain(ErrorInfo),
    /// Failure reported by a caller supplied merge function.
    #[error("merge error: {0}")]
    Merge(ErrorInfo),
    /// Interchange format import failures.
    #[error("hif error: {0}")]
    Hif(ErrorInfo),
    /// Namespace directory errors.
    #[error("namespace error: {0}")]
    Namespace(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl HypaError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            HypaError::Validation(info)
            | HypaError::Domain(info)
            | HypaError::Merge(info)
            | HypaError::Hif(info)
            | HypaError::Namespace(info)
            | HypaError::Serde(info) => info,
        }
    }

    /// Returns the stable error code of the payload.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// Adds a context entry to the payload regardless of the error family.
    pub fn with_context(self, key: impl Into<String>, value: impl ToString) -> Self {
        let value = value.to_string();
        match self {
            HypaError::Validation(info) => HypaError::Validation(info.with_context(key, value)),
            HypaError::Domain(info) => HypaError::Domain(info.with_context(key, value)),
            HypaError::Merge(info) => HypaError::Merge(info.with_context(key, value)),
            HypaError::Hif(info) => HypaError::Hif(info.with_context(key, value)),
            HypaError::Namespace(info) => HypaError::Namespace(info.with_context(key, value)),
            HypaError::Serde(info) => HypaError::Serde(info.with_context(key, value)),
        }
    }
}

pub(crate) fn validation_error(code: impl Into<String>, message: impl Into<String>) -> HypaError {
    HypaError::Validation(ErrorInfo::new(code, message))
}

pub(crate) fn domain_error(code: impl Into<String>, message: impl Into<String>) -> HypaError {
    HypaError::Domain(ErrorInfo::new(code, message))
}
