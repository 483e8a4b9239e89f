//! Structured error types shared across qdyn crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`QdynError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (sites, layer indices, paths, etc.).
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

/// Canonical error type for qdyn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum QdynError {
    /// Invalid input parameters, detected before any generation work starts.
    #[error("configuration error: {0}")]
    Configuration(ErrorInfo),
    /// An internal structural invariant was violated. Indicates a defect, never bad input.
    #[error("invariant violation: {0}")]
    Invariant(ErrorInfo),
    /// A stored chain descriptor could not be parsed or is internally inconsistent.
    #[error("corrupt data: {0}")]
    CorruptData(ErrorInfo),
    /// Filesystem failures.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// The external execution engine failed or returned a malformed outcome.
    #[error("execution error: {0}")]
    Execution(ErrorInfo),
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

impl QdynError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            QdynError::Configuration(info)
            | QdynError::Invariant(info)
            | QdynError::CorruptData(info)
            | QdynError::Io(info)
            | QdynError::Execution(info) => info,
        }
    }

    /// Shorthand for a configuration error without context.
    pub fn configuration(code: &str, message: impl Into<String>) -> Self {
        QdynError::Configuration(ErrorInfo::new(code, message))
    }

    /// Shorthand for an invariant violation without context.
    pub fn invariant(code: &str, message: impl Into<String>) -> Self {
        QdynError::Invariant(ErrorInfo::new(code, message))
    }

    /// Shorthand for a corrupt-data error without context.
    pub fn corrupt(code: &str, message: impl Into<String>) -> Self {
        QdynError::CorruptData(ErrorInfo::new(code, message))
    }

    /// Wraps an I/O failure, recording the path and the OS error kind.
    pub fn io(code: &str, path: &Path, err: &std::io::Error) -> Self {
        QdynError::Io(
            ErrorInfo::new(code, err.to_string())
                .with_context("path", path.display().to_string())
                .with_context("kind", format!("{:?}", err.kind())),
        )
    }
}
