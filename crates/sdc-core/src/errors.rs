//! Fatal errors of the suppression pipeline.
//!
//! Optimizer failures live in `sdc-solve` and never abort a run.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CellRef;

/// Code, message and coordinates of a fatal suppression error.
///
/// `code` is the stable kebab-case identifier tests and callers match on.
/// `context` usually names the offending cell, column or threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Kebab-case identifier such as `dominance-k-range`.
    pub code: String,
    /// What went wrong, for people.
    pub message: String,
    /// Offending cell, column, threshold or path, keyed by name.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// How to fix the input, when there is an obvious fix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Payload with no context and no hint.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Records one named piece of context.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Records the cell the error is about under the `cell` key.
    pub fn with_cell(self, cell: CellRef) -> Self {
        self.with_context("cell", cell.to_string())
    }

    /// Attaches a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the suppression engine.
///
/// Every variant is fatal for the run that raised it. Optimizer failures are
/// not represented here; they degrade to the heuristic instead of aborting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum SdcError {
    /// Invalid or out-of-range protection thresholds and solver settings.
    #[error("configuration error: {0}")]
    Configuration(ErrorInfo),
    /// Malformed input tables, rows or margin references.
    #[error("data error: {0}")]
    Data(ErrorInfo),
    /// Pipeline stages invoked out of order (for example solving before the graph exists).
    #[error("pipeline error: {0}")]
    Pipeline(ErrorInfo),
    /// Serialization and I/O errors at the adapter edge.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

/// Renders as `[code] message; key=value, ...; hint: ...`.
impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        let context: Vec<String> = self
            .context
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        if !context.is_empty() {
            write!(f, "; {}", context.join(", "))?;
        }
        match &self.hint {
            Some(hint) => write!(f, "; hint: {hint}"),
            None => Ok(()),
        }
    }
}

impl SdcError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            SdcError::Configuration(info)
            | SdcError::Data(info)
            | SdcError::Pipeline(info)
            | SdcError::Serde(info) => info,
        }
    }

    /// Shorthand for a [`SdcError::Configuration`] error.
    pub fn configuration(code: &str, message: impl Into<String>) -> Self {
        SdcError::Configuration(ErrorInfo::new(code, message))
    }

    /// Shorthand for a [`SdcError::Data`] error.
    pub fn data(code: &str, message: impl Into<String>) -> Self {
        SdcError::Data(ErrorInfo::new(code, message))
    }

    /// Error raised when the secondary solver runs before the constraint graph exists.
    pub fn graph_not_built() -> Self {
        SdcError::Pipeline(
            ErrorInfo::new("graph-not-built", "constraint graph has not been built")
                .with_hint("call build_graph after primary_pass and before solve_secondary"),
        )
    }

    /// Error raised when a later stage runs before the primary pass completed.
    pub fn primary_pass_missing() -> Self {
        SdcError::Pipeline(
            ErrorInfo::new("primary-pass-missing", "primary suppression has not run")
                .with_hint("call primary_pass first"),
        )
    }
}
