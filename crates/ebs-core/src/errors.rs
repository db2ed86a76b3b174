//! Structured error types shared across the beam-shape crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`EbsError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (axis names, parameter values, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Canonical error type for the beam-shape simulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum EbsError {
    /// Malformed or physically inconsistent configuration.
    #[error("invalid parameter: {0}")]
    InvalidParameter(ErrorInfo),
    /// Query for an unknown bunch or axis identifier.
    #[error("not found: {0}")]
    NotFound(ErrorInfo),
    /// Nonlinear fit failed to converge or produced a singular covariance.
    #[error("fit convergence: {0}")]
    FitConvergence(ErrorInfo),
    /// Serialization and artifact format errors.
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
        Ok(())
    }
}

impl EbsError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            EbsError::InvalidParameter(info)
            | EbsError::NotFound(info)
            | EbsError::FitConvergence(info)
            | EbsError::Serde(info) => info,
        }
    }

    /// Shorthand for an [`EbsError::InvalidParameter`] with a single context entry.
    pub fn invalid_parameter(
        code: &str,
        message: impl Into<String>,
        key: &str,
        value: impl Display,
    ) -> Self {
        EbsError::InvalidParameter(
            ErrorInfo::new(code, message.into()).with_context(key, value.to_string()),
        )
    }
}
