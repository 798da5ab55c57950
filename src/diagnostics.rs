//! Diagnostics collected during a run
//!
//! Every entry is also emitted through `tracing` at the matching level, so a run
//! with logging enabled shows problems as they happen while callers still get the
//! full list at the end.

use crate::error::DetectError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warn => write!(f, "warn"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resource {
            Some(resource) => write!(f, "[{}] {} ({})", self.severity, self.message, resource),
            None => write!(f, "[{}] {}", self.severity, self.message),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        let resource = diagnostic.resource.as_deref().unwrap_or("-");
        match diagnostic.severity {
            Severity::Info => info!(resource, "{}", diagnostic.message),
            Severity::Warn => warn!(resource, "{}", diagnostic.message),
            Severity::Error => error!(resource, "{}", diagnostic.message),
        }
        self.entries.push(diagnostic);
    }

    pub fn info(&mut self, message: impl Into<String>, resource: Option<&str>) {
        self.record(Severity::Info, message, resource);
    }

    pub fn warn(&mut self, message: impl Into<String>, resource: Option<&str>) {
        self.record(Severity::Warn, message, resource);
    }

    pub fn error(&mut self, message: impl Into<String>, resource: Option<&str>) {
        self.record(Severity::Error, message, resource);
    }

    /// Records a recoverable error at the severity its kind implies
    pub fn report(&mut self, err: &DetectError) {
        self.record(err.severity(), err.to_string(), err.resource());
    }

    fn record(&mut self, severity: Severity, message: impl Into<String>, resource: Option<&str>) {
        self.push(Diagnostic {
            severity,
            message: message.into(),
            resource: resource.map(str::to_string),
        });
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|d| d.severity == severity).count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
