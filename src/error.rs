//! Error taxonomy for detection and synthesis
//!
//! Everything in [`DetectError`] is recoverable: the detector chain and the
//! synthesizer turn these into [`Diagnostic`](crate::diagnostics::Diagnostic)s and
//! keep going. [`ContractError`] is reserved for a misconfigured detector set and
//! aborts the run before any input is read.

use crate::diagnostics::Severity;
use crate::model::ComponentKind;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DetectError {
    #[error("Resource not found: {path}")]
    ResourceNotFound { path: String },

    #[error("Failed to read resource {path}: {message}")]
    ResourceRead { path: String, message: String },

    #[error("Failed to parse {resource}: {message}")]
    Parse { resource: String, message: String },

    #[error("Detector '{detector}' cannot recognize components here: {reason}")]
    UnrecognizedDialect { detector: String, reason: String },

    #[error("Class {class_name} referenced by {referrer} cannot be loaded")]
    UnresolvedClass {
        class_name: String,
        referrer: String,
    },

    #[error("No template registered for {kind} component {class_name}")]
    MissingTemplate {
        kind: ComponentKind,
        class_name: String,
    },
}

impl DetectError {
    pub fn parse(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            resource: resource.into(),
            message: message.into(),
        }
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::ResourceNotFound { path: path.into() }
    }

    /// Severity used when this error is reported as a diagnostic
    pub fn severity(&self) -> Severity {
        match self {
            DetectError::UnrecognizedDialect { .. } => Severity::Info,
            DetectError::MissingTemplate { .. } | DetectError::UnresolvedClass { .. } => {
                Severity::Warn
            }
            DetectError::ResourceNotFound { .. }
            | DetectError::ResourceRead { .. }
            | DetectError::Parse { .. } => Severity::Error,
        }
    }

    /// The resource (file path or class name) the error is about
    pub fn resource(&self) -> Option<&str> {
        match self {
            DetectError::ResourceNotFound { path } | DetectError::ResourceRead { path, .. } => {
                Some(path)
            }
            DetectError::Parse { resource, .. } => Some(resource),
            DetectError::MissingTemplate { class_name, .. }
            | DetectError::UnresolvedClass { class_name, .. } => Some(class_name),
            DetectError::UnrecognizedDialect { .. } => None,
        }
    }
}

/// A detector set that cannot produce a sound entry point
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractError {
    #[error("Detector '{detector}' declares model extension {kind} but contributes no template for it")]
    UncoveredExtension {
        detector: String,
        kind: ComponentKind,
    },

    #[error("Detector '{detector}' references unknown template '{template}'")]
    UnknownTemplate { detector: String, template: String },

    #[error("Template '{template}' for {kind} is contributed by a detector that does not declare {kind} as an extension ('{detector}')")]
    UndeclaredTemplateKind {
        detector: String,
        template: String,
        kind: ComponentKind,
    },

    #[error("Component kind {kind} is claimed by both '{first}' and '{second}'")]
    DuplicateTemplate {
        kind: ComponentKind,
        first: String,
        second: String,
    },

    #[error("Unknown detector '{0}'")]
    UnknownDetector(String),
}
