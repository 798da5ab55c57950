//! Detectors recognize one family of container-managed components
//!
//! Each detector works in two passes. `detect_from_source` looks at compiled
//! class signatures only and must not depend on what other detectors found.
//! `detect_from_config` runs afterwards, in registry order, and may re-classify
//! components found earlier by reading the configuration files they name.

pub mod chain;
pub mod registry;
pub mod servlet;
pub mod struts;

pub use chain::{Detection, DetectorChain};
pub use registry::DetectorRegistry;
pub use servlet::ServletDetector;
pub use struts::StrutsDetector;

use crate::diagnostics::Diagnostics;
use crate::error::DetectError;
use crate::model::{ApplicationBuilder, ClassIndex, ComponentKind};

/// Everything a detector may read or write during one pass
pub struct DetectionContext<'a> {
    pub app: &'a mut ApplicationBuilder,
    pub classes: &'a ClassIndex,
    pub diagnostics: &'a mut Diagnostics,
}

impl<'a> DetectionContext<'a> {
    pub fn new(
        app: &'a mut ApplicationBuilder,
        classes: &'a ClassIndex,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            app,
            classes,
            diagnostics,
        }
    }
}

pub trait Detector: Send + Sync {
    /// Stable identifier used for configuration and logs
    fn name(&self) -> &'static str;

    /// Registers components recognized from class signatures.
    ///
    /// Returns [`DetectError::UnrecognizedDialect`] when the dialect cannot be
    /// recognized this way; the chain reports that as informational.
    fn detect_from_source(&self, ctx: &mut DetectionContext<'_>) -> Result<(), DetectError>;

    /// Enriches or re-classifies components using dialect configuration files.
    ///
    /// Per-file failures are reported to `ctx.diagnostics` and do not stop the
    /// remaining files; an `Err` means the detector could not run at all.
    fn detect_from_config(&self, ctx: &mut DetectionContext<'_>) -> Result<(), DetectError>;

    /// Component kinds this detector introduces
    fn model_extensions(&self) -> Vec<ComponentKind>;

    /// Files whose presence enables this detector; empty means always active
    fn check_files(&self) -> Vec<&'static str> {
        vec![]
    }

    /// Identifiers of the templates this detector contributes
    fn template_files(&self) -> Vec<&'static str>;
}

/// Splits a comma-separated list of configuration paths, dropping blanks
pub fn split_paths(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|p| !p.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_paths() {
        let paths: Vec<&str> = split_paths(" a.xml, b.xml ,,\n c.xml").collect();
        assert_eq!(paths, vec!["a.xml", "b.xml", "c.xml"]);
        assert_eq!(split_paths("").count(), 0);
    }
}
