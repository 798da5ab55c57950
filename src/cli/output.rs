//! Output formatting for the synthesized entry point and detector listings
//!
//! Text output is the rendered driver; JSON and YAML carry the driver IR plus a
//! component summary and every diagnostic.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;

use crate::creator::EntryPoint;
use crate::detector::Detector;
use crate::diagnostics::{Diagnostic, Diagnostics, Severity};
use crate::model::{ActionMapping, Component, ComponentKind};
use crate::synth::Driver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Rendered driver listing
    Text,
    Json,
    Yaml,
}

#[derive(Debug, Serialize)]
struct ComponentSummary<'a> {
    class_name: &'a str,
    kind: ComponentKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    names: Vec<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    url_patterns: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    load_on_startup: Option<i32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    action_mappings: Vec<&'a ActionMapping>,
}

impl<'a> From<&'a Component> for ComponentSummary<'a> {
    fn from(component: &'a Component) -> Self {
        Self {
            class_name: component.class_name(),
            kind: component.kind(),
            names: component.names().collect(),
            url_patterns: component.url_patterns().collect(),
            load_on_startup: component.load_on_startup(),
            action_mappings: component.action_mappings().iter().collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct EntryPointReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
    components: Vec<ComponentSummary<'a>>,
    driver: &'a Driver,
    diagnostics: Vec<&'a Diagnostic>,
}

/// What a detector declares, for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectorInfo {
    pub name: &'static str,
    pub extensions: Vec<ComponentKind>,
    pub check_files: Vec<&'static str>,
    pub templates: Vec<&'static str>,
}

impl DetectorInfo {
    pub fn describe(detector: &dyn Detector) -> Self {
        Self {
            name: detector.name(),
            extensions: detector.model_extensions(),
            check_files: detector.check_files(),
            templates: detector.template_files(),
        }
    }
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn format_entry_point(&self, entry: &EntryPoint) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(entry.driver.render()),
            OutputFormat::Json => serde_json::to_string_pretty(&Self::report(entry))
                .context("Failed to serialize entry point to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(&Self::report(entry))
                .context("Failed to serialize entry point to YAML"),
        }
    }

    pub fn format_detectors(&self, detectors: &[DetectorInfo]) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(Self::detectors_text(detectors)),
            OutputFormat::Json => serde_json::to_string_pretty(detectors)
                .context("Failed to serialize detectors to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(detectors).context("Failed to serialize detectors to YAML")
            }
        }
    }

    /// One line per diagnostic plus a count summary; empty when there is nothing to say
    pub fn format_diagnostics(diagnostics: &Diagnostics) -> String {
        if diagnostics.is_empty() {
            return String::new();
        }
        let mut out = String::new();
        for diagnostic in diagnostics {
            let _ = writeln!(out, "{}", diagnostic);
        }
        let _ = writeln!(
            out,
            "{} error(s), {} warning(s), {} note(s)",
            diagnostics.count(Severity::Error),
            diagnostics.count(Severity::Warn),
            diagnostics.count(Severity::Info)
        );
        out
    }

    fn report(entry: &EntryPoint) -> EntryPointReport<'_> {
        EntryPointReport {
            display_name: entry.application.display_name(),
            components: entry.application.components().map(ComponentSummary::from).collect(),
            driver: &entry.driver,
            diagnostics: entry.diagnostics.iter().collect(),
        }
    }

    fn detectors_text(detectors: &[DetectorInfo]) -> String {
        let mut out = String::new();
        for info in detectors {
            let kinds: Vec<&str> = info.extensions.iter().map(|k| k.name()).collect();
            let _ = writeln!(out, "{}", info.name);
            let _ = writeln!(out, "  kinds:       {}", kinds.join(", "));
            if !info.check_files.is_empty() {
                let _ = writeln!(out, "  check files: {}", info.check_files.join(", "));
            }
            let _ = writeln!(out, "  templates:   {}", info.templates.join(", "));
        }
        out
    }
}
