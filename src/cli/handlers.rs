use super::commands::{DetectorsArgs, SynthArgs};
use super::output::{DetectorInfo, OutputFormat, OutputFormatter};
use crate::config::WebentryConfig;
use crate::creator::{EntryPoint, EntryPointCreator};
use crate::detector::DetectorRegistry;
use crate::fs::RealFileSystem;
use crate::model::ClassIndex;
use crate::resource::ClasspathLoader;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_DIAGNOSTIC_ERRORS: i32 = 2;

pub fn handle_synth(args: &SynthArgs, quiet: bool) -> i32 {
    match run_synth(args, quiet) {
        Ok(entry) => {
            if args.fail_on_error && entry.diagnostics.has_errors() {
                EXIT_DIAGNOSTIC_ERRORS
            } else {
                EXIT_OK
            }
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            EXIT_FAILURE
        }
    }
}

pub fn handle_detectors(args: &DetectorsArgs) -> i32 {
    let registry = DetectorRegistry::with_defaults();
    let detectors: Vec<DetectorInfo> = registry
        .detectors()
        .iter()
        .map(|d| DetectorInfo::describe(d.as_ref()))
        .collect();

    match OutputFormatter::new(args.format.into()).format_detectors(&detectors) {
        Ok(text) => {
            print!("{}", text);
            EXIT_OK
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_FAILURE
        }
    }
}

fn run_synth(args: &SynthArgs, quiet: bool) -> Result<EntryPoint> {
    let mut config = WebentryConfig::from_env().context("Invalid WEBENTRY_* environment")?;
    if let Some(detectors) = &args.detectors {
        config = config.with_detectors(detectors);
    }
    if args.strict_check_files {
        config.strict_check_files = true;
    }
    debug!("{}", config);

    let mut creator = EntryPointCreator::from_config(&config)?;
    if let Some(driver_class) = &args.driver_class {
        creator = creator.with_driver_class(driver_class.clone());
    }

    if !args.webapp.is_dir() {
        bail!("{} is not a directory", args.webapp.display());
    }
    let classes = load_classes(args.classes.as_deref())?;
    let loader = ClasspathLoader::for_webapp(
        Arc::new(RealFileSystem),
        &args.webapp,
        Some(config.max_resource_size),
    );

    let entry = creator.create(Arc::new(loader), &classes);

    let formatter = OutputFormatter::new(args.format.into());
    let rendered = formatter.format_entry_point(&entry)?;
    match &args.output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote entry point to {}", path.display());
        }
        None => print!("{}", rendered),
    }

    if !quiet && formatter.format() == OutputFormat::Text {
        eprint!("{}", OutputFormatter::format_diagnostics(&entry.diagnostics));
    }
    Ok(entry)
}

/// Reads the class index, or an empty one when none was given
pub fn load_classes(path: Option<&Path>) -> Result<ClassIndex> {
    let Some(path) = path else {
        info!("No class index given, handler classes are not checked");
        return Ok(ClassIndex::new());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read class index {}", path.display()))?;
    let classes = ClassIndex::from_json(&json)
        .with_context(|| format!("Invalid class index {}", path.display()))?;
    debug!("Loaded {} classes from {}", classes.len(), path.display());
    Ok(classes)
}
