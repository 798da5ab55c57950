//! webentry - synthetic entry points for servlet-based web applications
//!
//! Whole-program analyzers start from a `main` method, but a web application
//! is driven by its container: listeners, filters and servlets are created and
//! called according to deployment descriptors. This crate recovers those
//! components and writes a driver that replays the container's calls.
//!
//! # Pipeline
//!
//! - [`resource`]: resolves descriptor paths against the deployed application
//! - [`detector`]: detectors for plain servlets and Struts 1, run in two passes
//!   by the [`DetectorChain`](detector::DetectorChain)
//! - [`reader`]: `web.xml` and `struts-config.xml` readers
//! - [`model`]: the application model the detectors fill in
//! - [`synth`]: templates and the driver IR
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use webentry::fs::RealFileSystem;
//! use webentry::model::ClassIndex;
//! use webentry::resource::ClasspathLoader;
//! use webentry::EntryPointCreator;
//!
//! let creator = EntryPointCreator::with_defaults().expect("built-in detectors are consistent");
//! let loader = ClasspathLoader::for_webapp(Arc::new(RealFileSystem), Path::new("build/webapp"), None);
//! let entry = creator.create(Arc::new(loader), &ClassIndex::new());
//! println!("{}", entry.driver.render());
//! ```

pub mod cli;
pub mod config;
pub mod creator;
pub mod detector;
pub mod diagnostics;
pub mod error;
pub mod fs;
pub mod model;
pub mod reader;
pub mod resource;
pub mod servlet_api;
pub mod synth;
pub mod util;

pub use config::{ConfigError, WebentryConfig};
pub use creator::{EntryPoint, EntryPointCreator, SetupError};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{ContractError, DetectError};
pub use util::{init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
