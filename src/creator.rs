//! Detection followed by synthesis, as one call
//!
//! The contract between detectors and templates is checked when the creator
//! is built, before any application is read.

use crate::config::{ConfigError, WebentryConfig};
use crate::detector::{DetectorChain, DetectorRegistry};
use crate::diagnostics::Diagnostics;
use crate::error::ContractError;
use crate::model::{ApplicationBuilder, ClassIndex, WebApplication};
use crate::resource::ResourceLoader;
use crate::synth::{Driver, Synthesizer, TemplateCatalog};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// Result of one run: the detected model, its driver and all diagnostics
#[derive(Debug)]
pub struct EntryPoint {
    pub application: WebApplication,
    pub driver: Driver,
    pub diagnostics: Diagnostics,
}

pub struct EntryPointCreator {
    chain: DetectorChain,
    synthesizer: Synthesizer,
}

impl EntryPointCreator {
    pub fn new(registry: DetectorRegistry, catalog: &TemplateCatalog) -> Result<Self, ContractError> {
        let templates = registry.validate(catalog)?;
        Ok(Self {
            chain: DetectorChain::new(registry),
            synthesizer: Synthesizer::new(templates),
        })
    }

    pub fn with_defaults() -> Result<Self, ContractError> {
        Self::new(DetectorRegistry::with_defaults(), &TemplateCatalog::builtin())
    }

    pub fn from_config(config: &WebentryConfig) -> Result<Self, SetupError> {
        config.validate()?;
        let creator = Self::new(config.registry()?, &TemplateCatalog::builtin())?;
        Ok(creator.with_strict_check_files(config.strict_check_files))
    }

    pub fn with_strict_check_files(mut self, strict: bool) -> Self {
        self.chain = self.chain.with_strict_check_files(strict);
        self
    }

    pub fn with_driver_class(mut self, class_name: impl Into<String>) -> Self {
        self.synthesizer = self.synthesizer.with_driver_class(class_name);
        self
    }

    pub fn detector_names(&self) -> Vec<&'static str> {
        self.chain.registry().names()
    }

    pub fn create(&self, loader: Arc<dyn ResourceLoader>, classes: &ClassIndex) -> EntryPoint {
        let start = Instant::now();
        info!("Creating entry point for {}", loader.describe());

        let detection = self.chain.run(ApplicationBuilder::new(loader), classes);
        let synthesis = self.synthesizer.synthesize(&detection.application, classes);

        let mut diagnostics = detection.diagnostics;
        diagnostics.extend(synthesis.diagnostics);

        info!(
            "Entry point created: {} components, {} units in {:?}",
            detection.application.len(),
            synthesis.driver.len(),
            start.elapsed()
        );
        EntryPoint {
            application: detection.application,
            driver: synthesis.driver,
            diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use crate::resource::FsResourceLoader;

    #[test]
    fn test_unknown_detector_in_config() {
        let config = WebentryConfig::default().with_detectors("servlet,jsf");
        let err = EntryPointCreator::from_config(&config).err().unwrap();
        assert!(matches!(err, SetupError::Config(ConfigError::UnknownDetector(..))));
    }

    #[test]
    fn test_create_with_servlet_only() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "WEB-INF/web.xml",
            r#"<web-app>
                 <servlet>
                   <servlet-name>home</servlet-name>
                   <servlet-class>com.example.Home</servlet-class>
                 </servlet>
               </web-app>"#,
        );
        let loader = Arc::new(FsResourceLoader::new(Arc::new(fs), "/webapp"));
        let config = WebentryConfig::default().with_detectors("servlet");
        let creator = EntryPointCreator::from_config(&config).unwrap();

        let entry = creator.create(loader, &ClassIndex::new());

        assert_eq!(creator.detector_names(), vec!["servlet"]);
        assert_eq!(entry.application.len(), 1);
        assert_eq!(entry.driver.dispatch_units().count(), 1);
        assert!(entry.diagnostics.is_empty());
    }
}
