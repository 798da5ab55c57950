use super::{DetectionContext, DetectorRegistry};
use crate::diagnostics::Diagnostics;
use crate::error::DetectError;
use crate::model::{ApplicationBuilder, ClassIndex, WebApplication};
use std::time::Instant;
use tracing::{debug, info};

/// A frozen application and the diagnostics of detecting it
#[derive(Debug)]
pub struct Detection {
    pub application: WebApplication,
    pub diagnostics: Diagnostics,
}

/// Runs every source pass, then every config pass in registry order
pub struct DetectorChain {
    registry: DetectorRegistry,
    strict_check_files: bool,
}

impl DetectorChain {
    pub fn new(registry: DetectorRegistry) -> Self {
        Self {
            registry,
            strict_check_files: false,
        }
    }

    /// Lets missing check files disable the source pass as well as the config pass
    pub fn with_strict_check_files(mut self, strict: bool) -> Self {
        self.strict_check_files = strict;
        self
    }

    pub fn registry(&self) -> &DetectorRegistry {
        &self.registry
    }

    pub fn run(&self, app: ApplicationBuilder, classes: &ClassIndex) -> Detection {
        let mut app = app;
        let mut diagnostics = Diagnostics::new();
        self.run_in_place(&mut app, classes, &mut diagnostics);
        Detection {
            application: app.build(),
            diagnostics,
        }
    }

    /// Both passes over an application that may already hold components
    pub fn run_in_place(
        &self,
        app: &mut ApplicationBuilder,
        classes: &ClassIndex,
        diagnostics: &mut Diagnostics,
    ) {
        let start = Instant::now();
        info!(
            "Running {} detector(s) over {} classes",
            self.registry.len(),
            classes.len()
        );

        let enabled: Vec<bool> = self
            .registry
            .detectors()
            .iter()
            .map(|d| {
                let check_files = d.check_files();
                let present =
                    check_files.is_empty() || check_files.iter().any(|f| app.loader().exists(f));
                if !present {
                    diagnostics.info(
                        format!(
                            "Detector '{}' skipped: none of {} found",
                            d.name(),
                            check_files.join(", ")
                        ),
                        None,
                    );
                }
                present
            })
            .collect();

        info!("Phase: source");
        let phase_start = Instant::now();
        for (detector, enabled) in self.registry.detectors().iter().zip(enabled.iter().copied()) {
            if !enabled && self.strict_check_files {
                continue;
            }
            let mut ctx = DetectionContext::new(app, classes, diagnostics);
            let result = detector.detect_from_source(&mut ctx);
            Self::record(detector.name(), "source", result, diagnostics);
        }
        debug!("Source phase complete in {:?}", phase_start.elapsed());

        info!("Phase: config");
        let phase_start = Instant::now();
        for (detector, enabled) in self.registry.detectors().iter().zip(enabled.iter().copied()) {
            if !enabled {
                continue;
            }
            let mut ctx = DetectionContext::new(app, classes, diagnostics);
            let result = detector.detect_from_config(&mut ctx);
            Self::record(detector.name(), "config", result, diagnostics);
        }
        debug!("Config phase complete in {:?}", phase_start.elapsed());

        info!(
            "Detection complete: {} components, {} diagnostics in {:?}",
            app.len(),
            diagnostics.len(),
            start.elapsed()
        );
    }

    fn record(
        detector: &str,
        pass: &str,
        result: Result<(), DetectError>,
        diagnostics: &mut Diagnostics,
    ) {
        match result {
            Ok(()) => debug!("Detector '{}' {} pass done", detector, pass),
            Err(e) => diagnostics.report(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::Detector;
    use crate::diagnostics::Severity;
    use crate::fs::MockFileSystem;
    use crate::model::{ClassInfo, ComponentKind};
    use crate::resource::FsResourceLoader;
    use std::sync::Arc;

    const WEB_XML: &str = r#"<web-app>
  <servlet>
    <servlet-name>action</servlet-name>
    <servlet-class>org.apache.struts.action.ActionServlet</servlet-class>
    <init-param>
      <param-name>config</param-name>
      <param-value>/WEB-INF/struts-config.xml</param-value>
    </init-param>
    <load-on-startup>1</load-on-startup>
  </servlet>
  <servlet-mapping>
    <servlet-name>action</servlet-name>
    <url-pattern>*.do</url-pattern>
  </servlet-mapping>
</web-app>"#;

    const STRUTS_CONFIG: &str = r#"<struts-config>
  <action-mappings>
    <action path="/login" type="com.example.LoginAction"/>
  </action-mappings>
</struts-config>"#;

    fn builder(files: &[(&str, &str)]) -> ApplicationBuilder {
        let fs = MockFileSystem::new();
        for (path, content) in files {
            fs.add_file(path, *content);
        }
        ApplicationBuilder::new(Arc::new(FsResourceLoader::new(Arc::new(fs), "/webapp")))
    }

    #[test]
    fn test_config_pass_runs_in_registry_order() {
        let app = builder(&[
            ("WEB-INF/web.xml", WEB_XML),
            ("WEB-INF/struts-config.xml", STRUTS_CONFIG),
        ]);
        let chain = DetectorChain::new(DetectorRegistry::with_defaults());

        let detection = chain.run(app, &ClassIndex::new());

        let controller = detection
            .application
            .component("org.apache.struts.action.ActionServlet")
            .unwrap();
        assert_eq!(controller.kind(), ComponentKind::ActionServlet);
        assert_eq!(controller.load_on_startup(), Some(1));
        assert_eq!(controller.action_mappings().len(), 1);
        assert_eq!(detection.diagnostics.count(Severity::Error), 0);
        assert_eq!(detection.diagnostics.count(Severity::Info), 1);
    }

    #[test]
    fn test_missing_check_file_skips_config_pass() {
        let app = builder(&[]);
        let classes: ClassIndex = [ClassInfo::new("com.example.Home")
            .extends("javax.servlet.http.HttpServlet")]
        .into_iter()
        .collect();
        let chain = DetectorChain::new(DetectorRegistry::with_defaults());

        let detection = chain.run(app, &classes);

        assert!(detection.application.component("com.example.Home").is_some());
        assert!(!detection.diagnostics.has_errors());
        assert!(detection
            .diagnostics
            .iter()
            .any(|d| d.message.contains("Detector 'servlet' skipped")));
    }

    #[test]
    fn test_strict_check_files_skips_source_pass_too() {
        let app = builder(&[]);
        let classes: ClassIndex = [ClassInfo::new("com.example.Home")
            .extends("javax.servlet.http.HttpServlet")]
        .into_iter()
        .collect();
        let chain = DetectorChain::new(DetectorRegistry::with_defaults().select(&["servlet"]).unwrap())
            .with_strict_check_files(true);

        let detection = chain.run(app, &classes);

        assert!(detection.application.is_empty());
    }

    #[test]
    fn test_running_twice_yields_the_same_model() {
        let files = [
            ("WEB-INF/web.xml", WEB_XML),
            ("WEB-INF/struts-config.xml", STRUTS_CONFIG),
        ];
        let classes = ClassIndex::new();
        let chain = DetectorChain::new(DetectorRegistry::with_defaults());

        let mut app = builder(&files);
        let mut diagnostics = Diagnostics::new();
        chain.run_in_place(&mut app, &classes, &mut diagnostics);
        let once: Vec<_> = app.components().cloned().collect();
        chain.run_in_place(&mut app, &classes, &mut diagnostics);

        let twice: Vec<_> = app.components().cloned().collect();
        assert_eq!(once.len(), twice.len());
        for (a, b) in once.iter().zip(&twice) {
            assert!(a.same_attributes(b), "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn test_detector_error_becomes_diagnostic() {
        struct Broken;

        impl Detector for Broken {
            fn name(&self) -> &'static str {
                "broken"
            }

            fn detect_from_source(&self, _ctx: &mut DetectionContext<'_>) -> Result<(), DetectError> {
                Ok(())
            }

            fn detect_from_config(&self, _ctx: &mut DetectionContext<'_>) -> Result<(), DetectError> {
                Err(DetectError::parse("broken.xml", "unexpected end of input"))
            }

            fn model_extensions(&self) -> Vec<ComponentKind> {
                vec![]
            }

            fn template_files(&self) -> Vec<&'static str> {
                vec![]
            }
        }

        let mut registry = DetectorRegistry::new();
        registry.register(Arc::new(Broken));
        let detection = DetectorChain::new(registry).run(builder(&[]), &ClassIndex::new());

        assert_eq!(detection.diagnostics.count(Severity::Error), 1);
    }
}
