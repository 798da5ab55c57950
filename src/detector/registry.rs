use super::{Detector, ServletDetector, StrutsDetector};
use crate::error::ContractError;
use crate::synth::{TemplateCatalog, TemplateRegistry};
use std::sync::Arc;
use tracing::debug;

/// The ordered set of active detectors
///
/// Order matters: config passes run in registration order, and later
/// detectors re-classify what earlier ones found.
#[derive(Clone, Default)]
pub struct DetectorRegistry {
    detectors: Vec<Arc<dyn Detector>>,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ServletDetector));
        registry.register(Arc::new(StrutsDetector));
        registry
    }

    /// Appends a detector, replacing one already registered under the same name
    pub fn register(&mut self, detector: Arc<dyn Detector>) {
        match self
            .detectors
            .iter_mut()
            .find(|d| d.name() == detector.name())
        {
            Some(existing) => *existing = detector,
            None => self.detectors.push(detector),
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Detector> {
        self.detectors
            .iter()
            .find(|d| d.name() == name)
            .map(|d| d.as_ref())
    }

    pub fn detectors(&self) -> &[Arc<dyn Detector>] {
        &self.detectors
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Restricts the registry to `names`, keeping registration order
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self, ContractError> {
        for name in names {
            if self.get(name.as_ref()).is_none() {
                return Err(ContractError::UnknownDetector(name.as_ref().to_string()));
            }
        }
        let detectors = self
            .detectors
            .iter()
            .filter(|d| names.iter().any(|n| n.as_ref() == d.name()))
            .cloned()
            .collect();
        Ok(Self { detectors })
    }

    /// Checks the template contract and returns the templates of the active detectors
    ///
    /// Every template a detector names must exist in `catalog` and cover a kind
    /// that detector declares; every declared kind must be covered; no kind may
    /// be covered twice.
    pub fn validate(&self, catalog: &TemplateCatalog) -> Result<TemplateRegistry, ContractError> {
        let mut templates = TemplateRegistry::new();

        for detector in &self.detectors {
            let extensions = detector.model_extensions();

            for id in detector.template_files() {
                let template = catalog.get(id).ok_or_else(|| ContractError::UnknownTemplate {
                    detector: detector.name().to_string(),
                    template: id.to_string(),
                })?;
                let kind = template.kind();
                if !extensions.contains(&kind) {
                    return Err(ContractError::UndeclaredTemplateKind {
                        detector: detector.name().to_string(),
                        template: id.to_string(),
                        kind,
                    });
                }
                templates
                    .insert(template.clone())
                    .map_err(|existing| ContractError::DuplicateTemplate {
                        kind,
                        first: existing.id().to_string(),
                        second: id.to_string(),
                    })?;
                debug!("{} contributes template {} for {}", detector.name(), id, kind);
            }

            for kind in extensions {
                let covered = templates
                    .get(kind)
                    .map(|t| detector.template_files().contains(&t.id()))
                    .unwrap_or(false);
                if !covered {
                    return Err(ContractError::UncoveredExtension {
                        detector: detector.name().to_string(),
                        kind,
                    });
                }
            }
        }

        Ok(templates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::DetectionContext;
    use crate::error::DetectError;
    use crate::model::ComponentKind;

    /// Detector whose declarations are set per test
    struct Declaring {
        name: &'static str,
        extensions: Vec<ComponentKind>,
        templates: Vec<&'static str>,
    }

    impl Detector for Declaring {
        fn name(&self) -> &'static str {
            self.name
        }

        fn detect_from_source(&self, _ctx: &mut DetectionContext<'_>) -> Result<(), DetectError> {
            Ok(())
        }

        fn detect_from_config(&self, _ctx: &mut DetectionContext<'_>) -> Result<(), DetectError> {
            Ok(())
        }

        fn model_extensions(&self) -> Vec<ComponentKind> {
            self.extensions.clone()
        }

        fn template_files(&self) -> Vec<&'static str> {
            self.templates.clone()
        }
    }

    fn registry_with(detector: Declaring) -> DetectorRegistry {
        let mut registry = DetectorRegistry::new();
        registry.register(Arc::new(detector));
        registry
    }

    #[test]
    fn test_defaults_validate() {
        let registry = DetectorRegistry::with_defaults();
        assert_eq!(registry.names(), vec!["servlet", "struts"]);

        let templates = registry.validate(&TemplateCatalog::builtin()).unwrap();
        assert_eq!(templates.len(), 4);
    }

    #[test]
    fn test_select_keeps_registration_order() {
        let registry = DetectorRegistry::with_defaults();

        let selected = registry.select(&["struts", "servlet"]).unwrap();
        assert_eq!(selected.names(), vec!["servlet", "struts"]);

        let only_struts = registry.select(&["struts"]).unwrap();
        assert_eq!(only_struts.len(), 1);

        let err = registry.select(&["spring"]).err().unwrap();
        assert_eq!(err, ContractError::UnknownDetector("spring".to_string()));
    }

    #[test]
    fn test_extension_without_template_is_rejected() {
        let registry = registry_with(Declaring {
            name: "partial",
            extensions: vec![ComponentKind::Servlet, ComponentKind::Filter],
            templates: vec!["servlet::HttpServlet::main"],
        });

        let err = registry.validate(&TemplateCatalog::builtin()).err().unwrap();
        assert_eq!(
            err,
            ContractError::UncoveredExtension {
                detector: "partial".to_string(),
                kind: ComponentKind::Filter,
            }
        );
    }

    #[test]
    fn test_unknown_template_is_rejected() {
        let registry = registry_with(Declaring {
            name: "typo",
            extensions: vec![ComponentKind::Servlet],
            templates: vec!["servlet::Servlet::main"],
        });

        assert!(matches!(
            registry.validate(&TemplateCatalog::builtin()),
            Err(ContractError::UnknownTemplate { .. })
        ));
    }

    #[test]
    fn test_template_for_undeclared_kind_is_rejected() {
        let registry = registry_with(Declaring {
            name: "sneaky",
            extensions: vec![],
            templates: vec!["servlet::Filter::main"],
        });

        assert!(matches!(
            registry.validate(&TemplateCatalog::builtin()),
            Err(ContractError::UndeclaredTemplateKind { kind: ComponentKind::Filter, .. })
        ));
    }

    #[test]
    fn test_kind_claimed_twice_is_rejected() {
        let mut registry = DetectorRegistry::with_defaults();
        registry.register(Arc::new(Declaring {
            name: "another-struts",
            extensions: vec![ComponentKind::ActionServlet],
            templates: vec!["struts::ActionServlet::main"],
        }));

        assert!(matches!(
            registry.validate(&TemplateCatalog::builtin()),
            Err(ContractError::DuplicateTemplate { kind: ComponentKind::ActionServlet, .. })
        ));
    }
}
