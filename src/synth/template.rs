//! Code-generation templates and their catalogs
//!
//! A [`TemplateCatalog`] holds every template the binary knows, by identifier.
//! A [`TemplateRegistry`] is the validated subset the active detectors
//! contribute, keyed by the component kind each template covers.

use super::driver::DriverUnit;
use super::servlet::{FilterTemplate, ListenerTemplate, ServletTemplate};
use super::struts::ActionServletTemplate;
use crate::diagnostics::Diagnostics;
use crate::model::{ClassIndex, Component, ComponentKind, WebApplication};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Read-only inputs and the diagnostic sink for one instantiation
pub struct TemplateContext<'a> {
    pub app: &'a WebApplication,
    pub classes: &'a ClassIndex,
    pub diagnostics: &'a mut Diagnostics,
}

pub trait Template: Send + Sync {
    fn id(&self) -> &'static str;

    /// The component kind this template generates code for
    fn kind(&self) -> ComponentKind;

    /// Emits the units replaying `component`; failures of a part are reported and skipped
    fn instantiate(&self, component: &Component, ctx: &mut TemplateContext<'_>) -> Vec<DriverUnit>;
}

#[derive(Default)]
pub struct TemplateCatalog {
    templates: BTreeMap<&'static str, Arc<dyn Template>>,
}

impl TemplateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.register(Arc::new(ServletTemplate));
        catalog.register(Arc::new(FilterTemplate));
        catalog.register(Arc::new(ListenerTemplate));
        catalog.register(Arc::new(ActionServletTemplate));
        catalog
    }

    pub fn register(&mut self, template: Arc<dyn Template>) {
        self.templates.insert(template.id(), template);
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Template>> {
        self.templates.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.templates.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// At most one template per component kind
#[derive(Default, Clone)]
pub struct TemplateRegistry {
    by_kind: HashMap<ComponentKind, Arc<dyn Template>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `template`, returning the one already registered for its kind instead if any
    pub fn insert(&mut self, template: Arc<dyn Template>) -> Result<(), Arc<dyn Template>> {
        match self.by_kind.get(&template.kind()) {
            Some(existing) => Err(existing.clone()),
            None => {
                self.by_kind.insert(template.kind(), template);
                Ok(())
            }
        }
    }

    pub fn get(&self, kind: ComponentKind) -> Option<&Arc<dyn Template>> {
        self.by_kind.get(&kind)
    }

    pub fn covers(&self, kind: ComponentKind) -> bool {
        self.by_kind.contains_key(&kind)
    }

    /// Covered kinds in declaration order
    pub fn kinds(&self) -> Vec<ComponentKind> {
        ComponentKind::all_variants()
            .iter()
            .copied()
            .filter(|k| self.covers(*k))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_kind.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_covers_every_kind() {
        let catalog = TemplateCatalog::builtin();
        assert_eq!(catalog.len(), 4);

        let mut registry = TemplateRegistry::new();
        for id in catalog.ids().collect::<Vec<_>>() {
            assert!(registry.insert(catalog.get(id).unwrap().clone()).is_ok());
        }
        assert_eq!(registry.kinds(), ComponentKind::all_variants().to_vec());
    }

    #[test]
    fn test_registry_rejects_second_template_for_a_kind() {
        let mut registry = TemplateRegistry::new();
        assert!(registry.insert(Arc::new(ServletTemplate)).is_ok());

        let existing = registry.insert(Arc::new(ServletTemplate)).unwrap_err();
        assert_eq!(existing.id(), ServletTemplate.id());
        assert_eq!(registry.len(), 1);
    }
}
