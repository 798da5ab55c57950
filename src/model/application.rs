//! The application aggregate
//!
//! [`ApplicationBuilder`] is the only mutable form and is owned by the detector
//! chain. [`ApplicationBuilder::build`] consumes it and yields a
//! [`WebApplication`], which has no mutating API and is what the synthesizer takes.

use super::component::{Component, MergeOutcome};
use super::injection::Injection;
use super::kind::ComponentKind;
use crate::resource::ResourceLoader;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub struct ApplicationBuilder {
    loader: Arc<dyn ResourceLoader>,
    display_name: Option<String>,
    components: BTreeMap<String, Component>,
    context_params: BTreeMap<String, String>,
    injections: BTreeSet<Injection>,
}

impl ApplicationBuilder {
    pub fn new(loader: Arc<dyn ResourceLoader>) -> Self {
        Self {
            loader,
            display_name: None,
            components: BTreeMap::new(),
            context_params: BTreeMap::new(),
            injections: BTreeSet::new(),
        }
    }

    /// The application's root loader, handed to every component found in it
    pub fn loader(&self) -> &Arc<dyn ResourceLoader> {
        &self.loader
    }

    /// Adds a component or folds it into the one with the same class name
    pub fn register(&mut self, component: Component) -> MergeOutcome {
        match self.components.get_mut(component.class_name()) {
            Some(existing) => {
                let outcome = existing.merge(component);
                debug!("Merged {} -> {:?}", existing, outcome);
                outcome
            }
            None => {
                debug!("Registered {}", component);
                self.components
                    .insert(component.class_name().to_string(), component);
                MergeOutcome::Inserted
            }
        }
    }

    pub fn component(&self, class_name: &str) -> Option<&Component> {
        self.components.get(class_name)
    }

    pub fn component_mut(&mut self, class_name: &str) -> Option<&mut Component> {
        self.components.get_mut(class_name)
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.components.contains_key(class_name)
    }

    /// Finds a component by one of its declared (servlet or filter) names
    pub fn component_named(&self, name: &str) -> Option<&Component> {
        self.components.values().find(|c| c.has_name(name))
    }

    pub fn component_named_mut(&mut self, name: &str) -> Option<&mut Component> {
        self.components.values_mut().find(|c| c.has_name(name))
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    /// Snapshot of class names, for detectors that register while scanning
    pub fn class_names(&self) -> Vec<String> {
        self.components.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn set_display_name(&mut self, name: impl Into<String>) {
        if self.display_name.is_none() {
            self.display_name = Some(name.into());
        }
    }

    pub fn add_context_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.context_params
            .entry(name.into())
            .or_insert_with(|| value.into());
    }

    pub fn add_injection(&mut self, injection: Injection) {
        self.injections.insert(injection);
    }

    pub fn build(self) -> WebApplication {
        WebApplication {
            loader: self.loader,
            display_name: self.display_name,
            components: self.components,
            context_params: self.context_params,
            injections: self.injections,
        }
    }
}

/// A fully detected application, read-only
pub struct WebApplication {
    loader: Arc<dyn ResourceLoader>,
    display_name: Option<String>,
    components: BTreeMap<String, Component>,
    context_params: BTreeMap<String, String>,
    injections: BTreeSet<Injection>,
}

impl WebApplication {
    pub fn loader(&self) -> &Arc<dyn ResourceLoader> {
        &self.loader
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Components ordered by class name
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    pub fn component(&self, class_name: &str) -> Option<&Component> {
        self.components.get(class_name)
    }

    pub fn components_of_kind(&self, kind: ComponentKind) -> impl Iterator<Item = &Component> {
        self.components.values().filter(move |c| c.kind() == kind)
    }

    pub fn context_params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.context_params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn injections(&self) -> impl Iterator<Item = &Injection> {
        self.injections.iter()
    }

    /// Injections whose target field lives in `class_name`
    pub fn injections_for<'a>(&'a self, class_name: &'a str) -> impl Iterator<Item = &'a Injection> {
        self.injections
            .iter()
            .filter(move |i| i.target.target_class == class_name)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl fmt::Debug for WebApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebApplication")
            .field("display_name", &self.display_name)
            .field("components", &self.components)
            .field("context_params", &self.context_params)
            .field("injections", &self.injections)
            .finish()
    }
}
