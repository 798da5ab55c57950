use super::action::ActionMapping;
use super::kind::ComponentKind;
use crate::resource::ResourceLoader;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// An init parameter of a servlet or filter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Result of merging a newly detected component into the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    /// Same or less specific kind; attributes were merged
    Enriched,
    Upgraded {
        from: ComponentKind,
        to: ComponentKind,
    },
    /// Unrelated kind claimed for an existing class; the stored kind is kept
    Conflict {
        kept: ComponentKind,
        rejected: ComponentKind,
    },
}

/// A container-managed class and everything the container knows about it
#[derive(Clone)]
pub struct Component {
    class_name: String,
    kind: ComponentKind,
    names: BTreeSet<String>,
    parameters: BTreeMap<String, String>,
    url_patterns: BTreeSet<String>,
    servlet_names: BTreeSet<String>,
    load_on_startup: Option<i32>,
    action_mappings: Vec<ActionMapping>,
    loader: Arc<dyn ResourceLoader>,
}

impl Component {
    pub fn new(
        class_name: impl Into<String>,
        kind: ComponentKind,
        loader: Arc<dyn ResourceLoader>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            kind,
            names: BTreeSet::new(),
            parameters: BTreeMap::new(),
            url_patterns: BTreeSet::new(),
            servlet_names: BTreeSet::new(),
            load_on_startup: None,
            action_mappings: Vec::new(),
            loader,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_parameter(Parameter::new(name, value));
        self
    }

    pub fn with_url_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.url_patterns.insert(pattern.into());
        self
    }

    /// Filters only: servlet names the filter is mapped to
    pub fn with_servlet_name(mut self, servlet_name: impl Into<String>) -> Self {
        self.servlet_names.insert(servlet_name.into());
        self
    }

    pub fn with_load_on_startup(mut self, order: i32) -> Self {
        self.load_on_startup = Some(order);
        self
    }

    pub fn with_action_mapping(mut self, mapping: ActionMapping) -> Self {
        self.put_action_mapping(mapping);
        self
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn parameters(&self) -> impl Iterator<Item = Parameter> + '_ {
        self.parameters
            .iter()
            .map(|(name, value)| Parameter::new(name.as_str(), value.as_str()))
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    pub fn url_patterns(&self) -> impl Iterator<Item = &str> {
        self.url_patterns.iter().map(String::as_str)
    }

    pub fn servlet_names(&self) -> impl Iterator<Item = &str> {
        self.servlet_names.iter().map(String::as_str)
    }

    pub fn load_on_startup(&self) -> Option<i32> {
        self.load_on_startup
    }

    /// Empty for every kind except [`ComponentKind::ActionServlet`]
    pub fn action_mappings(&self) -> &[ActionMapping] {
        &self.action_mappings
    }

    pub fn loader(&self) -> &Arc<dyn ResourceLoader> {
        &self.loader
    }

    pub fn add_name(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn add_url_pattern(&mut self, pattern: impl Into<String>) {
        self.url_patterns.insert(pattern.into());
    }

    pub fn add_servlet_name(&mut self, servlet_name: impl Into<String>) {
        self.servlet_names.insert(servlet_name.into());
    }

    /// Adds a parameter; an already present name keeps its first value
    pub fn add_parameter(&mut self, parameter: Parameter) -> bool {
        match self.parameters.get(&parameter.name) {
            Some(existing) => {
                if *existing != parameter.value {
                    debug!(
                        "{}: keeping parameter {}={} over {}",
                        self.class_name, parameter.name, existing, parameter.value
                    );
                }
                false
            }
            None => {
                self.parameters.insert(parameter.name, parameter.value);
                true
            }
        }
    }

    /// Inserts a mapping, replacing an earlier one with the same path in place
    pub fn put_action_mapping(&mut self, mapping: ActionMapping) {
        match self
            .action_mappings
            .iter_mut()
            .find(|existing| existing.path == mapping.path)
        {
            Some(existing) => *existing = mapping,
            None => self.action_mappings.push(mapping),
        }
    }

    /// Folds a re-detection of the same class into this component
    ///
    /// Attributes are only ever added. The kind changes only when `other` is a
    /// refinement of the stored kind.
    pub fn merge(&mut self, other: Component) -> MergeOutcome {
        debug_assert_eq!(self.class_name, other.class_name);

        let outcome = if other.kind == self.kind || self.kind.refines(other.kind) {
            MergeOutcome::Enriched
        } else if other.kind.refines(self.kind) {
            let from = self.kind;
            self.kind = other.kind;
            MergeOutcome::Upgraded { from, to: other.kind }
        } else {
            MergeOutcome::Conflict {
                kept: self.kind,
                rejected: other.kind,
            }
        };

        self.names.extend(other.names);
        self.url_patterns.extend(other.url_patterns);
        self.servlet_names.extend(other.servlet_names);
        for (name, value) in other.parameters {
            self.add_parameter(Parameter { name, value });
        }
        if self.load_on_startup.is_none() {
            self.load_on_startup = other.load_on_startup;
        }
        for mapping in other.action_mappings {
            self.put_action_mapping(mapping);
        }

        outcome
    }

    /// Attribute equality, ignoring the loader
    pub fn same_attributes(&self, other: &Component) -> bool {
        self.class_name == other.class_name
            && self.kind == other.kind
            && self.names == other.names
            && self.parameters == other.parameters
            && self.url_patterns == other.url_patterns
            && self.servlet_names == other.servlet_names
            && self.load_on_startup == other.load_on_startup
            && self.action_mappings == other.action_mappings
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("class_name", &self.class_name)
            .field("kind", &self.kind)
            .field("names", &self.names)
            .field("parameters", &self.parameters)
            .field("url_patterns", &self.url_patterns)
            .field("servlet_names", &self.servlet_names)
            .field("load_on_startup", &self.load_on_startup)
            .field("action_mappings", &self.action_mappings)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.class_name, self.kind)
    }
}
