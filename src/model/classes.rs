//! Signature view of the application's compiled classes
//!
//! Reading class files is the host's job; it hands over names, super classes,
//! interfaces and annotations, usually as JSON.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_class: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_abstract: bool,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_class: None,
            interfaces: Vec::new(),
            annotations: Vec::new(),
            is_abstract: false,
        }
    }

    pub fn extends(mut self, super_class: impl Into<String>) -> Self {
        self.super_class = Some(super_class.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn annotated(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    /// Marks the class abstract or an interface; containers never instantiate it
    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClassIndex {
    classes: BTreeMap<String, ClassInfo>,
}

fn binary_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(\.[A-Za-z_$][A-Za-z0-9_$]*)*$")
            .expect("class name pattern is valid")
    })
}

/// True for syntactically valid binary class names like `com.example.Foo$Bar`
pub fn is_class_name(name: &str) -> bool {
    binary_name_pattern().is_match(name)
}

impl ClassIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let classes: Vec<ClassInfo> = serde_json::from_str(json)?;
        Ok(classes.into_iter().collect())
    }

    pub fn insert(&mut self, class: ClassInfo) {
        self.classes.insert(class.name.clone(), class);
    }

    pub fn get(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.values()
    }

    /// Whether `name` can be loaded by the analyzer
    ///
    /// An empty index means no signatures were supplied; any well-formed name is
    /// then accepted.
    pub fn resolves(&self, name: &str) -> bool {
        is_class_name(name) && (self.classes.is_empty() || self.contains(name))
    }

    /// Super classes of `name`, nearest first; stops at the first class not in the index
    pub fn superclasses<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        let mut seen = BTreeSet::new();
        let mut next = self.get(name).and_then(|c| c.super_class.as_deref());
        std::iter::from_fn(move || {
            let current = next?;
            if !seen.insert(current) {
                return None;
            }
            next = self.get(current).and_then(|c| c.super_class.as_deref());
            Some(current)
        })
    }

    pub fn is_subclass_of(&self, name: &str, base: &str) -> bool {
        self.superclasses(name).any(|s| s == base)
    }

    /// All interfaces implemented by `name`, including inherited and super-interfaces
    pub fn interfaces_of(&self, name: &str) -> BTreeSet<&str> {
        let mut result = BTreeSet::new();
        let mut pending: Vec<&str> = Vec::new();

        let hierarchy = std::iter::once(name).chain(self.superclasses(name));
        for class in hierarchy {
            if let Some(info) = self.get(class) {
                pending.extend(info.interfaces.iter().map(String::as_str));
            }
        }

        while let Some(interface) = pending.pop() {
            if result.insert(interface) {
                if let Some(info) = self.get(interface) {
                    pending.extend(info.interfaces.iter().map(String::as_str));
                }
            }
        }
        result
    }

    pub fn implements(&self, name: &str, interface: &str) -> bool {
        self.interfaces_of(name).contains(interface)
    }

    pub fn has_annotation(&self, name: &str, annotation: &str) -> bool {
        self.get(name)
            .map(|c| c.annotations.iter().any(|a| a == annotation))
            .unwrap_or(false)
    }
}

impl FromIterator<ClassInfo> for ClassIndex {
    fn from_iter<I: IntoIterator<Item = ClassInfo>>(iter: I) -> Self {
        let mut index = ClassIndex::new();
        for class in iter {
            index.insert(class);
        }
        index
    }
}
