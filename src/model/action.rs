use serde::{Deserialize, Serialize};

/// A named navigation target of an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forward {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub redirect: bool,
}

/// One `<action>` of a Struts configuration
///
/// The `path` identifies the mapping within its controller; reading the same
/// path twice replaces the earlier entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMapping {
    pub path: String,
    pub handler_class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_name: Option<String>,
    /// Class of the form bean named by `form_name`, when the configuration declares it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default)]
    pub forwards: Vec<Forward>,
}

impl ActionMapping {
    pub fn new(path: impl Into<String>, handler_class: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            handler_class: handler_class.into(),
            form_name: None,
            form_class: None,
            scope: None,
            forwards: Vec::new(),
        }
    }

    pub fn with_forward(mut self, forward: Forward) -> Self {
        self.add_forward(forward);
        self
    }

    /// Adds a forward unless one with the same name is already present
    pub fn add_forward(&mut self, forward: Forward) -> bool {
        if self.forwards.iter().any(|f| f.name == forward.name) {
            return false;
        }
        self.forwards.push(forward);
        true
    }

    pub fn forward(&self, name: &str) -> Option<&Forward> {
        self.forwards.iter().find(|f| f.name == name)
    }
}
