use serde::{Deserialize, Serialize};

/// Where the container injects a resource: a field or setter of a class
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InjectionTarget {
    pub target_class: String,
    pub target_name: String,
}

/// A resource reference from the deployment descriptor together with its target
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Injection {
    /// JNDI name of the referenced resource, e.g. `jdbc/AppDb`
    pub resource_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    pub target: InjectionTarget,
}
