//! Well-known servlet API type names
//!
//! Every name exists under both the `javax.servlet` and `jakarta.servlet`
//! packages; helpers here take the simple (package-relative) name.

use crate::model::ClassIndex;

pub const NAMESPACES: [&str; 2] = ["javax.servlet", "jakarta.servlet"];

pub const SERVLET_BASES: &[&str] = &["http.HttpServlet", "GenericServlet"];
pub const SERVLET_INTERFACE: &str = "Servlet";
pub const FILTER_INTERFACE: &str = "Filter";

pub const WEB_SERVLET: &str = "annotation.WebServlet";
pub const WEB_FILTER: &str = "annotation.WebFilter";
pub const WEB_LISTENER: &str = "annotation.WebListener";

/// A listener interface and the callback the synthetic driver invokes on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerCallback {
    pub interface: &'static str,
    pub method: &'static str,
    pub event: &'static str,
}

pub const LISTENER_CALLBACKS: &[ListenerCallback] = &[
    ListenerCallback {
        interface: "ServletContextListener",
        method: "contextInitialized",
        event: "ServletContextEvent",
    },
    ListenerCallback {
        interface: "ServletContextAttributeListener",
        method: "attributeAdded",
        event: "ServletContextAttributeEvent",
    },
    ListenerCallback {
        interface: "ServletRequestListener",
        method: "requestInitialized",
        event: "ServletRequestEvent",
    },
    ListenerCallback {
        interface: "ServletRequestAttributeListener",
        method: "attributeAdded",
        event: "ServletRequestAttributeEvent",
    },
    ListenerCallback {
        interface: "http.HttpSessionListener",
        method: "sessionCreated",
        event: "http.HttpSessionEvent",
    },
    ListenerCallback {
        interface: "http.HttpSessionAttributeListener",
        method: "attributeAdded",
        event: "http.HttpSessionBindingEvent",
    },
];

/// Fully qualified name of `simple` in namespace `ns`
pub fn qualified(ns: &str, simple: &str) -> String {
    format!("{}.{}", ns, simple)
}

/// `simple` in every namespace
pub fn all_namespaces(simple: &str) -> impl Iterator<Item = String> + '_ {
    NAMESPACES.iter().map(move |ns| qualified(ns, simple))
}

/// True for classes that belong to the servlet API itself
pub fn is_api_class(class_name: &str) -> bool {
    NAMESPACES
        .iter()
        .any(|ns| class_name.starts_with(ns) && class_name[ns.len()..].starts_with('.'))
}

/// The namespace the class was compiled against; `javax.servlet` unless its hierarchy says otherwise
pub fn namespace_for(classes: &ClassIndex, class_name: &str) -> &'static str {
    let jakarta = NAMESPACES[1];
    let in_jakarta = |name: &str| name.starts_with(jakarta);
    let uses_jakarta = classes.superclasses(class_name).any(in_jakarta)
        || classes.interfaces_of(class_name).into_iter().any(in_jakarta);
    if uses_jakarta {
        jakarta
    } else {
        NAMESPACES[0]
    }
}
