//! Reader for the standard `WEB-INF/web.xml` deployment descriptor
//!
//! Handles descriptors from Servlet 2.2 (DOCTYPE, no namespace) through the
//! namespaced `javaee`/`jakartaee` schemas, and `web-fragment.xml`.

use super::{
    child_text, child_texts, children, decode, expect_root, parse_document, position, register,
    ReadSummary,
};
use crate::diagnostics::Diagnostics;
use crate::error::DetectError;
use crate::model::{
    ApplicationBuilder, Component, ComponentKind, Injection, InjectionTarget, Parameter,
};
use roxmltree::{Document, Node};
use std::collections::HashMap;
use tracing::{debug, info};

/// Reference elements that may carry `<injection-target>`s, with their name and type children
const INJECTABLE_REFS: &[(&str, &str, &str)] = &[
    ("env-entry", "env-entry-name", "env-entry-type"),
    ("ejb-ref", "ejb-ref-name", "remote"),
    ("ejb-local-ref", "ejb-ref-name", "local"),
    ("service-ref", "service-ref-name", "service-interface"),
    ("resource-ref", "res-ref-name", "res-type"),
    ("resource-env-ref", "resource-env-ref-name", "resource-env-ref-type"),
    ("message-destination-ref", "message-destination-ref-name", "message-destination-type"),
    ("persistence-context-ref", "persistence-context-ref-name", "persistence-unit-name"),
    ("persistence-unit-ref", "persistence-unit-ref-name", "persistence-unit-name"),
];

pub struct WebXmlReader<'a> {
    app: &'a mut ApplicationBuilder,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> WebXmlReader<'a> {
    pub fn new(app: &'a mut ApplicationBuilder, diagnostics: &'a mut Diagnostics) -> Self {
        Self { app, diagnostics }
    }

    /// Loads `path` through the application's loader and reads it
    pub fn read(&mut self, path: &str) -> Result<ReadSummary, DetectError> {
        let bytes = self.app.loader().read_all(path)?;
        self.read_bytes(path, &bytes)
    }

    pub fn read_bytes(&mut self, resource: &str, bytes: &[u8]) -> Result<ReadSummary, DetectError> {
        let text = decode(resource, bytes)?;
        let document = parse_document(resource, &text)?;
        let root = expect_root(resource, &document, &["web-app", "web-fragment"])?;

        info!("Reading deployment descriptor {}", resource);
        let mut summary = ReadSummary::default();

        if let Some(name) = child_text(root, "display-name") {
            self.app.set_display_name(name);
        }
        for param in children(root, "context-param") {
            if let Some(parameter) = self.param(resource, &document, param, &mut summary) {
                self.app.add_context_param(parameter.name, parameter.value);
            }
        }

        let mut servlets: HashMap<String, String> = HashMap::new();
        for servlet in children(root, "servlet") {
            if let Some((name, class)) = self.servlet(resource, &document, servlet, &mut summary) {
                servlets.insert(name, class);
            }
        }

        let mut filters: HashMap<String, String> = HashMap::new();
        for filter in children(root, "filter") {
            if let Some((name, class)) = self.filter(resource, &document, filter, &mut summary) {
                filters.insert(name, class);
            }
        }

        for mapping in children(root, "servlet-mapping") {
            self.servlet_mapping(resource, &document, mapping, &servlets, &mut summary);
        }
        for mapping in children(root, "filter-mapping") {
            self.filter_mapping(resource, &document, mapping, &filters, &mut summary);
        }

        for listener in children(root, "listener") {
            match child_text(listener, "listener-class") {
                Some(class) => {
                    let loader = self.app.loader().clone();
                    register(
                        self.app,
                        self.diagnostics,
                        Component::new(class, ComponentKind::Listener, loader),
                    );
                    summary.entries += 1;
                }
                None => self.skip(
                    resource,
                    &document,
                    listener,
                    "<listener> without <listener-class>",
                    &mut summary,
                ),
            }
        }

        for (element, name_tag, type_tag) in INJECTABLE_REFS {
            for reference in children(root, element) {
                self.injections(reference, name_tag, type_tag);
            }
        }

        debug!(
            "{}: {} entries, {} skipped",
            resource, summary.entries, summary.skipped
        );
        Ok(summary)
    }

    fn servlet(
        &mut self,
        resource: &str,
        document: &Document<'_>,
        node: Node<'_, '_>,
        summary: &mut ReadSummary,
    ) -> Option<(String, String)> {
        let Some(name) = child_text(node, "servlet-name") else {
            self.skip(resource, document, node, "<servlet> without <servlet-name>", summary);
            return None;
        };
        let Some(class) = child_text(node, "servlet-class") else {
            if child_text(node, "jsp-file").is_some() {
                self.diagnostics.info(
                    format!("Servlet '{}' is a JSP page and has no class to dispatch to", name),
                    Some(resource),
                );
            } else {
                self.skip(
                    resource,
                    document,
                    node,
                    &format!("servlet '{}' without <servlet-class>", name),
                    summary,
                );
            }
            return None;
        };

        let loader = self.app.loader().clone();
        let mut component =
            Component::new(class.clone(), ComponentKind::Servlet, loader).with_name(name.clone());
        for param in children(node, "init-param") {
            if let Some(parameter) = self.param(resource, document, param, summary) {
                component.add_parameter(parameter);
            }
        }
        if let Some(order) = child_text(node, "load-on-startup") {
            match order.parse::<i32>() {
                Ok(order) => component = component.with_load_on_startup(order),
                Err(_) => self.diagnostics.warn(
                    format!("Ignoring load-on-startup '{}' of servlet '{}'", order, name),
                    Some(resource),
                ),
            }
        }

        register(self.app, self.diagnostics, component);
        summary.entries += 1;
        Some((name, class))
    }

    fn filter(
        &mut self,
        resource: &str,
        document: &Document<'_>,
        node: Node<'_, '_>,
        summary: &mut ReadSummary,
    ) -> Option<(String, String)> {
        let (Some(name), Some(class)) = (
            child_text(node, "filter-name"),
            child_text(node, "filter-class"),
        ) else {
            self.skip(
                resource,
                document,
                node,
                "<filter> without <filter-name> or <filter-class>",
                summary,
            );
            return None;
        };

        let loader = self.app.loader().clone();
        let mut component =
            Component::new(class.clone(), ComponentKind::Filter, loader).with_name(name.clone());
        for param in children(node, "init-param") {
            if let Some(parameter) = self.param(resource, document, param, summary) {
                component.add_parameter(parameter);
            }
        }

        register(self.app, self.diagnostics, component);
        summary.entries += 1;
        Some((name, class))
    }

    fn servlet_mapping(
        &mut self,
        resource: &str,
        document: &Document<'_>,
        node: Node<'_, '_>,
        servlets: &HashMap<String, String>,
        summary: &mut ReadSummary,
    ) {
        let Some(name) = child_text(node, "servlet-name") else {
            self.skip(resource, document, node, "<servlet-mapping> without <servlet-name>", summary);
            return;
        };
        let patterns = child_texts(node, "url-pattern");

        let target = match servlets.get(&name) {
            Some(class) => self.app.component_mut(class),
            None => self.app.component_named_mut(&name),
        };
        match target {
            Some(component) => {
                for pattern in patterns {
                    component.add_url_pattern(pattern);
                }
                summary.entries += 1;
            }
            None => self.skip(
                resource,
                document,
                node,
                &format!("mapping for unknown servlet '{}'", name),
                summary,
            ),
        }
    }

    fn filter_mapping(
        &mut self,
        resource: &str,
        document: &Document<'_>,
        node: Node<'_, '_>,
        filters: &HashMap<String, String>,
        summary: &mut ReadSummary,
    ) {
        let Some(name) = child_text(node, "filter-name") else {
            self.skip(resource, document, node, "<filter-mapping> without <filter-name>", summary);
            return;
        };
        let patterns = child_texts(node, "url-pattern");
        let servlet_names = child_texts(node, "servlet-name");

        let target = match filters.get(&name) {
            Some(class) => self.app.component_mut(class),
            None => self.app.component_named_mut(&name),
        };
        match target {
            Some(component) => {
                for pattern in patterns {
                    component.add_url_pattern(pattern);
                }
                for servlet_name in servlet_names {
                    component.add_servlet_name(servlet_name);
                }
                summary.entries += 1;
            }
            None => self.skip(
                resource,
                document,
                node,
                &format!("mapping for unknown filter '{}'", name),
                summary,
            ),
        }
    }

    fn param(
        &mut self,
        resource: &str,
        document: &Document<'_>,
        node: Node<'_, '_>,
        summary: &mut ReadSummary,
    ) -> Option<Parameter> {
        match child_text(node, "param-name") {
            // An empty value is legitimate, e.g. a blank prefix
            Some(name) => Some(Parameter::new(
                name,
                child_text(node, "param-value").unwrap_or_default(),
            )),
            None => {
                self.skip(resource, document, node, "parameter without <param-name>", summary);
                None
            }
        }
    }

    fn injections(&mut self, node: Node<'_, '_>, name_tag: &str, type_tag: &str) {
        let Some(resource_name) = child_text(node, name_tag) else {
            return;
        };
        let resource_type = child_text(node, type_tag);

        for target in children(node, "injection-target") {
            if let (Some(target_class), Some(target_name)) = (
                child_text(target, "injection-target-class"),
                child_text(target, "injection-target-name"),
            ) {
                self.app.add_injection(Injection {
                    resource_name: resource_name.clone(),
                    resource_type: resource_type.clone(),
                    target: InjectionTarget {
                        target_class,
                        target_name,
                    },
                });
            }
        }
    }

    fn skip(
        &mut self,
        resource: &str,
        document: &Document<'_>,
        node: Node<'_, '_>,
        reason: &str,
        summary: &mut ReadSummary,
    ) {
        summary.skipped += 1;
        self.diagnostics.warn(
            format!("Skipping {} at {}", reason, position(document, node)),
            Some(resource),
        );
    }
}
