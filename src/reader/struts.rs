//! Reader for Struts 1 `struts-config.xml` files
//!
//! Action mappings are attached to the existing component whose class owns the
//! configuration, i.e. the `ActionServlet` that named the file in its `config`
//! parameter. That component is upgraded to [`ComponentKind::ActionServlet`].

use super::{
    attribute, children, decode, expect_root, parse_document, position, register, ReadSummary,
};
use crate::diagnostics::Diagnostics;
use crate::error::DetectError;
use crate::model::{
    is_class_name, ActionMapping, ApplicationBuilder, Component, ComponentKind, Forward,
};
use roxmltree::{Document, Node};
use std::collections::HashMap;
use tracing::{debug, info};

pub struct StrutsReader<'a> {
    app: &'a mut ApplicationBuilder,
    diagnostics: &'a mut Diagnostics,
    owner_class: String,
    module_prefix: String,
}

impl<'a> StrutsReader<'a> {
    pub fn new(
        app: &'a mut ApplicationBuilder,
        diagnostics: &'a mut Diagnostics,
        owner_class: impl Into<String>,
    ) -> Self {
        Self {
            app,
            diagnostics,
            owner_class: owner_class.into(),
            module_prefix: String::new(),
        }
    }

    /// Prefix for action paths of a non-default module, e.g. `/admin` for `config/admin`
    pub fn with_module_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.module_prefix = prefix.into();
        self
    }

    /// Loads `path` through the owning component's loader and reads it
    pub fn read(&mut self, path: &str) -> Result<ReadSummary, DetectError> {
        let loader = match self.app.component(&self.owner_class) {
            Some(owner) => owner.loader().clone(),
            None => self.app.loader().clone(),
        };
        let bytes = loader.read_all(path)?;
        self.read_bytes(path, &bytes)
    }

    pub fn read_bytes(&mut self, resource: &str, bytes: &[u8]) -> Result<ReadSummary, DetectError> {
        let text = decode(resource, bytes)?;
        let document = parse_document(resource, &text)?;
        let root = expect_root(resource, &document, &["struts-config"])?;

        if !self.app.contains(&self.owner_class) {
            return Err(DetectError::parse(
                resource,
                format!("no component {} owns this configuration", self.owner_class),
            ));
        }

        info!("Reading struts configuration {}", resource);
        let mut summary = ReadSummary::default();

        let form_beans = self.form_beans(root);
        let global_forwards: Vec<Forward> = children(root, "global-forwards")
            .flat_map(|g| children(g, "forward"))
            .filter_map(|f| self.forward(resource, &document, f))
            .collect();

        let mut mappings = Vec::new();
        for section in children(root, "action-mappings") {
            for action in children(section, "action") {
                match self.action(resource, &document, action, &form_beans) {
                    Ok(mut mapping) => {
                        for forward in &global_forwards {
                            mapping.add_forward(forward.clone());
                        }
                        mappings.push(mapping);
                        summary.entries += 1;
                    }
                    Err(reason) => {
                        summary.skipped += 1;
                        self.diagnostics.warn(
                            format!(
                                "Skipping action at {}: {}",
                                position(&document, action),
                                reason
                            ),
                            Some(resource),
                        );
                    }
                }
            }
        }

        let loader = self.app.loader().clone();
        let mut upgrade = Component::new(self.owner_class.clone(), ComponentKind::ActionServlet, loader);
        for mapping in mappings {
            upgrade.put_action_mapping(mapping);
        }
        let outcome = register(self.app, self.diagnostics, upgrade);
        debug!("{} after {}: {:?}", self.owner_class, resource, outcome);

        Ok(summary)
    }

    fn form_beans(&self, root: Node<'_, '_>) -> HashMap<String, String> {
        children(root, "form-beans")
            .flat_map(|section| children(section, "form-bean"))
            .filter_map(|bean| Some((attribute(bean, "name")?, attribute(bean, "type")?)))
            .collect()
    }

    fn action(
        &self,
        resource: &str,
        document: &Document<'_>,
        node: Node<'_, '_>,
        form_beans: &HashMap<String, String>,
    ) -> Result<ActionMapping, String> {
        let path = attribute(node, "path").ok_or("missing 'path' attribute")?;
        let Some(handler_class) = attribute(node, "type") else {
            if node.has_attribute("forward") || node.has_attribute("include") {
                return Err(format!("action {} only forwards and has no handler", path));
            }
            return Err(format!("action {} has no 'type' attribute", path));
        };
        if !is_class_name(&handler_class) {
            return Err(format!(
                "action {} has malformed handler class '{}'",
                path, handler_class
            ));
        }

        let mut mapping = ActionMapping::new(self.prefixed(&path), handler_class);
        mapping.scope = attribute(node, "scope");
        mapping.form_name = attribute(node, "name");
        mapping.form_class = mapping
            .form_name
            .as_ref()
            .and_then(|name| form_beans.get(name).cloned());
        for forward in children(node, "forward") {
            if let Some(forward) = self.forward(resource, document, forward) {
                mapping.add_forward(forward);
            }
        }
        Ok(mapping)
    }

    fn forward(
        &self,
        resource: &str,
        document: &Document<'_>,
        node: Node<'_, '_>,
    ) -> Option<Forward> {
        match (attribute(node, "name"), attribute(node, "path")) {
            (Some(name), Some(path)) => Some(Forward {
                name,
                path,
                redirect: node.attribute("redirect") == Some("true"),
            }),
            _ => {
                debug!(
                    "{}: ignoring incomplete forward at {}",
                    resource,
                    position(document, node)
                );
                None
            }
        }
    }

    fn prefixed(&self, path: &str) -> String {
        if self.module_prefix.is_empty() {
            path.to_string()
        } else {
            let prefix = self.module_prefix.trim_end_matches('/');
            if path.starts_with('/') {
                format!("{}{}", prefix, path)
            } else {
                format!("{}/{}", prefix, path)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;
    use crate::resource::ClasspathLoader;
    use std::sync::Arc;

    const ACTION_SERVLET: &str = "org.apache.struts.action.ActionServlet";

    const STRUTS_CONFIG: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<!DOCTYPE struts-config PUBLIC
  "-//Apache Software Foundation//DTD Struts Configuration 1.3//EN"
  "http://struts.apache.org/dtds/struts-config_1_3.dtd">
<struts-config>
  <form-beans>
    <form-bean name="loginForm" type="com.example.LoginForm"/>
  </form-beans>
  <global-forwards>
    <forward name="welcome" path="/index.jsp"/>
    <forward name="success" path="/global-success.jsp"/>
  </global-forwards>
  <action-mappings>
    <action path="/login" type="com.example.LoginAction" name="loginForm" scope="request">
      <forward name="success" path="/home.jsp" redirect="true"/>
    </action>
    <action path="/logout" type="com.example.LogoutAction"/>
  </action-mappings>
</struts-config>"#;

    fn builder() -> ApplicationBuilder {
        let mut app = ApplicationBuilder::new(Arc::new(ClasspathLoader::default()));
        let loader = app.loader().clone();
        app.register(
            Component::new(ACTION_SERVLET, ComponentKind::Servlet, loader)
                .with_parameter("config", "/WEB-INF/struts-config.xml"),
        );
        app
    }

    #[test]
    fn test_reads_action_mappings_and_upgrades_owner() {
        let mut app = builder();
        let mut diagnostics = Diagnostics::new();

        let summary = StrutsReader::new(&mut app, &mut diagnostics, ACTION_SERVLET)
            .read_bytes("struts-config.xml", STRUTS_CONFIG.as_bytes())
            .unwrap();

        assert_eq!(summary, ReadSummary { entries: 2, skipped: 0 });
        let owner = app.component(ACTION_SERVLET).unwrap();
        assert_eq!(owner.kind(), ComponentKind::ActionServlet);
        assert_eq!(owner.parameter("config"), Some("/WEB-INF/struts-config.xml"));

        let mappings = owner.action_mappings();
        assert_eq!(mappings.len(), 2);
        let login = &mappings[0];
        assert_eq!(login.path, "/login");
        assert_eq!(login.handler_class, "com.example.LoginAction");
        assert_eq!(login.form_class.as_deref(), Some("com.example.LoginForm"));
        assert_eq!(login.scope.as_deref(), Some("request"));
        let success = login.forward("success").unwrap();
        assert_eq!(success.path, "/home.jsp");
        assert!(success.redirect);
        assert!(login.forward("welcome").is_some());

        assert_eq!(mappings[1].handler_class, "com.example.LogoutAction");
        assert_eq!(mappings[1].forwards.len(), 2);
    }

    #[test]
    fn test_malformed_action_does_not_drop_the_others() {
        let text = r#"<struts-config>
  <action-mappings>
    <action path="/ok" type="com.example.OkAction"/>
    <action type="com.example.NoPath"/>
    <action path="/bad" type="com.example.Not A Class"/>
    <action path="/static" forward="/static.jsp"/>
    <action path="/also-ok" type="com.example.AlsoOkAction"/>
  </action-mappings>
</struts-config>"#;
        let mut app = builder();
        let mut diagnostics = Diagnostics::new();

        let summary = StrutsReader::new(&mut app, &mut diagnostics, ACTION_SERVLET)
            .read_bytes("struts-config.xml", text.as_bytes())
            .unwrap();

        assert_eq!(summary, ReadSummary { entries: 2, skipped: 3 });
        assert_eq!(diagnostics.count(Severity::Warn), 3);
        let paths: Vec<&str> = app
            .component(ACTION_SERVLET)
            .unwrap()
            .action_mappings()
            .iter()
            .map(|m| m.path.as_str())
            .collect();
        assert_eq!(paths, vec!["/ok", "/also-ok"]);
    }

    #[test]
    fn test_module_prefix() {
        let mut app = builder();
        let mut diagnostics = Diagnostics::new();

        StrutsReader::new(&mut app, &mut diagnostics, ACTION_SERVLET)
            .with_module_prefix("/admin/")
            .read_bytes("struts-config-admin.xml", STRUTS_CONFIG.as_bytes())
            .unwrap();

        let owner = app.component(ACTION_SERVLET).unwrap();
        assert_eq!(owner.action_mappings()[0].path, "/admin/login");
    }

    #[test]
    fn test_structurally_invalid_file_fails_whole_file() {
        let mut app = builder();
        let mut diagnostics = Diagnostics::new();

        let err = StrutsReader::new(&mut app, &mut diagnostics, ACTION_SERVLET)
            .read_bytes("struts-config.xml", b"<struts-config><action-mappings>")
            .unwrap_err();

        assert!(matches!(err, DetectError::Parse { .. }));
        assert_eq!(
            app.component(ACTION_SERVLET).unwrap().kind(),
            ComponentKind::Servlet
        );
    }

    #[test]
    fn test_unknown_owner_is_rejected() {
        let mut app = builder();
        let mut diagnostics = Diagnostics::new();

        let err = StrutsReader::new(&mut app, &mut diagnostics, "com.example.Other")
            .read_bytes("struts-config.xml", STRUTS_CONFIG.as_bytes())
            .unwrap_err();

        assert!(err.to_string().contains("com.example.Other"));
        assert!(!app.contains("com.example.Other"));
    }

    #[test]
    fn test_module_prefix_joins_relative_paths() {
        let text = r#"<struts-config>
  <action-mappings>
    <action path="users" type="com.example.admin.UsersAction"/>
  </action-mappings>
</struts-config>"#;
        let mut app = builder();
        let mut diagnostics = Diagnostics::new();

        StrutsReader::new(&mut app, &mut diagnostics, ACTION_SERVLET)
            .with_module_prefix("/admin")
            .read_bytes("struts-config-admin.xml", text.as_bytes())
            .unwrap();

        let owner = app.component(ACTION_SERVLET).unwrap();
        assert_eq!(owner.action_mappings()[0].path, "/admin/users");
    }

    #[test]
    fn test_latin1_declared_file_is_read() {
        let mut bytes = br#"<?xml version="1.0" encoding="ISO-8859-1"?>
<struts-config>
  <!-- Caf"#
            .to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(
            br#" -->
  <action-mappings>
    <action path="/login" type="com.example.LoginAction"/>
  </action-mappings>
</struts-config>"#,
        );
        let mut app = builder();
        let mut diagnostics = Diagnostics::new();

        let summary = StrutsReader::new(&mut app, &mut diagnostics, ACTION_SERVLET)
            .read_bytes("struts-config.xml", &bytes)
            .unwrap();

        assert_eq!(summary.entries, 1);
        let owner = app.component(ACTION_SERVLET).unwrap();
        assert_eq!(owner.action_mappings()[0].handler_class, "com.example.LoginAction");
    }
}
