//! Generic servlet container detector
//!
//! Source: servlet subclasses, filter and listener implementations, and the
//! Servlet 3.0 `@WebServlet`/`@WebFilter`/`@WebListener` annotations.
//! Config: `WEB-INF/web.xml` plus a `META-INF/web-fragment.xml` on the classpath.

use super::{DetectionContext, Detector};
use crate::error::DetectError;
use crate::model::{ClassIndex, ClassInfo, Component, ComponentKind};
use crate::reader::{register, WebXmlReader};
use crate::servlet_api::{self, all_namespaces};
use tracing::{debug, info};

pub const WEB_XML: &str = "WEB-INF/web.xml";
pub const WEB_FRAGMENT: &str = "META-INF/web-fragment.xml";

pub const SERVLET_TEMPLATE: &str = "servlet::HttpServlet::main";
pub const FILTER_TEMPLATE: &str = "servlet::Filter::main";
pub const LISTENER_TEMPLATE: &str = "servlet::Listener::main";

pub struct ServletDetector;

impl ServletDetector {
    /// Kind a class is deployed as, if any
    fn classify(classes: &ClassIndex, class: &ClassInfo) -> Option<ComponentKind> {
        if class.is_abstract || servlet_api::is_api_class(&class.name) {
            return None;
        }

        let annotated = |simple: &str| {
            all_namespaces(simple).any(|a| classes.has_annotation(&class.name, &a))
        };
        if annotated(servlet_api::WEB_SERVLET) {
            return Some(ComponentKind::Servlet);
        }
        if annotated(servlet_api::WEB_FILTER) {
            return Some(ComponentKind::Filter);
        }
        if annotated(servlet_api::WEB_LISTENER) {
            return Some(ComponentKind::Listener);
        }

        let interfaces = classes.interfaces_of(&class.name);
        let implements = |simple: &str| all_namespaces(simple).any(|i| interfaces.contains(i.as_str()));

        let is_servlet = servlet_api::SERVLET_BASES.iter().any(|base| {
            all_namespaces(base).any(|b| classes.is_subclass_of(&class.name, &b))
        }) || implements(servlet_api::SERVLET_INTERFACE);
        if is_servlet {
            return Some(ComponentKind::Servlet);
        }
        if implements(servlet_api::FILTER_INTERFACE) {
            return Some(ComponentKind::Filter);
        }
        if servlet_api::LISTENER_CALLBACKS
            .iter()
            .any(|callback| implements(callback.interface))
        {
            return Some(ComponentKind::Listener);
        }
        None
    }
}

impl Detector for ServletDetector {
    fn name(&self) -> &'static str {
        "servlet"
    }

    fn detect_from_source(&self, ctx: &mut DetectionContext<'_>) -> Result<(), DetectError> {
        let classes = ctx.classes;
        info!("Detecting servlets, filters and listeners from {} classes", classes.len());
        let mut found = 0;
        for class in classes.iter() {
            let Some(kind) = Self::classify(classes, class) else {
                continue;
            };
            let loader = ctx.app.loader().clone();
            register(
                ctx.app,
                ctx.diagnostics,
                Component::new(class.name.clone(), kind, loader),
            );
            found += 1;
        }
        debug!("Found {} components from source", found);
        Ok(())
    }

    fn detect_from_config(&self, ctx: &mut DetectionContext<'_>) -> Result<(), DetectError> {
        info!("Detecting servlets from deployment descriptor");
        let mut reader = WebXmlReader::new(ctx.app, ctx.diagnostics);
        let result = reader.read(WEB_XML);

        if ctx.app.loader().exists(WEB_FRAGMENT) {
            let mut reader = WebXmlReader::new(ctx.app, ctx.diagnostics);
            if let Err(e) = reader.read(WEB_FRAGMENT) {
                ctx.diagnostics.report(&e);
            }
        }

        result.map(|_| ())
    }

    fn model_extensions(&self) -> Vec<ComponentKind> {
        vec![
            ComponentKind::Servlet,
            ComponentKind::Filter,
            ComponentKind::Listener,
        ]
    }

    fn check_files(&self) -> Vec<&'static str> {
        vec![WEB_XML]
    }

    fn template_files(&self) -> Vec<&'static str> {
        vec![SERVLET_TEMPLATE, FILTER_TEMPLATE, LISTENER_TEMPLATE]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::fs::MockFileSystem;
    use crate::model::ApplicationBuilder;
    use crate::resource::FsResourceLoader;
    use std::sync::Arc;

    fn classes() -> ClassIndex {
        [
            ClassInfo::new("javax.servlet.http.HttpServlet").extends("javax.servlet.GenericServlet"),
            ClassInfo::new("com.example.HomeServlet").extends("javax.servlet.http.HttpServlet"),
            ClassInfo::new("com.example.BaseServlet")
                .extends("javax.servlet.http.HttpServlet")
                .abstract_class(),
            ClassInfo::new("com.example.AuditFilter").implements("jakarta.servlet.Filter"),
            ClassInfo::new("com.example.Startup").implements("javax.servlet.ServletContextListener"),
            ClassInfo::new("com.example.Annotated")
                .annotated("javax.servlet.annotation.WebServlet"),
            ClassInfo::new("com.example.Model"),
        ]
        .into_iter()
        .collect()
    }

    fn app(web_xml: Option<&str>) -> ApplicationBuilder {
        let fs = MockFileSystem::new();
        if let Some(text) = web_xml {
            fs.add_file(WEB_XML, text);
        }
        ApplicationBuilder::new(Arc::new(FsResourceLoader::new(Arc::new(fs), "/webapp")))
    }

    #[test]
    fn test_detect_from_source() {
        let mut app = app(None);
        let classes = classes();
        let mut diagnostics = Diagnostics::new();
        let mut ctx = DetectionContext::new(&mut app, &classes, &mut diagnostics);

        ServletDetector.detect_from_source(&mut ctx).unwrap();

        assert_eq!(app.len(), 4);
        let kind = |name: &str| app.component(name).map(|c| c.kind());
        assert_eq!(kind("com.example.HomeServlet"), Some(ComponentKind::Servlet));
        assert_eq!(kind("com.example.AuditFilter"), Some(ComponentKind::Filter));
        assert_eq!(kind("com.example.Startup"), Some(ComponentKind::Listener));
        assert_eq!(kind("com.example.Annotated"), Some(ComponentKind::Servlet));
        assert_eq!(kind("com.example.BaseServlet"), None);
        assert_eq!(kind("javax.servlet.http.HttpServlet"), None);
    }

    #[test]
    fn test_detect_from_config_reads_web_xml() {
        let mut app = app(Some(
            r#"<web-app>
                 <servlet>
                   <servlet-name>home</servlet-name>
                   <servlet-class>com.example.HomeServlet</servlet-class>
                 </servlet>
               </web-app>"#,
        ));
        let classes = ClassIndex::new();
        let mut diagnostics = Diagnostics::new();
        let mut ctx = DetectionContext::new(&mut app, &classes, &mut diagnostics);

        ServletDetector.detect_from_config(&mut ctx).unwrap();

        assert!(app.component("com.example.HomeServlet").unwrap().has_name("home"));
    }

    #[test]
    fn test_detect_from_config_reads_web_fragment() {
        let fs = MockFileSystem::new();
        fs.add_file(WEB_XML, "<web-app/>");
        fs.add_file(
            WEB_FRAGMENT,
            r#"<web-fragment>
                 <filter>
                   <filter-name>audit</filter-name>
                   <filter-class>com.example.AuditFilter</filter-class>
                 </filter>
                 <filter-mapping>
                   <filter-name>audit</filter-name>
                   <url-pattern>/*</url-pattern>
                 </filter-mapping>
               </web-fragment>"#,
        );
        let mut app =
            ApplicationBuilder::new(Arc::new(FsResourceLoader::new(Arc::new(fs), "/webapp")));
        let classes = ClassIndex::new();
        let mut diagnostics = Diagnostics::new();
        let mut ctx = DetectionContext::new(&mut app, &classes, &mut diagnostics);

        ServletDetector.detect_from_config(&mut ctx).unwrap();

        let filter = app.component("com.example.AuditFilter").unwrap();
        assert_eq!(filter.kind(), ComponentKind::Filter);
        assert!(filter.has_name("audit"));
        assert_eq!(filter.url_patterns().collect::<Vec<_>>(), vec!["/*"]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_missing_web_xml_is_an_error() {
        let mut app = app(None);
        let classes = ClassIndex::new();
        let mut diagnostics = Diagnostics::new();
        let mut ctx = DetectionContext::new(&mut app, &classes, &mut diagnostics);

        let err = ServletDetector.detect_from_config(&mut ctx).unwrap_err();
        assert_eq!(err, DetectError::not_found(WEB_XML));
    }

    #[test]
    fn test_declared_capabilities() {
        assert_eq!(ServletDetector.check_files(), vec![WEB_XML]);
        assert_eq!(ServletDetector.model_extensions().len(), 3);
        assert_eq!(ServletDetector.template_files().len(), 3);
    }
}
