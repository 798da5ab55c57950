//! Struts 1 detector
//!
//! Struts actions are plain classes dispatched by the `ActionServlet`, so
//! they are found only through the `struts-config.xml` files that servlet names
//! in its init parameters.

use super::{split_paths, DetectionContext, Detector};
use crate::error::DetectError;
use crate::model::{Component, ComponentKind};
use crate::reader::StrutsReader;
use tracing::{debug, info};

pub const ACTION_SERVLET_CLASS: &str = "org.apache.struts.action.ActionServlet";
pub const DEFAULT_CONFIG: &str = "/WEB-INF/struts-config.xml";
pub const ACTION_SERVLET_TEMPLATE: &str = "struts::ActionServlet::main";

const CONFIG_PARAM: &str = "config";
const MODULE_PARAM_PREFIX: &str = "config/";

pub struct StrutsDetector;

/// A config file to read and the module prefix its action paths get
#[derive(Debug, Clone, PartialEq, Eq)]
struct ConfigFile {
    path: String,
    module_prefix: String,
}

impl StrutsDetector {
    /// Configuration files named by an action servlet's init parameters
    fn config_files(servlet: &Component) -> Vec<ConfigFile> {
        let mut files = Vec::new();

        let default_module = servlet.parameter(CONFIG_PARAM).unwrap_or(DEFAULT_CONFIG);
        files.extend(split_paths(default_module).map(|path| ConfigFile {
            path: path.to_string(),
            module_prefix: String::new(),
        }));

        for parameter in servlet.parameters() {
            let Some(module) = parameter.name.strip_prefix(MODULE_PARAM_PREFIX) else {
                continue;
            };
            let module = module.trim_matches('/');
            if module.is_empty() {
                continue;
            }
            files.extend(split_paths(&parameter.value).map(|path| ConfigFile {
                path: path.to_string(),
                module_prefix: format!("/{}", module),
            }));
        }
        files
    }
}

impl Detector for StrutsDetector {
    fn name(&self) -> &'static str {
        "struts"
    }

    fn detect_from_source(&self, _ctx: &mut DetectionContext<'_>) -> Result<(), DetectError> {
        Err(DetectError::UnrecognizedDialect {
            detector: self.name().to_string(),
            reason: "struts actions are only declared in struts-config.xml".to_string(),
        })
    }

    fn detect_from_config(&self, ctx: &mut DetectionContext<'_>) -> Result<(), DetectError> {
        info!("Detecting struts actions from configuration files");
        let classes = ctx.classes;

        let owners: Vec<Component> = ctx
            .app
            .components()
            .filter(|c| {
                c.kind() == ComponentKind::ActionServlet
                    || c.class_name() == ACTION_SERVLET_CLASS
                    || classes.is_subclass_of(c.class_name(), ACTION_SERVLET_CLASS)
            })
            .cloned()
            .collect();

        for owner in owners {
            info!("Found action servlet {}", owner);
            for file in Self::config_files(&owner) {
                debug!("Reading {} for {}", file.path, owner.class_name());
                let mut reader = StrutsReader::new(ctx.app, ctx.diagnostics, owner.class_name())
                    .with_module_prefix(file.module_prefix);
                if let Err(e) = reader.read(&file.path) {
                    ctx.diagnostics.report(&e);
                }
            }
        }
        Ok(())
    }

    fn model_extensions(&self) -> Vec<ComponentKind> {
        vec![ComponentKind::ActionServlet]
    }

    fn template_files(&self) -> Vec<&'static str> {
        vec![ACTION_SERVLET_TEMPLATE]
    }
}
