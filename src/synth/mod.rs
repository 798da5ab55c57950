//! Entry-point synthesis
//!
//! Turns a frozen [`WebApplication`] into a [`Driver`]: listeners first, then
//! filters, then everything that dispatches requests. Nothing here fails the
//! whole run; problems with one component or mapping become diagnostics.

pub mod driver;
pub mod servlet;
pub mod struts;
pub mod template;

pub use driver::{Driver, DriverUnit, Stmt, UnitBuilder, Value};
pub use template::{Template, TemplateCatalog, TemplateContext, TemplateRegistry};

use crate::diagnostics::Diagnostics;
use crate::error::DetectError;
use crate::model::{ClassIndex, Component, LifecycleRole, WebApplication};
use std::cmp::Ordering;
use std::time::Instant;
use tracing::{debug, info};

pub const DEFAULT_DRIVER_CLASS: &str = "webentry.synthetic.EntryPoint";

/// The synthesized driver and everything noteworthy that happened on the way
#[derive(Debug)]
pub struct Synthesis {
    pub driver: Driver,
    pub diagnostics: Diagnostics,
}

pub struct Synthesizer {
    templates: TemplateRegistry,
    driver_class: String,
}

/// Servlets with a non-negative load-on-startup come first, in ascending order
fn startup_order(component: &Component) -> (u8, i32) {
    match component.load_on_startup() {
        Some(order) if order >= 0 => (0, order),
        _ => (1, 0),
    }
}

/// Container order: by lifecycle role, then start-up order for dispatchers, then class name
pub fn container_order(a: &Component, b: &Component) -> Ordering {
    let role = a.kind().role().cmp(&b.kind().role());
    let startup = if a.kind().role() == LifecycleRole::Dispatch {
        startup_order(a).cmp(&startup_order(b))
    } else {
        Ordering::Equal
    };
    role.then(startup)
        .then_with(|| a.class_name().cmp(b.class_name()))
}

impl Synthesizer {
    pub fn new(templates: TemplateRegistry) -> Self {
        Self {
            templates,
            driver_class: DEFAULT_DRIVER_CLASS.to_string(),
        }
    }

    pub fn with_driver_class(mut self, class_name: impl Into<String>) -> Self {
        self.driver_class = class_name.into();
        self
    }

    pub fn synthesize(&self, app: &WebApplication, classes: &ClassIndex) -> Synthesis {
        let start = Instant::now();
        info!("Synthesizing entry point for {} components", app.len());

        let mut diagnostics = Diagnostics::new();
        let mut driver = Driver::new(self.driver_class.clone());

        let mut components: Vec<&Component> = app.components().collect();
        components.sort_by(|a, b| container_order(a, b));

        for component in components {
            let Some(template) = self.templates.get(component.kind()) else {
                diagnostics.report(&DetectError::MissingTemplate {
                    kind: component.kind(),
                    class_name: component.class_name().to_string(),
                });
                continue;
            };

            let mut ctx = TemplateContext {
                app,
                classes,
                diagnostics: &mut diagnostics,
            };
            let units = template.instantiate(component, &mut ctx);
            debug!(
                "{} produced {} unit(s) via {}",
                component,
                units.len(),
                template.id()
            );
            driver.units.extend(units);
        }

        info!(
            "Synthesis complete: {} units, {} diagnostics in {:?}",
            driver.len(),
            diagnostics.len(),
            start.elapsed()
        );
        Synthesis {
            driver,
            diagnostics,
        }
    }
}
