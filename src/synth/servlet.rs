//! Templates for plain servlet API components
//!
//! Each component becomes one unit that allocates the instance, injects the
//! resources the descriptor targets at it, then drives its lifecycle methods
//! with synthetic container objects.

use super::driver::{synthetic, DriverUnit, UnitBuilder, Value};
use super::template::{Template, TemplateContext};
use crate::detector::servlet::{FILTER_TEMPLATE, LISTENER_TEMPLATE, SERVLET_TEMPLATE};
use crate::model::{Component, ComponentKind};
use crate::servlet_api::{self, namespace_for, qualified, LISTENER_CALLBACKS};

/// Allocates the component and stores every resource injected into it
pub(crate) fn allocate(
    unit: &mut UnitBuilder,
    component: &Component,
    ctx: &TemplateContext<'_>,
) -> String {
    let instance = unit.new_object(component.class_name());
    for injection in ctx.app.injections_for(component.class_name()) {
        unit.store(
            &instance,
            injection.target.target_name.clone(),
            Value::Resource(injection.resource_name.clone()),
        );
    }
    instance
}

/// A config object carrying the component's init parameters
fn config(unit: &mut UnitBuilder, class: &str, component: &Component) -> String {
    let config = unit.new_object(class);
    for parameter in component.parameters() {
        unit.invoke(
            &config,
            class,
            "addInitParameter",
            vec![Value::Str(parameter.name), Value::Str(parameter.value)],
        );
    }
    config
}

/// A request for `path` and a matching response
pub(crate) fn exchange(unit: &mut UnitBuilder, path: Option<&str>) -> (String, String) {
    let request_class = synthetic("HttpServletRequest");
    let request = unit.new_object(request_class.clone());
    if let Some(path) = path {
        unit.invoke(
            &request,
            request_class,
            "setServletPath",
            vec![Value::Str(path.to_string())],
        );
    }
    let response = unit.new_object(synthetic("HttpServletResponse"));
    (request, response)
}

pub struct ServletTemplate;

impl Template for ServletTemplate {
    fn id(&self) -> &'static str {
        SERVLET_TEMPLATE
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Servlet
    }

    fn instantiate(&self, component: &Component, ctx: &mut TemplateContext<'_>) -> Vec<DriverUnit> {
        let ns = namespace_for(ctx.classes, component.class_name());
        let servlet_interface = qualified(ns, servlet_api::SERVLET_INTERFACE);

        let mut unit = UnitBuilder::new(
            component.class_name(),
            component.kind().role(),
            component.class_name(),
            self.id(),
        );
        let servlet = allocate(&mut unit, component, ctx);
        let config = config(&mut unit, &synthetic("ServletConfig"), component);
        unit.invoke(&servlet, servlet_interface.clone(), "init", vec![Value::Local(config)]);

        let patterns: Vec<Option<&str>> = match component.url_patterns().count() {
            0 => vec![None],
            _ => component.url_patterns().map(Some).collect(),
        };
        for pattern in patterns {
            let (request, response) = exchange(&mut unit, pattern);
            unit.invoke(
                &servlet,
                servlet_interface.clone(),
                "service",
                vec![Value::Local(request), Value::Local(response)],
            );
        }

        unit.invoke(&servlet, servlet_interface, "destroy", vec![]);
        vec![unit.finish()]
    }
}

pub struct FilterTemplate;

impl Template for FilterTemplate {
    fn id(&self) -> &'static str {
        FILTER_TEMPLATE
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Filter
    }

    fn instantiate(&self, component: &Component, ctx: &mut TemplateContext<'_>) -> Vec<DriverUnit> {
        let ns = namespace_for(ctx.classes, component.class_name());
        let filter_interface = qualified(ns, servlet_api::FILTER_INTERFACE);
        let chain_class = synthetic("FilterChain");

        let mut unit = UnitBuilder::new(
            component.class_name(),
            component.kind().role(),
            component.class_name(),
            self.id(),
        );
        let filter = allocate(&mut unit, component, ctx);
        let config = config(&mut unit, &synthetic("FilterConfig"), component);
        unit.invoke(&filter, filter_interface.clone(), "init", vec![Value::Local(config)]);

        let mut targets: Vec<(Option<&str>, Option<&str>)> = component
            .url_patterns()
            .map(|p| (Some(p), None))
            .chain(component.servlet_names().map(|n| (None, Some(n))))
            .collect();
        if targets.is_empty() {
            targets.push((None, None));
        }

        for (pattern, servlet_name) in targets {
            let (request, response) = exchange(&mut unit, pattern);
            let chain = unit.new_object(chain_class.clone());
            if let Some(name) = servlet_name {
                unit.invoke(
                    &chain,
                    chain_class.clone(),
                    "setTargetServlet",
                    vec![Value::Str(name.to_string())],
                );
            }
            unit.invoke(
                &filter,
                filter_interface.clone(),
                "doFilter",
                vec![
                    Value::Local(request),
                    Value::Local(response),
                    Value::Local(chain),
                ],
            );
        }

        unit.invoke(&filter, filter_interface, "destroy", vec![]);
        vec![unit.finish()]
    }
}

pub struct ListenerTemplate;

impl Template for ListenerTemplate {
    fn id(&self) -> &'static str {
        LISTENER_TEMPLATE
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Listener
    }

    fn instantiate(&self, component: &Component, ctx: &mut TemplateContext<'_>) -> Vec<DriverUnit> {
        let ns = namespace_for(ctx.classes, component.class_name());
        let interfaces = ctx.classes.interfaces_of(component.class_name());

        let mut callbacks: Vec<_> = LISTENER_CALLBACKS
            .iter()
            .filter(|cb| interfaces.contains(qualified(ns, cb.interface).as_str()))
            .collect();
        if callbacks.is_empty() {
            callbacks.push(&LISTENER_CALLBACKS[0]);
        }

        let mut unit = UnitBuilder::new(
            component.class_name(),
            component.kind().role(),
            component.class_name(),
            self.id(),
        );
        let listener = allocate(&mut unit, component, ctx);
        for callback in callbacks {
            let event = unit.new_object(qualified(ns, callback.event));
            unit.invoke(
                &listener,
                qualified(ns, callback.interface),
                callback.method,
                vec![Value::Local(event)],
            );
        }
        vec![unit.finish()]
    }
}
