//! Template for Struts 1 action servlets
//!
//! The controller itself is not replayed. Every action mapping becomes its own
//! dispatch unit that builds the `ActionMapping` the controller would pass and
//! calls `execute` on a fresh handler instance.

use super::driver::{DriverUnit, UnitBuilder, Value};
use super::servlet::exchange;
use super::template::{Template, TemplateContext};
use crate::detector::struts::ACTION_SERVLET_TEMPLATE;
use crate::error::DetectError;
use crate::model::{ActionMapping, Component, ComponentKind};
use tracing::debug;

const ACTION: &str = "org.apache.struts.action.Action";
const ACTION_MAPPING: &str = "org.apache.struts.action.ActionMapping";
const ACTION_FORWARD: &str = "org.apache.struts.action.ActionForward";

pub struct ActionServletTemplate;

impl ActionServletTemplate {
    fn mapping_unit(
        &self,
        component: &Component,
        mapping: &ActionMapping,
        ctx: &mut TemplateContext<'_>,
    ) -> Result<DriverUnit, DetectError> {
        if !ctx.classes.resolves(&mapping.handler_class) {
            return Err(DetectError::UnresolvedClass {
                class_name: mapping.handler_class.clone(),
                referrer: format!("action {} of {}", mapping.path, component.class_name()),
            });
        }

        let mut unit = UnitBuilder::new(
            format!("{}{}", component.class_name(), mapping.path),
            component.kind().role(),
            component.class_name(),
            self.id(),
        );

        let action = unit.new_object(mapping.handler_class.clone());
        for injection in ctx.app.injections_for(&mapping.handler_class) {
            unit.store(
                &action,
                injection.target.target_name.clone(),
                Value::Resource(injection.resource_name.clone()),
            );
        }

        let config = unit.new_object(ACTION_MAPPING);
        let set = |unit: &mut UnitBuilder, method: &str, value: &str| {
            unit.invoke(&config, ACTION_MAPPING, method, vec![Value::Str(value.to_string())]);
        };
        set(&mut unit, "setPath", &mapping.path);
        set(&mut unit, "setType", &mapping.handler_class);
        if let Some(name) = &mapping.form_name {
            set(&mut unit, "setName", name);
        }
        if let Some(scope) = &mapping.scope {
            set(&mut unit, "setScope", scope);
        }

        for forward in &mapping.forwards {
            let target = unit.new_object(ACTION_FORWARD);
            unit.invoke(
                &target,
                ACTION_FORWARD,
                "setName",
                vec![Value::Str(forward.name.clone())],
            );
            unit.invoke(
                &target,
                ACTION_FORWARD,
                "setPath",
                vec![Value::Str(forward.path.clone())],
            );
            if forward.redirect {
                unit.invoke(&target, ACTION_FORWARD, "setRedirect", vec![Value::Bool(true)]);
            }
            unit.invoke(
                &config,
                ACTION_MAPPING,
                "addForwardConfig",
                vec![Value::Local(target)],
            );
        }

        let form = match &mapping.form_class {
            Some(form_class) if ctx.classes.resolves(form_class) => {
                Value::Local(unit.new_object(form_class.clone()))
            }
            Some(form_class) => {
                debug!("Form bean {} of {} is not loadable", form_class, mapping.path);
                Value::Null
            }
            None => Value::Null,
        };

        let (request, response) = exchange(&mut unit, Some(&mapping.path));
        unit.invoke_into(
            &action,
            ACTION,
            "execute",
            vec![
                Value::Local(config),
                form,
                Value::Local(request),
                Value::Local(response),
            ],
        );
        Ok(unit.finish())
    }
}

impl Template for ActionServletTemplate {
    fn id(&self) -> &'static str {
        ACTION_SERVLET_TEMPLATE
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::ActionServlet
    }

    fn instantiate(&self, component: &Component, ctx: &mut TemplateContext<'_>) -> Vec<DriverUnit> {
        if component.action_mappings().is_empty() {
            ctx.diagnostics.info(
                format!("{} declares no action mappings", component.class_name()),
                Some(component.class_name()),
            );
        }

        let mut units = Vec::new();
        for mapping in component.action_mappings() {
            match self.mapping_unit(component, mapping, ctx) {
                Ok(unit) => units.push(unit),
                Err(e) => ctx.diagnostics.report(&e),
            }
        }
        units
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Diagnostics, Severity};
    use crate::model::{ApplicationBuilder, ClassIndex, ClassInfo, Forward, WebApplication};
    use crate::resource::ClasspathLoader;
    use crate::synth::driver::Stmt;
    use std::sync::Arc;

    const CONTROLLER: &str = "org.apache.struts.action.ActionServlet";

    fn application() -> WebApplication {
        let mut app = ApplicationBuilder::new(Arc::new(ClasspathLoader::default()));
        let loader = app.loader().clone();
        let mut login = ActionMapping::new("/login", "com.example.LoginAction").with_forward(Forward {
            name: "success".to_string(),
            path: "/home.jsp".to_string(),
            redirect: true,
        });
        login.form_name = Some("loginForm".to_string());
        login.form_class = Some("com.example.LoginForm".to_string());
        app.register(
            Component::new(CONTROLLER, ComponentKind::ActionServlet, loader)
                .with_action_mapping(login)
                .with_action_mapping(ActionMapping::new("/logout", "com.example.LogoutAction"))
                .with_action_mapping(ActionMapping::new("/gone", "com.example.MissingAction")),
        );
        app.build()
    }

    fn classes() -> ClassIndex {
        [
            ClassInfo::new("com.example.LoginAction").extends(ACTION),
            ClassInfo::new("com.example.LogoutAction").extends(ACTION),
            ClassInfo::new("com.example.LoginForm"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_one_unit_per_resolvable_mapping() {
        let app = application();
        let classes = classes();
        let mut diagnostics = Diagnostics::new();
        let mut ctx = TemplateContext {
            app: &app,
            classes: &classes,
            diagnostics: &mut diagnostics,
        };

        let units = ActionServletTemplate.instantiate(app.component(CONTROLLER).unwrap(), &mut ctx);

        let names: Vec<&str> = units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "org.apache.struts.action.ActionServlet/login",
                "org.apache.struts.action.ActionServlet/logout"
            ]
        );
        assert_eq!(diagnostics.count(Severity::Warn), 1);
        assert_eq!(
            diagnostics.iter().next().unwrap().resource.as_deref(),
            Some("com.example.MissingAction")
        );
    }

    #[test]
    fn test_login_unit_builds_mapping_and_form() {
        let app = application();
        let classes = classes();
        let mut diagnostics = Diagnostics::new();
        let mut ctx = TemplateContext {
            app: &app,
            classes: &classes,
            diagnostics: &mut diagnostics,
        };

        let units = ActionServletTemplate.instantiate(app.component(CONTROLLER).unwrap(), &mut ctx);
        let login = &units[0];

        assert_eq!(
            login.statements[0],
            Stmt::New {
                local: "$r0".to_string(),
                class: "com.example.LoginAction".to_string()
            }
        );
        assert!(login.statements.iter().any(|s| matches!(
            s,
            Stmt::New { class, .. } if class == "com.example.LoginForm"
        )));
        let execute = login.statements.last().unwrap();
        assert!(matches!(
            execute,
            Stmt::Invoke { receiver, method, args, .. }
                if receiver == "$r0" && method == "execute" && args.len() == 4
        ));
    }
}
