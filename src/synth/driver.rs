//! Statement IR of the synthetic driver
//!
//! The IR is deliberately small: object allocation, method invocation and
//! field stores over numbered locals. That is enough to replay the container's
//! data flow for an analyzer, and it renders to readable text or JSON.

use crate::model::LifecycleRole;
use serde::Serialize;
use std::fmt::{self, Write as _};

/// Package of the container stand-in classes the driver allocates
pub const SYNTHETIC_PACKAGE: &str = "webentry.synthetic";

pub fn synthetic(simple: &str) -> String {
    format!("{}.{}", SYNTHETIC_PACKAGE, simple)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Local(String),
    Str(String),
    Int(i64),
    Bool(bool),
    Null,
    /// Container-managed resource looked up by JNDI name
    Resource(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Local(local) => write!(f, "{}", local),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Null => write!(f, "null"),
            Value::Resource(name) => write!(f, "lookup({:?})", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Stmt {
    New {
        local: String,
        class: String,
    },
    Invoke {
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<String>,
        receiver: String,
        /// Declaring class or interface of `method`
        class: String,
        method: String,
        args: Vec<Value>,
    },
    Store {
        receiver: String,
        field: String,
        value: Value,
    },
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::New { local, class } => write!(f, "{} = new {}()", local, class),
            Stmt::Invoke {
                result,
                receiver,
                class,
                method,
                args,
            } => {
                if let Some(result) = result {
                    write!(f, "{} = ", result)?;
                }
                let args: Vec<String> = args.iter().map(Value::to_string).collect();
                write!(f, "{}.<{}>{}({})", receiver, class, method, args.join(", "))
            }
            Stmt::Store {
                receiver,
                field,
                value,
            } => write!(f, "{}.{} = {}", receiver, field, value),
        }
    }
}

/// The statements replaying one component (or one action mapping)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverUnit {
    pub name: String,
    pub role: LifecycleRole,
    pub component: String,
    pub template: String,
    pub statements: Vec<Stmt>,
}

/// Builds a [`DriverUnit`], handing out fresh `$rN` locals
pub struct UnitBuilder {
    unit: DriverUnit,
    next_local: usize,
}

impl UnitBuilder {
    pub fn new(
        name: impl Into<String>,
        role: LifecycleRole,
        component: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            unit: DriverUnit {
                name: name.into(),
                role,
                component: component.into(),
                template: template.into(),
                statements: Vec::new(),
            },
            next_local: 0,
        }
    }

    fn local(&mut self) -> String {
        let local = format!("$r{}", self.next_local);
        self.next_local += 1;
        local
    }

    /// Allocates an instance of `class` and returns the local holding it
    pub fn new_object(&mut self, class: impl Into<String>) -> String {
        let local = self.local();
        self.unit.statements.push(Stmt::New {
            local: local.clone(),
            class: class.into(),
        });
        local
    }

    pub fn invoke(
        &mut self,
        receiver: &str,
        class: impl Into<String>,
        method: impl Into<String>,
        args: Vec<Value>,
    ) {
        self.unit.statements.push(Stmt::Invoke {
            result: None,
            receiver: receiver.to_string(),
            class: class.into(),
            method: method.into(),
            args,
        });
    }

    /// Like [`invoke`](Self::invoke) but keeps the return value in a fresh local
    pub fn invoke_into(
        &mut self,
        receiver: &str,
        class: impl Into<String>,
        method: impl Into<String>,
        args: Vec<Value>,
    ) -> String {
        let result = self.local();
        self.unit.statements.push(Stmt::Invoke {
            result: Some(result.clone()),
            receiver: receiver.to_string(),
            class: class.into(),
            method: method.into(),
            args,
        });
        result
    }

    pub fn store(&mut self, receiver: &str, field: impl Into<String>, value: Value) {
        self.unit.statements.push(Stmt::Store {
            receiver: receiver.to_string(),
            field: field.into(),
            value,
        });
    }

    pub fn finish(self) -> DriverUnit {
        self.unit
    }
}

/// The synthesized entry point: every unit in container order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Driver {
    pub class_name: String,
    pub units: Vec<DriverUnit>,
}

impl Driver {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            units: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn dispatch_units(&self) -> impl Iterator<Item = &DriverUnit> {
        self.units
            .iter()
            .filter(|u| u.role == LifecycleRole::Dispatch)
    }

    /// Human-readable listing, one block per unit
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "driver {} {{", self.class_name);
        for unit in &self.units {
            let _ = writeln!(
                out,
                "  {} {} [{}] {{",
                unit.role.serde_name(),
                unit.name,
                unit.template
            );
            for stmt in &unit.statements {
                let _ = writeln!(out, "    {};", stmt);
            }
            out.push_str("  }\n");
        }
        out.push_str("}\n");
        out
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
