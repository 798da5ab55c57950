//! Application model
//!
//! Components are a closed set of kinds ([`ComponentKind`]) keyed by class name.
//! Detection writes into an [`ApplicationBuilder`]; synthesis reads a
//! [`WebApplication`].

#[macro_use]
pub mod id_enum_macro;

pub mod action;
pub mod application;
pub mod classes;
pub mod component;
pub mod injection;
pub mod kind;

pub use action::{ActionMapping, Forward};
pub use application::{ApplicationBuilder, WebApplication};
pub use classes::{is_class_name, ClassIndex, ClassInfo};
pub use component::{Component, MergeOutcome, Parameter};
pub use injection::{Injection, InjectionTarget};
pub use kind::{ComponentKind, LifecycleRole};
