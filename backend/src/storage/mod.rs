//! Durable state owned by the backend

mod plans;

pub use plans::{FilePlanMirror, PlanRegistry};
