//! AI Fitness Coach Shared Library
//!
//! The plan pipeline without any I/O: prompt construction, plan parsing,
//! the plan store, the renderer view model and PDF export. Used by the
//! backend and by the WASM module running in the browser.

pub mod errors;
pub mod models;
pub mod parser;
pub mod pdf;
pub mod prompt;
pub mod render;
pub mod store;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use models::*;
pub use parser::{parse_plan, strip_code_fences};
pub use pdf::{export_pdf, layout_plan, PlanDocument, PDF_FILENAME};
pub use prompt::{build_plan_prompt, plan_messages, ChatMessage, ChatRole};
pub use store::{GenerationTicket, MemoryMirror, PlanMirror, PlanStore, PLAN_STORAGE_KEY};
pub use types::*;
pub use validation::{validate_profile, ValidationError};
