//! PDF Exporter
//!
//! `layout_plan` is a pure function from a plan to pages of draw ops;
//! `PlanDocument::to_pdf_bytes` serializes them.

pub mod layout;
mod writer;

pub use layout::{layout_plan, wrap_text, DrawOp, Font, Page, PlanDocument, Rgb};

use crate::models::Plan;

/// Download name of the exported document
pub const PDF_FILENAME: &str = "AI-Fitness-Plan.pdf";

/// Lay out and serialize a plan in one step
pub fn export_pdf(plan: &Plan) -> Vec<u8> {
    layout_plan(plan).to_pdf_bytes()
}
