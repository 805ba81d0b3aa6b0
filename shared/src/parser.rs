//! Plan parsing for raw completion output
//!
//! Models often wrap JSON in Markdown code fences despite being told not
//! to. Fences are stripped textually and the rest must be a JSON object;
//! inside that object odd or missing fields are tolerated.

use crate::errors::PlanError;
use crate::models::Plan;
use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Opening fence with optional language tag, or a bare closing fence
static FENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)```[a-z0-9_+-]*").expect("valid fence regex"));

/// Remove every code fence marker and the surrounding whitespace
pub fn strip_code_fences(raw: &str) -> String {
    FENCE_REGEX.replace_all(raw, "").trim().to_string()
}

/// Parse raw model output into a plan
///
/// Fails with [`PlanError::MalformedPlan`] for anything that is not a JSON
/// object after fence stripping; never returns a partially filled plan.
/// `null` and wrong-typed fields inside the object load as empty.
pub fn parse_plan(raw: &str) -> Result<Plan, PlanError> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return Err(PlanError::MalformedPlan(
            "model returned an empty response".to_string(),
        ));
    }

    let value: serde_json::Value =
        serde_json::from_str(&cleaned).map_err(|e| PlanError::MalformedPlan(e.to_string()))?;
    if !value.is_object() {
        return Err(PlanError::MalformedPlan(
            "expected a JSON object at the top level".to_string(),
        ));
    }

    serde_json::from_value::<Plan>(value).map_err(|e| PlanError::MalformedPlan(e.to_string()))
}
