//! Prompt construction for the completion and image collaborators
//!
//! Profile free text is interpolated verbatim. The model is told to answer
//! with JSON only, but nothing binds it to, so callers must still treat a
//! parse failure as an expected outcome.

use crate::models::UserProfile;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// System message sent ahead of every plan prompt
pub const PLAN_SYSTEM_MESSAGE: &str = "You are an AI fitness planner. Return ONLY JSON.";

/// Quote shown whenever the motivation collaborator fails
pub const FALLBACK_QUOTE: &str = "Show up today. Your future self is watching.";

/// Shown in the image modal while the real image loads
pub const LOADING_PLACEHOLDER: &str = "/loading-placeholder.jpg";

/// Shown in the image modal when the image request fails
pub const ERROR_PLACEHOLDER: &str = "/image-error.jpg";

const PLAN_SCHEMA_EXAMPLE: &str = r#"{
  "workout": [
    {
      "day": "Day 1",
      "focus": "",
      "exercises": [
        { "name": "", "sets": "", "reps": "", "rest": "" }
      ]
    }
  ],
  "diet": [
    {
      "day": "Day 1",
      "Breakfast": "",
      "Lunch": "",
      "Dinner": "",
      "Snacks": ""
    }
  ],
  "tips": [
    "tip 1",
    "tip 2",
    "tip 3"
  ],
  "motivation": [
    "motivational line 1",
    "motivational line 2"
  ]
}"#;

/// Chat message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One message of a chat-style completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

/// Build the plan instruction for a profile
pub fn build_plan_prompt(profile: &UserProfile) -> String {
    let mut prompt = String::with_capacity(1600);

    prompt.push_str("You are an expert AI Fitness & Nutrition Coach.\n\n");
    prompt.push_str("Generate a COMPLETE 7-day personalized fitness plan for this user.\n\n");
    prompt.push_str("User Information:\n");

    // Writing to a String cannot fail.
    let _ = writeln!(prompt, "- Name: {}", profile.name);
    let _ = writeln!(prompt, "- Age: {}", profile.age);
    let _ = writeln!(prompt, "- Gender: {}", profile.gender);
    let _ = writeln!(prompt, "- Height: {} cm", profile.height_cm);
    let _ = writeln!(prompt, "- Weight: {} kg", profile.weight_kg);
    let _ = writeln!(prompt, "- Goal: {}", profile.goal);
    let _ = writeln!(prompt, "- Fitness Level: {}", profile.level);
    let _ = writeln!(prompt, "- Workout Location: {}", profile.location);
    let _ = writeln!(prompt, "- Diet Preference: {}", profile.diet);
    if let Some(history) = non_blank(profile.medical_history.as_deref()) {
        let _ = writeln!(prompt, "- Medical History: {}", history);
    }
    if let Some(stress) = non_blank(profile.stress_level.as_deref()) {
        let _ = writeln!(prompt, "- Stress Level: {}", stress);
    }

    prompt.push_str("\nIMPORTANT RULES:\n");
    prompt.push_str("1. ALWAYS return exactly **7 workout days**\n");
    prompt.push_str("2. ALWAYS return exactly **7 diet days**\n");
    prompt.push_str("3. NO missing fields\n");
    prompt.push_str("4. Output MUST BE VALID JSON ONLY (no markdown, no commentary)\n\n");
    prompt.push_str("OUTPUT FORMAT (STRICT):\n\n");
    prompt.push_str(PLAN_SCHEMA_EXAMPLE);
    prompt.push_str("\n\nEnsure JSON is CLEAN and PARSABLE.\n");

    prompt
}

/// Full conversation for a plan generation request
pub fn plan_messages(profile: &UserProfile) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(PLAN_SYSTEM_MESSAGE),
        ChatMessage::user(build_plan_prompt(profile)),
    ]
}

/// Conversation asking for one short motivation quote
pub fn motivation_messages() -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(
            "You generate very short, punchy fitness motivation quotes (max 18 words).",
        ),
        ChatMessage::user(
            "Give me one new motivational quote for fitness, discipline, or healthy habits. Do NOT add quotes or emojis.",
        ),
    ]
}

/// Strip straight and curly double quotes from a model quote
pub fn clean_quote(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '"' | '\u{201C}' | '\u{201D}'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Illustration prompt for an exercise row
pub fn exercise_image_prompt(exercise_name: &str) -> String {
    format!("Gym exercise photo: {}, proper form", exercise_name)
}

/// Illustration prompt for a meal row
pub fn meal_image_prompt(meal: &str) -> String {
    format!("Healthy food photo of {}", meal)
}

/// Image URL for a prompt on a pollinations-style endpoint
///
/// The endpoint renders the image on GET, so the URL is all the caller needs.
pub fn image_url(base_url: &str, prompt: &str, width: u32, height: u32) -> String {
    format!(
        "{}/prompt/{}?width={}&height={}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(prompt),
        width,
        height
    )
}
