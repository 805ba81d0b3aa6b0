//! Input validation functions
//!
//! Profile checks run before any network call so an incomplete form never
//! reaches the completion endpoint.

use crate::models::UserProfile;
use once_cell::sync::Lazy;
use regex_lite::Regex;

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Longest accepted name
pub const MAX_NAME_LEN: usize = 100;

/// Longest accepted free-text note (medical history, stress level)
pub const MAX_NOTE_LEN: usize = 1000;

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > 255 {
        return Err("Email too long".to_string());
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    if password.len() > 128 {
        return Err("Password too long".to_string());
    }
    Ok(())
}

/// Validate a display name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(format!("Name must be at most {} characters", MAX_NAME_LEN));
    }
    Ok(())
}

/// Validate age in years
pub fn validate_age(age: u32) -> Result<(), String> {
    if age == 0 {
        return Err("Age is required".to_string());
    }
    if age > 120 {
        return Err("Age must be at most 120".to_string());
    }
    Ok(())
}

/// Validate height value (in cm)
/// Valid range: 50-300 cm
pub fn validate_height_cm(height_cm: u32) -> Result<(), String> {
    if height_cm < 50 {
        return Err("Height must be at least 50 cm".to_string());
    }
    if height_cm > 300 {
        return Err("Height must be at most 300 cm".to_string());
    }
    Ok(())
}

/// Validate weight value (in kg)
pub fn validate_weight_kg(weight_kg: u32) -> Result<(), String> {
    if weight_kg < 20 {
        return Err("Weight must be at least 20 kg".to_string());
    }
    if weight_kg > 500 {
        return Err("Weight must be at most 500 kg".to_string());
    }
    Ok(())
}

/// Validate an optional free-text note
pub fn validate_note(note: Option<&str>) -> Result<(), String> {
    match note {
        Some(text) if text.chars().count() > MAX_NOTE_LEN => Err(format!(
            "Must be at most {} characters",
            MAX_NOTE_LEN
        )),
        _ => Ok(()),
    }
}

/// Validate a submitted profile, stopping at the first failing field
pub fn validate_profile(profile: &UserProfile) -> Result<(), ValidationError> {
    let checks = [
        ("name", validate_name(&profile.name)),
        ("age", validate_age(profile.age)),
        ("heightCm", validate_height_cm(profile.height_cm)),
        ("weightKg", validate_weight_kg(profile.weight_kg)),
        ("medicalHistory", validate_note(profile.medical_history.as_deref())),
        ("stressLevel", validate_note(profile.stress_level.as_deref())),
    ];

    for (field, result) in checks {
        if let Err(message) = result {
            return Err(ValidationError::new(field, &message));
        }
    }
    Ok(())
}

// ============================================================================
// User-Friendly Field Labels
// ============================================================================

/// Map wire field names to the labels shown on the profile form
pub fn get_field_display_label(field_name: &str) -> &str {
    match field_name {
        "name" => "Name",
        "age" => "Age",
        "gender" => "Gender",
        "heightCm" | "height_cm" => "Height",
        "weightKg" | "weight_kg" => "Weight",
        "goal" => "Goal",
        "level" => "Fitness Level",
        "location" => "Workout Location",
        "diet" => "Diet Preference",
        "medicalHistory" => "Medical History",
        "stressLevel" => "Stress Level",
        "email" => "Email",
        "password" => "Password",
        _ => field_name,
    }
}

/// Validation error with field context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub display_label: String,
}

impl ValidationError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
            display_label: get_field_display_label(field).to_string(),
        }
    }

    /// Format as user-friendly error message
    pub fn user_message(&self) -> String {
        format!("{}: {}", self.display_label, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn valid_profile() -> UserProfile {
        UserProfile {
            name: "Sam".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("user.name@domain.co.uk").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("no@dot").is_err());
        assert!(validate_email("spaces in@email.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_default_form_with_name_is_valid() {
        assert!(validate_profile(&valid_profile()).is_ok());
    }

    #[rstest]
    #[case::blank_name(UserProfile { name: "  ".into(), ..valid_profile() }, "name")]
    #[case::zero_age(UserProfile { age: 0, ..valid_profile() }, "age")]
    #[case::short(UserProfile { height_cm: 20, ..valid_profile() }, "heightCm")]
    #[case::heavy(UserProfile { weight_kg: 900, ..valid_profile() }, "weightKg")]
    #[case::long_history(
        UserProfile { medical_history: Some("x".repeat(MAX_NOTE_LEN + 1)), ..valid_profile() },
        "medicalHistory"
    )]
    fn test_invalid_profile_reports_field(#[case] profile: UserProfile, #[case] field: &str) {
        let err = validate_profile(&profile).unwrap_err();
        assert_eq!(err.field, field);
    }

    #[test]
    fn test_validation_error() {
        let err = ValidationError::new("heightCm", "must be at least 50 cm");
        assert_eq!(err.display_label, "Height");
        assert_eq!(err.user_message(), "Height: must be at least 50 cm");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_valid_height_range(height in 50u32..=300) {
            prop_assert!(validate_height_cm(height).is_ok());
        }

        #[test]
        fn prop_invalid_weight_above_max(weight in 501u32..2000) {
            prop_assert!(validate_weight_kg(weight).is_err());
        }

        #[test]
        fn prop_valid_age_range(age in 1u32..=120) {
            prop_assert!(validate_age(age).is_ok());
        }
    }
}
