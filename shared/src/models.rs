//! Data models for the AI Fitness Coach application
//!
//! The plan types mirror the JSON shape the completion model is asked to
//! emit. They deserialize tolerantly: missing, `null` or wrong-typed
//! collections become empty and any JSON value is accepted as text, so a
//! plan with odd fields still loads and the presentation layer applies
//! placeholders.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Number of days a plan covers by contract
pub const DAYS_PER_WEEK: usize = 7;

/// Gender as selected on the profile form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Gender {
    #[default]
    Male,
    Female,
    Other,
}

/// Primary fitness goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FitnessGoal {
    #[default]
    #[serde(rename = "Weight Loss")]
    WeightLoss,
    #[serde(rename = "Muscle Gain")]
    MuscleGain,
    Endurance,
    #[serde(rename = "General Fitness")]
    GeneralFitness,
}

/// Self-reported training experience
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FitnessLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

/// Where the user trains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WorkoutLocation {
    #[default]
    Home,
    Gym,
    Outdoor,
}

/// Dietary preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DietPreference {
    #[default]
    Veg,
    #[serde(rename = "Non-Veg")]
    NonVeg,
    Vegan,
    Keto,
}

impl Gender {
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl FitnessGoal {
    pub fn label(&self) -> &'static str {
        match self {
            FitnessGoal::WeightLoss => "Weight Loss",
            FitnessGoal::MuscleGain => "Muscle Gain",
            FitnessGoal::Endurance => "Endurance",
            FitnessGoal::GeneralFitness => "General Fitness",
        }
    }
}

impl FitnessLevel {
    pub fn label(&self) -> &'static str {
        match self {
            FitnessLevel::Beginner => "Beginner",
            FitnessLevel::Intermediate => "Intermediate",
            FitnessLevel::Advanced => "Advanced",
        }
    }
}

impl WorkoutLocation {
    pub fn label(&self) -> &'static str {
        match self {
            WorkoutLocation::Home => "Home",
            WorkoutLocation::Gym => "Gym",
            WorkoutLocation::Outdoor => "Outdoor",
        }
    }
}

impl DietPreference {
    pub fn label(&self) -> &'static str {
        match self {
            DietPreference::Veg => "Veg",
            DietPreference::NonVeg => "Non-Veg",
            DietPreference::Vegan => "Vegan",
            DietPreference::Keto => "Keto",
        }
    }
}

macro_rules! display_via_label {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }
        )*
    };
}

display_via_label!(Gender, FitnessGoal, FitnessLevel, WorkoutLocation, DietPreference);

/// Physical profile submitted for a plan generation request
///
/// Immutable once submitted. Free-text fields are passed to the prompt
/// verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub height_cm: u32,
    pub weight_kg: u32,
    pub goal: FitnessGoal,
    pub level: FitnessLevel,
    pub location: WorkoutLocation,
    pub diet: DietPreference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress_level: Option<String>,
}

impl Default for UserProfile {
    /// The values the profile form starts with
    fn default() -> Self {
        Self {
            name: String::new(),
            age: 20,
            gender: Gender::Male,
            height_cm: 170,
            weight_kg: 70,
            goal: FitnessGoal::WeightLoss,
            level: FitnessLevel::Beginner,
            location: WorkoutLocation::Home,
            diet: DietPreference::Veg,
            medical_history: None,
            stress_level: None,
        }
    }
}

/// Text for any JSON value a model might put where a string belongs
///
/// Arrays are joined with `", "` and objects keep their JSON text, so a
/// meal written as `["Nuts", "Fruit"]` still reads as one line.
fn value_text(value: serde_json::Value) -> Option<String> {
    use serde_json::Value;

    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(value_text)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        object @ Value::Object(_) => Some(object.to_string()),
    }
}

/// Accepts any JSON value for a text field.
///
/// Models regularly emit `"sets": 3` instead of `"sets": "3"`.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<serde_json::Value>::deserialize(deserializer)?.and_then(value_text))
}

/// A list of text entries; scalars become text, nulls are skipped and a
/// lone string counts as a one-entry list.
fn lenient_text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items.into_iter().filter_map(value_text).collect(),
        Some(Value::String(s)) => vec![s],
        _ => Vec::new(),
    })
}

/// A list of records; `null` or a non-array value is an empty list and
/// entries that are not records are dropped.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    use serde_json::Value;

    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Single exercise prescription
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub sets: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub reps: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub rest: Option<String>,
}

/// One day of the workout plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDay {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub exercises: Vec<Exercise>,
}

/// The four canonical meal slots of a diet day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snacks,
}

impl MealSlot {
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Dinner,
        MealSlot::Snacks,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Breakfast",
            MealSlot::Lunch => "Lunch",
            MealSlot::Dinner => "Dinner",
            MealSlot::Snacks => "Snacks",
        }
    }
}

/// One day of the diet plan
///
/// Field names are capitalized on the wire, matching the prompt's schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DietDay {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    #[serde(rename = "Breakfast", default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub breakfast: Option<String>,
    #[serde(rename = "Lunch", default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub lunch: Option<String>,
    #[serde(rename = "Dinner", default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub dinner: Option<String>,
    #[serde(rename = "Snacks", default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub snacks: Option<String>,
}

impl DietDay {
    /// Text for a meal slot, treating blank text as absent
    pub fn meal(&self, slot: MealSlot) -> Option<&str> {
        let text = match slot {
            MealSlot::Breakfast => self.breakfast.as_deref(),
            MealSlot::Lunch => self.lunch.as_deref(),
            MealSlot::Dinner => self.dinner.as_deref(),
            MealSlot::Snacks => self.snacks.as_deref(),
        };
        text.filter(|t| !t.trim().is_empty())
    }
}

/// A generated 7-day workout and diet plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default, deserialize_with = "lenient_list")]
    pub workout: Vec<WorkoutDay>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub diet: Vec<DietDay>,
    #[serde(default, deserialize_with = "lenient_text_list")]
    pub tips: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text_list")]
    pub motivation: Vec<String>,
}

/// How far a plan is from the 7/7 contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanShape {
    pub workout_days: usize,
    pub diet_days: usize,
    pub is_complete_week: bool,
}

impl Plan {
    /// Report the day counts without enforcing them
    pub fn shape(&self) -> PlanShape {
        PlanShape {
            workout_days: self.workout.len(),
            diet_days: self.diet.len(),
            is_complete_week: self.workout.len() == DAYS_PER_WEEK
                && self.diet.len() == DAYS_PER_WEEK,
        }
    }
}

/// The persisted `{user, plan}` pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPlan {
    pub user: UserProfile,
    pub plan: Plan,
}
