//! Plan Renderer view model
//!
//! Everything the plan page shows is derived here from a [`Plan`], so the
//! HTML/DOM layer only draws rows. Side effects (speech, image modal) are
//! explicit state machines owned by [`PlanView`].

use crate::models::{MealSlot, Plan};
use crate::prompt::{exercise_image_prompt, meal_image_prompt, ERROR_PLACEHOLDER, LOADING_PLACEHOLDER};
use serde::{Deserialize, Serialize};

/// Placeholder for absent text
pub const PLACEHOLDER: &str = "—";

/// Placeholder for absent snacks in narration and export
pub const NO_SNACKS: &str = "None";

/// Narration language
pub const SPEECH_LANG: &str = "en-US";

/// The two mutually exclusive views of a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Workout,
    Diet,
}

impl std::str::FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "workout" => Ok(Tab::Workout),
            "diet" => Ok(Tab::Diet),
            other => Err(format!("Unknown view '{}'. Must be one of: workout, diet", other)),
        }
    }
}

/// One line of a day block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedRow {
    pub text: String,
    /// Prompt for the "illustrate" action
    pub illustrate_prompt: String,
}

/// One day of the active view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBlock {
    pub title: String,
    pub rows: Vec<RenderedRow>,
}

/// Snapshot of everything the plan page shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedView {
    pub tab: Tab,
    pub is_speaking: bool,
    pub days: Vec<DayBlock>,
    pub tips: Vec<String>,
    pub modal: ModalState,
}

fn text_or<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(placeholder)
}

/// Day blocks of the workout view
pub fn render_workout(plan: &Plan) -> Vec<DayBlock> {
    plan.workout
        .iter()
        .map(|day| DayBlock {
            title: format!(
                "{} — {}",
                text_or(day.day.as_deref(), PLACEHOLDER),
                text_or(day.focus.as_deref(), PLACEHOLDER)
            ),
            rows: day
                .exercises
                .iter()
                .map(|ex| {
                    let name = text_or(ex.name.as_deref(), PLACEHOLDER);
                    RenderedRow {
                        text: format!(
                            "{} — {}×{} (Rest {})",
                            name,
                            text_or(ex.sets.as_deref(), PLACEHOLDER),
                            text_or(ex.reps.as_deref(), PLACEHOLDER),
                            text_or(ex.rest.as_deref(), PLACEHOLDER)
                        ),
                        illustrate_prompt: exercise_image_prompt(name),
                    }
                })
                .collect(),
        })
        .collect()
}

/// Day blocks of the diet view; always the four canonical slots per day
pub fn render_diet(plan: &Plan) -> Vec<DayBlock> {
    plan.diet
        .iter()
        .map(|day| DayBlock {
            title: text_or(day.day.as_deref(), PLACEHOLDER).to_string(),
            rows: MealSlot::ALL
                .iter()
                .map(|slot| {
                    let meal = day.meal(*slot).unwrap_or(PLACEHOLDER);
                    RenderedRow {
                        text: format!("{}: {}", slot.label(), meal),
                        illustrate_prompt: meal_image_prompt(meal),
                    }
                })
                .collect(),
        })
        .collect()
}

/// Tips list, skipping blank entries
pub fn render_tips(plan: &Plan) -> Vec<String> {
    plan.tips
        .iter()
        .filter(|t| !t.trim().is_empty())
        .cloned()
        .collect()
}

/// Flattened narration of the workout view
pub fn workout_narration(plan: &Plan) -> String {
    plan.workout
        .iter()
        .map(|day| {
            let exercises = day
                .exercises
                .iter()
                .map(|ex| {
                    format!(
                        "{}. {} sets of {}. Rest {}.",
                        text_or(ex.name.as_deref(), PLACEHOLDER),
                        text_or(ex.sets.as_deref(), PLACEHOLDER),
                        text_or(ex.reps.as_deref(), PLACEHOLDER),
                        text_or(ex.rest.as_deref(), PLACEHOLDER)
                    )
                })
                .collect::<Vec<_>>()
                .join(" ");
            format!(
                "{} - {}. {}",
                text_or(day.day.as_deref(), PLACEHOLDER),
                text_or(day.focus.as_deref(), PLACEHOLDER),
                exercises
            )
            .trim_end()
            .to_string()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Flattened narration of the diet view
pub fn diet_narration(plan: &Plan) -> String {
    plan.diet
        .iter()
        .map(|day| {
            format!(
                "{}: Breakfast {}. Lunch {}. Dinner {}. Snacks {}.",
                text_or(day.day.as_deref(), PLACEHOLDER),
                day.meal(MealSlot::Breakfast).unwrap_or(PLACEHOLDER),
                day.meal(MealSlot::Lunch).unwrap_or(PLACEHOLDER),
                day.meal(MealSlot::Dinner).unwrap_or(PLACEHOLDER),
                day.meal(MealSlot::Snacks).unwrap_or(NO_SNACKS)
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Narration for a view
pub fn narration(plan: &Plan, tab: Tab) -> String {
    match tab {
        Tab::Workout => workout_narration(plan),
        Tab::Diet => diet_narration(plan),
    }
}

// ============================================================================
// Speech
// ============================================================================

/// Text-to-speech collaborator
pub trait SpeechSynthesizer {
    fn speak(&mut self, text: &str, lang: &str);
    fn cancel(&mut self);
}

/// Tracks which view, if any, is being read aloud
///
/// A single slot means at most one view can be speaking; every start
/// cancels the previous utterance first.
#[derive(Debug)]
pub struct SpeechController<S: SpeechSynthesizer> {
    synth: S,
    speaking: Option<Tab>,
}

impl<S: SpeechSynthesizer> SpeechController<S> {
    pub fn new(synth: S) -> Self {
        Self {
            synth,
            speaking: None,
        }
    }

    /// Read a view aloud, cancelling whatever was playing
    pub fn start(&mut self, plan: &Plan, tab: Tab) {
        self.synth.cancel();
        self.speaking = None;

        let text = narration(plan, tab);
        if text.is_empty() {
            return;
        }
        self.synth.speak(&text, SPEECH_LANG);
        self.speaking = Some(tab);
    }

    /// Cancel any utterance and reset both flags
    pub fn stop(&mut self) {
        self.synth.cancel();
        self.speaking = None;
    }

    /// The synthesizer finished an utterance for `tab`
    pub fn speech_ended(&mut self, tab: Tab) {
        if self.speaking == Some(tab) {
            self.speaking = None;
        }
    }

    pub fn is_speaking(&self, tab: Tab) -> bool {
        self.speaking == Some(tab)
    }

    pub fn speaking(&self) -> Option<Tab> {
        self.speaking
    }

    pub fn synth(&self) -> &S {
        &self.synth
    }
}

// ============================================================================
// Image modal
// ============================================================================

/// Identifies one "illustrate" click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRequestId(pub u64);

/// State of the illustration modal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ModalState {
    #[default]
    Closed,
    Loading {
        request: ImageRequestId,
        prompt: String,
        placeholder: String,
    },
    Shown {
        prompt: String,
        image_url: String,
    },
    Failed {
        prompt: String,
        placeholder: String,
    },
}

/// Illustration modal: each open starts a fresh request that resolves once
#[derive(Debug, Default)]
pub struct ImageModal {
    state: ModalState,
    next_request: u64,
}

impl ImageModal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the modal in the loading state for a new request
    pub fn open(&mut self, prompt: impl Into<String>) -> ImageRequestId {
        self.next_request += 1;
        let request = ImageRequestId(self.next_request);
        self.state = ModalState::Loading {
            request,
            prompt: prompt.into(),
            placeholder: LOADING_PLACEHOLDER.to_string(),
        };
        request
    }

    /// Apply the outcome of a request
    ///
    /// Returns false, changing nothing, when the request is not the one
    /// currently loading (already resolved, superseded, or modal closed).
    pub fn resolve<E>(&mut self, request: ImageRequestId, outcome: Result<String, E>) -> bool {
        let prompt = match &self.state {
            ModalState::Loading {
                request: current,
                prompt,
                ..
            } if *current == request => prompt.clone(),
            _ => return false,
        };

        self.state = match outcome {
            Ok(image_url) => ModalState::Shown { prompt, image_url },
            Err(_) => ModalState::Failed {
                prompt,
                placeholder: ERROR_PLACEHOLDER.to_string(),
            },
        };
        true
    }

    pub fn close(&mut self) {
        self.state = ModalState::Closed;
    }

    pub fn state(&self) -> &ModalState {
        &self.state
    }

    /// Image to display right now, if the modal is open
    pub fn displayed_image(&self) -> Option<&str> {
        match &self.state {
            ModalState::Closed => None,
            ModalState::Loading { placeholder, .. } | ModalState::Failed { placeholder, .. } => {
                Some(placeholder)
            }
            ModalState::Shown { image_url, .. } => Some(image_url),
        }
    }
}

// ============================================================================
// Plan view
// ============================================================================

/// Tabbed plan view with read-aloud and illustrate affordances
pub struct PlanView<S: SpeechSynthesizer> {
    tab: Tab,
    speech: SpeechController<S>,
    modal: ImageModal,
}

impl<S: SpeechSynthesizer> PlanView<S> {
    pub fn new(synth: S) -> Self {
        Self {
            tab: Tab::default(),
            speech: SpeechController::new(synth),
            modal: ImageModal::new(),
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    /// Switch view; always cancels speech, even when re-selecting
    pub fn select_tab(&mut self, tab: Tab) {
        self.speech.stop();
        self.tab = tab;
    }

    /// Start reading the active view, or stop if it is already speaking
    pub fn toggle_read_aloud(&mut self, plan: &Plan) {
        if self.speech.is_speaking(self.tab) {
            self.speech.stop();
        } else {
            self.speech.start(plan, self.tab);
        }
    }

    pub fn stop_speech(&mut self) {
        self.speech.stop();
    }

    pub fn speech(&self) -> &SpeechController<S> {
        &self.speech
    }

    pub fn speech_mut(&mut self) -> &mut SpeechController<S> {
        &mut self.speech
    }

    pub fn modal(&self) -> &ImageModal {
        &self.modal
    }

    pub fn modal_mut(&mut self) -> &mut ImageModal {
        &mut self.modal
    }

    /// Rows of the active view
    pub fn render(&self, plan: &Plan) -> RenderedView {
        let days = match self.tab {
            Tab::Workout => render_workout(plan),
            Tab::Diet => render_diet(plan),
        };
        RenderedView {
            tab: self.tab,
            is_speaking: self.speech.is_speaking(self.tab),
            days,
            tips: render_tips(plan),
            modal: self.modal.state().clone(),
        }
    }
}
