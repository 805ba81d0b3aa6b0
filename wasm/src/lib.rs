//! AI Fitness Coach WASM Module
//!
//! Runs the plan pipeline pieces that live in the browser: prompt
//! building, plan parsing, PDF export, the tabbed plan viewer with
//! read-aloud, and the plan slot mirrored to `localStorage`.
//!
//! Exported functions exchange JSON strings with JavaScript.

use fitness_coach_shared::errors::StoreError;
use fitness_coach_shared::models::{Plan, StoredPlan, UserProfile};
use fitness_coach_shared::prompt::{self, FALLBACK_QUOTE};
use fitness_coach_shared::render::{ImageRequestId, PlanView, SpeechSynthesizer, Tab};
use fitness_coach_shared::store::{GenerationTicket, PlanMirror, PlanStore, PLAN_STORAGE_KEY};
use fitness_coach_shared::{parser, pdf, validation};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(module = "/js/speech.js")]
extern "C" {
    fn speak(text: &str, lang: &str, id: u32);
    fn cancel_speech();
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = localStorage, js_name = getItem, catch)]
    fn local_storage_get(key: &str) -> Result<Option<String>, JsValue>;

    #[wasm_bindgen(js_namespace = localStorage, js_name = setItem, catch)]
    fn local_storage_set(key: &str, value: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(js_namespace = localStorage, js_name = removeItem, catch)]
    fn local_storage_remove(key: &str) -> Result<(), JsValue>;
}

// ============================================================================
// Pipeline helpers (pure, testable off-browser)
// ============================================================================

fn prompt_for(profile_json: &str) -> Result<String, String> {
    let profile: UserProfile =
        serde_json::from_str(profile_json).map_err(|e| format!("Invalid profile: {}", e))?;
    validation::validate_profile(&profile).map_err(|e| e.user_message())?;
    Ok(prompt::build_plan_prompt(&profile))
}

fn parsed_plan_json(raw: &str) -> Result<String, String> {
    let plan = parser::parse_plan(raw).map_err(|e| e.to_string())?;
    serde_json::to_string(&plan).map_err(|e| e.to_string())
}

fn pdf_for(plan_json: &str) -> Result<Vec<u8>, String> {
    let plan: Plan = serde_json::from_str(plan_json).map_err(|e| format!("Invalid plan: {}", e))?;
    Ok(pdf::export_pdf(&plan))
}

fn quote_or_fallback(raw: &str) -> String {
    let quote = prompt::clean_quote(raw);
    if quote.is_empty() {
        FALLBACK_QUOTE.to_string()
    } else {
        quote
    }
}

fn js_error(message: String) -> JsValue {
    JsValue::from_str(&message)
}

/// Prompt text for a profile given as JSON; fails on invalid fields
#[wasm_bindgen]
pub fn build_prompt(profile_json: &str) -> Result<String, JsValue> {
    prompt_for(profile_json).map_err(js_error)
}

/// Parse raw model output into plan JSON
#[wasm_bindgen]
pub fn parse_plan(raw: &str) -> Result<String, JsValue> {
    parsed_plan_json(raw).map_err(js_error)
}

/// PDF bytes for a plan given as JSON
#[wasm_bindgen]
pub fn export_pdf(plan_json: &str) -> Result<Vec<u8>, JsValue> {
    pdf_for(plan_json).map_err(js_error)
}

#[wasm_bindgen]
pub fn pdf_filename() -> String {
    pdf::PDF_FILENAME.to_string()
}

/// Quote text without decoration, or the fallback line
#[wasm_bindgen]
pub fn clean_quote(raw: &str) -> String {
    quote_or_fallback(raw)
}

#[wasm_bindgen]
pub fn exercise_image_prompt(name: &str) -> String {
    prompt::exercise_image_prompt(name)
}

#[wasm_bindgen]
pub fn meal_image_prompt(meal: &str) -> String {
    prompt::meal_image_prompt(meal)
}

// ============================================================================
// Plan slot mirrored to localStorage
// ============================================================================

/// `localStorage` under the fixed plan key
struct LocalStorageMirror;

fn storage_error(err: JsValue) -> StoreError {
    StoreError::Mirror(err.as_string().unwrap_or_else(|| "localStorage failed".to_string()))
}

impl PlanMirror for LocalStorageMirror {
    fn load(&self) -> Result<Option<String>, StoreError> {
        local_storage_get(PLAN_STORAGE_KEY).map_err(storage_error)
    }

    fn save(&mut self, value: &str) -> Result<(), StoreError> {
        local_storage_set(PLAN_STORAGE_KEY, value).map_err(storage_error)
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        local_storage_remove(PLAN_STORAGE_KEY).map_err(storage_error)
    }
}

/// The browser's plan slot
#[wasm_bindgen]
pub struct PlanSlot {
    store: PlanStore<LocalStorageMirror>,
    issued: Option<GenerationTicket>,
}

#[wasm_bindgen]
impl PlanSlot {
    /// Restore from `localStorage`; a corrupt entry is discarded
    #[wasm_bindgen(constructor)]
    pub fn open() -> Result<PlanSlot, JsValue> {
        let store = match PlanStore::open(LocalStorageMirror) {
            Err(StoreError::Corrupt(_)) => PlanStore::reset(LocalStorageMirror),
            other => other,
        }
        .map_err(|e| js_error(e.to_string()))?;
        Ok(PlanSlot {
            store,
            issued: None,
        })
    }

    /// `{user, plan}` JSON, or undefined when empty
    pub fn current(&self) -> Option<String> {
        self.store
            .current()
            .and_then(|stored| serde_json::to_string(stored).ok())
    }

    /// Start a generation; the ticket must be handed back to `commit`
    pub fn begin_generation(&mut self) -> u64 {
        let ticket = self.store.begin_generation();
        self.issued = Some(ticket);
        ticket.value()
    }

    /// Store `{user, plan}` unless a newer generation or a clear happened
    pub fn commit(&mut self, ticket: u64, stored_json: &str) -> Result<bool, JsValue> {
        let stored: StoredPlan =
            serde_json::from_str(stored_json).map_err(|e| js_error(e.to_string()))?;
        // Only the latest ticket is kept; older ones are stale anyway
        let Some(issued) = self.issued.filter(|t| t.value() == ticket) else {
            return Ok(false);
        };
        match self.store.commit(issued, stored) {
            Ok(()) => Ok(true),
            Err(StoreError::StaleGeneration { .. }) => Ok(false),
            Err(e) => Err(js_error(e.to_string())),
        }
    }

    pub fn clear(&mut self) -> Result<(), JsValue> {
        self.store.set_plan(None).map_err(|e| js_error(e.to_string()))
    }
}

// ============================================================================
// Plan viewer
// ============================================================================

/// `speechSynthesis` through the JS glue
struct BrowserSpeech {
    utterance: u32,
}

impl SpeechSynthesizer for BrowserSpeech {
    fn speak(&mut self, text: &str, lang: &str) {
        self.utterance = self.utterance.wrapping_add(1);
        speak(text, lang, self.utterance);
    }

    fn cancel(&mut self) {
        cancel_speech();
    }
}

/// Tabbed plan view with read-aloud and the illustration modal
#[wasm_bindgen]
pub struct PlanViewer {
    plan: Plan,
    view: PlanView<BrowserSpeech>,
}

#[wasm_bindgen]
impl PlanViewer {
    #[wasm_bindgen(constructor)]
    pub fn new(plan_json: &str) -> Result<PlanViewer, JsValue> {
        let plan: Plan = serde_json::from_str(plan_json).map_err(|e| js_error(e.to_string()))?;
        Ok(PlanViewer {
            plan,
            view: PlanView::new(BrowserSpeech { utterance: 0 }),
        })
    }

    /// "workout" or "diet"; switching always stops speech
    pub fn select_tab(&mut self, tab: &str) -> Result<(), JsValue> {
        let tab: Tab = tab.parse().map_err(js_error)?;
        self.view.select_tab(tab);
        Ok(())
    }

    pub fn toggle_read_aloud(&mut self) {
        self.view.toggle_read_aloud(&self.plan);
    }

    /// Called from the `coach:speech-end` event
    pub fn speech_ended(&mut self, utterance: u32) {
        if utterance != self.view.speech().synth().utterance {
            return;
        }
        if let Some(tab) = self.view.speech().speaking() {
            self.view.speech_mut().speech_ended(tab);
        }
    }

    /// Open the modal; returns the request id to resolve later
    pub fn open_image(&mut self, prompt: &str) -> u64 {
        self.view.modal_mut().open(prompt).0
    }

    /// Returns false when the request was superseded or the modal closed
    pub fn resolve_image(&mut self, request: u64, image_url: Option<String>) -> bool {
        let outcome = image_url.ok_or(());
        self.view
            .modal_mut()
            .resolve(ImageRequestId(request), outcome)
    }

    pub fn close_image(&mut self) {
        self.view.modal_mut().close();
    }

    /// Everything the page shows, as JSON
    pub fn render(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.view.render(&self.plan)).map_err(|e| js_error(e.to_string()))
    }
}
