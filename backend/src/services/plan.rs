//! Plan generation pipeline
//!
//! validate profile -> build prompt -> one completion -> parse -> commit.
//! Any failure aborts before the plan store is touched, so the previous
//! plan (if any) survives. A generation overtaken by a newer request or a
//! clear is dropped with a conflict.

use crate::error::ApiError;
use crate::state::AppState;
use fitness_coach_shared::models::{StoredPlan, UserProfile};
use fitness_coach_shared::parser::parse_plan;
use fitness_coach_shared::prompt::plan_messages;
use fitness_coach_shared::types::GeneratePlanResponse;
use fitness_coach_shared::validation::validate_profile;
use std::time::Instant;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub struct PlanService;

impl PlanService {
    #[instrument(skip_all, fields(account_id = %account_id))]
    pub async fn generate(
        state: &AppState,
        account_id: Uuid,
        mut profile: UserProfile,
    ) -> Result<GeneratePlanResponse, ApiError> {
        if profile.name.trim().is_empty() {
            if let Some(account) = state.users().find_by_id(account_id).await? {
                profile.name = account.name;
            }
        }
        validate_profile(&profile)?;

        let ticket = state.plans().begin_generation(account_id).await?;
        let started = Instant::now();

        let raw = state.completion().complete(&plan_messages(&profile)).await?;
        let plan = parse_plan(&raw)?;
        let shape = plan.shape();
        if !shape.is_complete_week {
            warn!(
                workout_days = shape.workout_days,
                diet_days = shape.diet_days,
                "Plan does not cover a full week"
            );
        }

        state.plans().commit(
            account_id,
            ticket,
            StoredPlan {
                user: profile,
                plan: plan.clone(),
            },
        )
        .await?;

        metrics::histogram!("plan_generation_seconds").record(started.elapsed().as_secs_f64());
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Plan generated"
        );
        Ok(GeneratePlanResponse { plan, shape })
    }

    pub async fn current(state: &AppState, account_id: Uuid) -> Result<StoredPlan, ApiError> {
        state
            .plans()
            .current(account_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("No plan generated yet".to_string()))
    }

    /// Drop the current plan; in-flight generations for the account go stale
    pub async fn clear(state: &AppState, account_id: Uuid) -> Result<(), ApiError> {
        state.plans().clear(account_id).await?;
        info!(account_id = %account_id, "Plan cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::llm::CompletionClient;
    use crate::users::{FlatFileUserStore, UserStore};
    use async_trait::async_trait;
    use fitness_coach_shared::errors::PlanError;
    use fitness_coach_shared::prompt::ChatMessage;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;
    use tokio::sync::Notify;

    const WEEK: &str = r#"```json
{"workout":[{"day":"Monday","focus":"Push","exercises":[{"name":"Push-up","sets":3,"reps":"12","rest":"60s"}]}],
 "diet":[{"day":"Monday","Breakfast":"Oats","Lunch":"Rice","Dinner":"Dal"}],
 "tips":["Sleep 8 hours"],"motivation":["Keep going"]}
```"#;

    /// Replies with canned text and records every prompt
    struct ScriptedCompletion {
        reply: Result<String, u16>,
        prompts: Mutex<Vec<String>>,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedCompletion {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
                gate: None,
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                prompts: Mutex::new(Vec::new()),
                gate: None,
            }
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedCompletion {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String, PlanError> {
            if let Some(last) = messages.last() {
                self.prompts.lock().unwrap().push(last.content.clone());
            }
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(PlanError::Upstream {
                    status: *status,
                    body: "boom".to_string(),
                }),
            }
        }
    }

    fn state_with(dir: &TempDir, completion: Arc<ScriptedCompletion>) -> AppState {
        let mut config = AppConfig::default();
        config.storage.plan_dir = dir.path().join("plans");
        let users: Arc<dyn UserStore> =
            Arc::new(FlatFileUserStore::new(dir.path().join("db.json")));
        AppState::from_parts(config, users, completion)
    }

    fn profile() -> UserProfile {
        UserProfile {
            name: "Sam".to_string(),
            age: 30,
            ..UserProfile::default()
        }
    }

    #[tokio::test]
    async fn test_generate_commits_plan() {
        let dir = TempDir::new().unwrap();
        let completion = Arc::new(ScriptedCompletion::ok(WEEK));
        let state = state_with(&dir, completion.clone());
        let account = Uuid::new_v4();

        let response = PlanService::generate(&state, account, profile()).await.unwrap();
        assert_eq!(response.plan.workout.len(), 1);
        assert!(!response.shape.is_complete_week);

        let stored = PlanService::current(&state, account).await.unwrap();
        assert_eq!(stored.user.name, "Sam");
        assert_eq!(stored.plan, response.plan);
        assert!(completion.prompts.lock().unwrap()[0].contains("Age: 30"));
    }

    #[tokio::test]
    async fn test_invalid_profile_never_calls_model() {
        let dir = TempDir::new().unwrap();
        let completion = Arc::new(ScriptedCompletion::ok(WEEK));
        let state = state_with(&dir, completion.clone());

        let mut bad = profile();
        bad.age = 0;
        let err = PlanService::generate(&state, Uuid::new_v4(), bad)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));
        assert!(completion.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failures_keep_previous_plan() {
        let dir = TempDir::new().unwrap();
        let account = Uuid::new_v4();

        let good = state_with(&dir, Arc::new(ScriptedCompletion::ok(WEEK)));
        PlanService::generate(&good, account, profile()).await.unwrap();

        let upstream = state_with(&dir, Arc::new(ScriptedCompletion::failing(500)));
        assert!(matches!(
            PlanService::generate(&upstream, account, profile()).await,
            Err(ApiError::Upstream(_))
        ));

        let garbage = state_with(&dir, Arc::new(ScriptedCompletion::ok("I cannot help")));
        assert!(matches!(
            PlanService::generate(&garbage, account, profile()).await,
            Err(ApiError::Upstream(_))
        ));

        let kept = PlanService::current(&garbage, account).await.unwrap();
        assert_eq!(kept.plan.tips, vec!["Sleep 8 hours".to_string()]);
    }

    #[tokio::test]
    async fn test_blank_name_is_taken_from_account() {
        let dir = TempDir::new().unwrap();
        let state = state_with(&dir, Arc::new(ScriptedCompletion::ok(WEEK)));
        let account = state
            .users()
            .sign_up("Priya", "priya@example.com", "password123")
            .await
            .unwrap();

        let mut anonymous = profile();
        anonymous.name = "  ".to_string();
        PlanService::generate(&state, account.id, anonymous).await.unwrap();

        assert_eq!(PlanService::current(&state, account.id).await.unwrap().user.name, "Priya");
    }

    #[tokio::test]
    async fn test_clear_during_generation_drops_result() {
        let dir = TempDir::new().unwrap();
        let gate = Arc::new(Notify::new());
        let completion = Arc::new(ScriptedCompletion {
            gate: Some(gate.clone()),
            ..ScriptedCompletion::ok(WEEK)
        });
        let state = state_with(&dir, completion.clone());
        let account = Uuid::new_v4();

        let task = {
            let state = state.clone();
            tokio::spawn(async move { PlanService::generate(&state, account, profile()).await })
        };
        while completion.prompts.lock().unwrap().is_empty() {
            tokio::task::yield_now().await;
        }

        PlanService::clear(&state, account).await.unwrap();
        gate.notify_one();

        let result = task.await.unwrap();
        assert!(matches!(result, Err(ApiError::Conflict(_))));
        assert!(matches!(
            PlanService::current(&state, account).await,
            Err(ApiError::NotFound(_))
        ));
    }
}
