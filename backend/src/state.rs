//! Application state management
//!
//! Shared resources handed to every handler through Axum's state
//! extraction. Everything is behind an `Arc`, so cloning is cheap.

use crate::auth::JwtService;
use crate::config::AppConfig;
use crate::llm::{CompletionClient, HttpCompletionClient};
use crate::storage::PlanRegistry;
use crate::users::{self, UserStore};
use anyhow::Result;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// JWT service with keys derived once at startup
    pub jwt: JwtService,
    pub users: Arc<dyn UserStore>,
    pub completion: Arc<dyn CompletionClient>,
    pub plans: Arc<PlanRegistry>,
}

impl AppState {
    /// Build every collaborator from configuration
    pub fn new(config: AppConfig) -> Result<Self> {
        let users = users::from_config(&config.user_store)?;
        let completion: Arc<dyn CompletionClient> =
            Arc::new(HttpCompletionClient::new(&config.completion));
        Ok(Self::from_parts(config, users, completion))
    }

    /// Assemble state around explicit collaborators
    pub fn from_parts(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        completion: Arc<dyn CompletionClient>,
    ) -> Self {
        let jwt = JwtService::new(
            &config.jwt.secret,
            config.jwt.access_token_expiry_secs,
            config.jwt.refresh_token_expiry_secs,
        );
        let plans = Arc::new(PlanRegistry::new(config.storage.plan_dir.clone()));

        Self {
            config: Arc::new(config),
            jwt,
            users,
            completion,
            plans,
        }
    }

    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    #[inline]
    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    #[inline]
    pub fn completion(&self) -> &dyn CompletionClient {
        self.completion.as_ref()
    }

    #[inline]
    pub fn plans(&self) -> &PlanRegistry {
        &self.plans
    }
}
