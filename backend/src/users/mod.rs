//! User store collaborator
//!
//! Accounts live either in a flat JSON file or in a hosted auth service.
//! Exactly one variant is live per process, chosen by
//! `user_store.backend`; the rest of the backend only sees [`UserStore`].

mod flat_file;
mod hosted;

pub use flat_file::FlatFileUserStore;
pub use hosted::HostedUserStore;

use crate::config::{UserStoreBackend, UserStoreConfig};
use async_trait::async_trait;
use fitness_coach_shared::errors::AuthError;
use fitness_coach_shared::types::Account;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// User store failures
#[derive(Error, Debug)]
pub enum UserStoreError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The store refused the request (weak password, malformed email...)
    #[error("{0}")]
    Rejected(String),

    /// The store could not be reached or answered with a server error
    #[error("User store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create an account; fails with `EmailTaken` for a known email
    async fn sign_up(&self, name: &str, email: &str, password: &str)
        -> Result<Account, UserStoreError>;

    /// Check credentials; fails with `InvalidCredentials` otherwise
    async fn sign_in(&self, email: &str, password: &str) -> Result<Account, UserStoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, UserStoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, UserStoreError>;

    /// Readiness probe
    async fn health_check(&self) -> Result<(), UserStoreError>;
}

/// Emails are compared trimmed and case-insensitively
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Build the configured user store
pub fn from_config(config: &UserStoreConfig) -> anyhow::Result<Arc<dyn UserStore>> {
    match config.backend {
        UserStoreBackend::FlatFile => Ok(Arc::new(FlatFileUserStore::new(config.path.clone()))),
        UserStoreBackend::Hosted => {
            let url = config
                .hosted_url
                .clone()
                .ok_or_else(|| anyhow::anyhow!("user_store.hosted_url is required for the hosted backend"))?;
            let key = config
                .hosted_api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("user_store.hosted_api_key is required for the hosted backend"))?;
            Ok(Arc::new(HostedUserStore::new(url, key)))
        }
    }
}
