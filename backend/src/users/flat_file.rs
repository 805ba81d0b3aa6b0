//! Flat-file user store
//!
//! The whole `{ "users": [...] }` document is read and rewritten on every
//! mutation. A mutex serializes read-modify-write cycles within the
//! process; the file is replaced by rename so readers never see half a
//! write.

use super::{normalize_email, UserStore, UserStoreError};
use crate::auth::PasswordService;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fitness_coach_shared::errors::AuthError;
use fitness_coach_shared::types::Account;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Default, Serialize, Deserialize)]
struct UserDb {
    #[serde(default)]
    users: Vec<UserRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRecord {
    id: Uuid,
    name: String,
    email: String,
    /// Argon2 PHC string
    password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
}

impl From<&UserRecord> for Account {
    fn from(record: &UserRecord) -> Self {
        Account {
            id: record.id,
            name: record.name.clone(),
            email: record.email.clone(),
            created_at: record.created_at,
        }
    }
}

pub struct FlatFileUserStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FlatFileUserStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document, creating an empty one when the file is missing
    async fn read_db(&self) -> anyhow::Result<UserDb> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => serde_json::from_str(&text)
                .with_context(|| format!("User database {} is corrupt", self.path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "Creating empty user database");
                let db = UserDb::default();
                self.write_db(&db).await?;
                Ok(db)
            }
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read user database {}", self.path.display())),
        }
    }

    async fn write_db(&self, db: &UserDb) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let text = serde_json::to_string_pretty(db)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, text).await?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to write user database {}", self.path.display()))
    }
}

#[async_trait]
impl UserStore for FlatFileUserStore {
    #[instrument(skip(self, name, password))]
    async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Account, UserStoreError> {
        let email = normalize_email(email);
        let hash = PasswordService::hash(password.to_string()).await?;

        let _guard = self.lock.lock().await;
        let mut db = self.read_db().await?;
        if db.users.iter().any(|u| normalize_email(&u.email) == email) {
            return Err(AuthError::EmailTaken.into());
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email,
            password: hash,
            created_at: Some(Utc::now()),
        };
        let account = Account::from(&record);
        db.users.push(record);
        self.write_db(&db).await?;

        info!(account_id = %account.id, "Account created");
        Ok(account)
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<Account, UserStoreError> {
        let email = normalize_email(email);
        let record = {
            let _guard = self.lock.lock().await;
            self.read_db()
                .await?
                .users
                .into_iter()
                .find(|u| normalize_email(&u.email) == email)
        }
        .ok_or(AuthError::InvalidCredentials)?;

        let valid = PasswordService::verify(password.to_string(), record.password.clone())
            .await
            .unwrap_or_else(|e| {
                warn!(account_id = %record.id, "Stored password is not a valid hash: {}", e);
                false
            });
        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }
        Ok(Account::from(&record))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, UserStoreError> {
        let _guard = self.lock.lock().await;
        let db = self.read_db().await?;
        Ok(db.users.iter().find(|u| u.id == id).map(Account::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, UserStoreError> {
        let email = normalize_email(email);
        let _guard = self.lock.lock().await;
        let db = self.read_db().await?;
        Ok(db
            .users
            .iter()
            .find(|u| normalize_email(&u.email) == email)
            .map(Account::from))
    }

    async fn health_check(&self) -> Result<(), UserStoreError> {
        let _guard = self.lock.lock().await;
        self.read_db().await?;
        Ok(())
    }
}
