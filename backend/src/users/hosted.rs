//! Hosted user store
//!
//! Talks to a Supabase-style service: GoTrue endpoints under `/auth/v1`
//! for credentials and a PostgREST `users` table under `/rest/v1` for the
//! display name. Every request carries the project key both as `apikey`
//! and as bearer token.

use super::{normalize_email, UserStore, UserStoreError};
use async_trait::async_trait;
use fitness_coach_shared::errors::AuthError;
use fitness_coach_shared::types::Account;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, instrument};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct HostedUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Sign-up answers with a bare user, or with a session wrapping it
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session { user: HostedUser },
    User(HostedUser),
}

impl SignUpResponse {
    fn into_user(self) -> HostedUser {
        match self {
            SignUpResponse::Session { user } | SignUpResponse::User(user) => user,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    user: HostedUser,
}

#[derive(Debug, Serialize, Deserialize)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
}

#[derive(Debug, Default, Deserialize)]
struct HostedErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
}

impl HostedErrorBody {
    fn text(self) -> Option<String> {
        self.msg.or(self.error_description).or(self.message)
    }
}

pub struct HostedUserStore {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl HostedUserStore {
    pub fn new(base_url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let key = self.api_key.expose_secret();
        builder.header("apikey", key.as_str()).bearer_auth(key)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, UserStoreError> {
        self.authorized(builder).send().await.map_err(|e| {
            error!("Failed to reach user store: {}", e);
            UserStoreError::Unavailable(e.to_string())
        })
    }

    /// Turn a non-success response into a store error
    async fn failure(response: Response) -> UserStoreError {
        let status = response.status();
        let body: HostedErrorBody = response.json().await.unwrap_or_default();
        let message = body
            .text()
            .unwrap_or_else(|| format!("User store answered {}", status));

        if status.is_server_error() {
            error!(status = status.as_u16(), "User store failed: {}", message);
            UserStoreError::Unavailable(message)
        } else if message.to_lowercase().contains("already registered") {
            AuthError::EmailTaken.into()
        } else {
            UserStoreError::Rejected(message)
        }
    }

    async fn find_row(&self, filter: &str) -> Result<Option<UserRow>, UserStoreError> {
        let url = format!("{}/rest/v1/users?{}&select=id,name,email", self.base_url, filter);
        let response = self.send(self.client.get(url)).await?;
        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }
        let rows: Vec<UserRow> = response
            .json()
            .await
            .map_err(|e| UserStoreError::Unavailable(format!("Unexpected users response: {}", e)))?;
        Ok(rows.into_iter().next())
    }
}

fn account_from_row(row: UserRow) -> Account {
    Account {
        id: row.id,
        name: row.name,
        email: row.email,
        created_at: None,
    }
}

#[async_trait]
impl UserStore for HostedUserStore {
    #[instrument(skip(self, name, password))]
    async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Account, UserStoreError> {
        let email = normalize_email(email);
        let response = self
            .send(
                self.client
                    .post(format!("{}/auth/v1/signup", self.base_url))
                    .json(&json!({ "email": email, "password": password })),
            )
            .await?;
        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }
        let user = response
            .json::<SignUpResponse>()
            .await
            .map_err(|e| UserStoreError::Unavailable(format!("Unexpected sign-up response: {}", e)))?
            .into_user();

        let row = UserRow {
            id: user.id,
            name: name.trim().to_string(),
            email: user.email.clone().unwrap_or_else(|| email.clone()),
        };
        let response = self
            .send(
                self.client
                    .post(format!("{}/rest/v1/users", self.base_url))
                    .header("Prefer", "return=minimal")
                    .json(&row),
            )
            .await?;
        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }

        info!(account_id = %user.id, "Account created");
        let mut account = account_from_row(row);
        account.created_at = user.created_at;
        Ok(account)
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<Account, UserStoreError> {
        let email = normalize_email(email);
        let response = self
            .send(
                self.client
                    .post(format!("{}/auth/v1/token?grant_type=password", self.base_url))
                    .json(&json!({ "email": email, "password": password })),
            )
            .await?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidCredentials.into());
        }
        if !status.is_success() {
            return Err(Self::failure(response).await);
        }
        let user = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| UserStoreError::Unavailable(format!("Unexpected token response: {}", e)))?
            .user;

        // Accounts created outside this app may lack a profile row
        let name = self
            .find_row(&format!("id=eq.{}", user.id))
            .await?
            .map(|row| row.name)
            .unwrap_or_default();

        Ok(Account {
            id: user.id,
            name,
            email: user.email.unwrap_or(email),
            created_at: user.created_at,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, UserStoreError> {
        Ok(self
            .find_row(&format!("id=eq.{}", id))
            .await?
            .map(account_from_row))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, UserStoreError> {
        let filter = format!("email=eq.{}", urlencoding::encode(&normalize_email(email)));
        Ok(self.find_row(&filter).await?.map(account_from_row))
    }

    async fn health_check(&self) -> Result<(), UserStoreError> {
        let response = self
            .send(self.client.get(format!("{}/auth/v1/health", self.base_url)))
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(UserStoreError::Unavailable(format!(
                "Health check answered {}",
                response.status()
            )))
        }
    }
}
