//! Configuration management for the AI Fitness Coach backend
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: COACH__)

use anyhow::Result;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Environment variable consulted when `completion.api_key` is unset
pub const COMPLETION_API_KEY_ENV: &str = "GROQ_API_KEY";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub completion: CompletionConfig,
    pub images: ImageConfig,
    pub user_store: UserStoreConfig,
    pub storage: StorageConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Whole-request timeout; generation waits on a slow model
    pub request_timeout_secs: u64,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_secs: i64,
    pub refresh_token_expiry_secs: i64,
}

/// Chat completion endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    pub base_url: String,
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Image generation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    pub base_url: String,
    pub width: u32,
    pub height: u32,
    pub placeholder: String,
    pub error_placeholder: String,
}

/// Which user store is live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStoreBackend {
    FlatFile,
    Hosted,
}

/// User store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStoreConfig {
    pub backend: UserStoreBackend,
    /// Flat file location
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosted_url: Option<String>,
    #[serde(default, skip_serializing)]
    pub hosted_api_key: Option<SecretString>,
}

/// Plan persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// One JSON file per user holding the last generated plan
    pub plan_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                request_timeout_secs: 120,
            },
            jwt: JwtConfig {
                secret: "development-secret-change-in-production".to_string(),
                access_token_expiry_secs: 3600,    // 1 hour
                refresh_token_expiry_secs: 604800, // 7 days
            },
            completion: CompletionConfig {
                base_url: "https://api.groq.com/openai/v1".to_string(),
                api_key: None,
                model: "llama-3.3-70b-versatile".to_string(),
                temperature: 0.7,
                max_tokens: 2000,
            },
            images: ImageConfig {
                base_url: "https://image.pollinations.ai".to_string(),
                width: 1024,
                height: 1024,
                placeholder: fitness_coach_shared::prompt::LOADING_PLACEHOLDER.to_string(),
                error_placeholder: fitness_coach_shared::prompt::ERROR_PLACEHOLDER.to_string(),
            },
            user_store: UserStoreConfig {
                backend: UserStoreBackend::FlatFile,
                path: PathBuf::from("backend/db.json"),
                hosted_url: None,
                hosted_api_key: None,
            },
            storage: StorageConfig {
                plan_dir: PathBuf::from("data/plans"),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with COACH__ prefix
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let config = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name(&config_file).required(false))
            // e.g., COACH__SERVER__PORT=9000 sets server.port
            .add_source(config::Environment::with_prefix("COACH").separator("__"))
            .build()?;

        let mut loaded: AppConfig = config.try_deserialize()?;
        if loaded.completion.api_key.is_none() {
            loaded.completion.api_key = env::var(COMPLETION_API_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty())
                .map(SecretString::new);
        }
        Ok(loaded)
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }
}
