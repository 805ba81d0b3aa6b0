//! Session tokens
//!
//! The backend issues its own access/refresh pair after the user store
//! accepts a sign-up or sign-in, whichever store is live.

use anyhow::Result;
use chrono::{Duration, Utc};
use fitness_coach_shared::types::AuthTokens;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Which half of the pair a token is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub token_type: TokenKind,
}

impl Claims {
    pub fn account_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| anyhow::anyhow!("Invalid account id in token"))
    }
}

/// Keys are derived once at startup and shared
#[derive(Clone)]
struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

/// Issues and checks session tokens
#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    access_token_expiry_secs: i64,
    refresh_token_expiry_secs: i64,
}

impl JwtService {
    pub fn new(secret: &str, access_token_expiry_secs: i64, refresh_token_expiry_secs: i64) -> Self {
        Self {
            keys: JwtKeys {
                encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
                decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            },
            access_token_expiry_secs,
            refresh_token_expiry_secs,
        }
    }

    /// Issue an access/refresh pair for an account
    pub fn issue_pair(&self, account_id: Uuid) -> Result<AuthTokens> {
        Ok(AuthTokens {
            access_token: self.generate(account_id, TokenKind::Access)?,
            refresh_token: self.generate(account_id, TokenKind::Refresh)?,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry_secs,
        })
    }

    pub fn generate(&self, account_id: Uuid, kind: TokenKind) -> Result<String> {
        let expiry_secs = match kind {
            TokenKind::Access => self.access_token_expiry_secs,
            TokenKind::Refresh => self.refresh_token_expiry_secs,
        };
        let now = Utc::now();
        let claims = Claims {
            sub: account_id.to_string(),
            exp: (now + Duration::seconds(expiry_secs)).timestamp(),
            iat: now.timestamp(),
            token_type: kind,
        };

        encode(&Header::default(), &claims, &self.keys.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to generate {:?} token: {}", kind, e))
    }

    /// Validate a token of the expected kind and return its claims
    pub fn validate(&self, token: &str, kind: TokenKind) -> Result<Claims> {
        let claims = decode::<Claims>(token, &self.keys.decoding, &Validation::default())
            .map_err(|e| anyhow::anyhow!("Invalid token: {}", e))?
            .claims;

        if claims.token_type != kind {
            anyhow::bail!("Expected a {:?} token", kind);
        }
        Ok(claims)
    }

    #[inline]
    pub fn access_token_expiry_secs(&self) -> i64 {
        self.access_token_expiry_secs
    }
}
