//! Password hashing for the flat-file user store
//!
//! Argon2 is CPU-bound, so both operations run on the blocking pool.

use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

pub struct PasswordService;

impl PasswordService {
    fn hash_blocking(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
        Ok(hash.to_string())
    }

    fn verify_blocking(password: &str, hash: &str) -> Result<bool> {
        let parsed =
            PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid hash format: {}", e))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Hash a password with a fresh salt
    pub async fn hash(password: String) -> Result<String> {
        tokio::task::spawn_blocking(move || Self::hash_blocking(&password))
            .await
            .context("Password hashing task failed")?
    }

    /// Check a password against a stored PHC hash
    pub async fn verify(password: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify_blocking(&password, &hash))
            .await
            .context("Password verification task failed")?
    }
}
