//! Local credential directory standing in for the hosted auth service.
//!
//! The directory is a JSON array of accounts, each with an argon2 password
//! hash and the profile returned on successful verification.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use plantdesk_core::{AuthError, CredentialVerifier, UserProfile};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub disabled: bool,
    pub profile: UserProfile,
}

pub struct DirectoryVerifier {
    accounts: HashMap<String, Account>,
}

impl DirectoryVerifier {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read user directory: {}", path.display()))?;
        let accounts: Vec<Account> =
            serde_json::from_str(&contents).context("Failed to parse user directory")?;
        Ok(Self::new(accounts))
    }

    pub fn new(accounts: Vec<Account>) -> Self {
        let accounts = accounts
            .into_iter()
            .map(|a| (a.username.to_lowercase(), a))
            .collect();
        Self { accounts }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }
}

impl CredentialVerifier for DirectoryVerifier {
    fn verify(&self, username: &str, password: &str) -> Result<UserProfile, AuthError> {
        let account = self
            .accounts
            .get(&username.trim().to_lowercase())
            .ok_or(AuthError::InvalidCredentials)?;

        let parsed = PasswordHash::new(&account.password_hash).map_err(|e| {
            warn!(username, error = %e, "Stored password hash is malformed");
            AuthError::Unavailable("malformed credential record".to_string())
        })?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            debug!(username, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        if account.disabled {
            return Err(AuthError::AccountDisabled(account.username.clone()));
        }
        Ok(account.profile.clone())
    }
}

/// Produce an argon2 PHC string for a directory entry.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}
