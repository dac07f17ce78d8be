use thiserror::Error;

use super::UserProfile;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Account is disabled: {0}")]
    AccountDisabled(String),

    #[error("Credential service unavailable: {0}")]
    Unavailable(String),
}

/// Turns a username and password into a profile.
///
/// The session manager never checks credentials itself; it only manages the
/// session that follows a successful verification.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> Result<UserProfile, AuthError>;
}
