//! Data models shared across the session subsystem.
//!
//! - `UserProfile`: the immutable snapshot returned by credential verification
//! - `CredentialVerifier`: the collaborator that turns credentials into a profile

pub mod credentials;
pub mod profile;

pub use credentials::{AuthError, CredentialVerifier};
pub use profile::UserProfile;
