use std::sync::Arc;

use crate::models::UserProfile;
use crate::session::{SessionRecord, SessionSnapshot};

use super::{KeyValueStore, StoreError};

/// Serialized `UserProfile`
pub const USER_KEY: &str = "user_data";
/// Serialized `SessionRecord`
pub const SESSION_KEY: &str = "session_data";
/// Duration class chosen at login
pub const REMEMBER_KEY: &str = "remember_me";

/// Typed access to the session keys of a `KeyValueStore`.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish()
    }
}

impl SessionStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Read the persisted session.
    ///
    /// Returns `Ok(None)` when nothing is stored, and an error when only part
    /// of the session is present, a value fails to parse, or the record breaks
    /// `expires_at > issued_at`.
    pub fn load(&self) -> Result<Option<SessionSnapshot>, StoreError> {
        let user = self.backend.get(USER_KEY)?;
        let record = self.backend.get(SESSION_KEY)?;

        let (user, record) = match (user, record) {
            (None, None) => return Ok(None),
            (Some(u), Some(r)) => (u, r),
            (Some(_), None) => return Err(StoreError::Corrupt("user without session".to_string())),
            (None, Some(_)) => return Err(StoreError::Corrupt("session without user".to_string())),
        };

        let user: UserProfile = serde_json::from_str(&user)?;
        let record: SessionRecord = serde_json::from_str(&record)?;
        if record.expires_at <= record.issued_at {
            return Err(StoreError::Corrupt("session expires before it was issued".to_string()));
        }

        // Older sessions were written without the flag; treat those as short.
        let remember_me = match self.backend.get(REMEMBER_KEY)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => false,
        };

        Ok(Some(SessionSnapshot {
            user,
            record,
            remember_me,
        }))
    }

    pub fn save(&self, session: &SessionSnapshot) -> Result<(), StoreError> {
        self.backend.set(USER_KEY, &serde_json::to_string(&session.user)?)?;
        self.save_record(&session.record)?;
        self.backend
            .set(REMEMBER_KEY, &serde_json::to_string(&session.remember_me)?)?;
        Ok(())
    }

    /// Write only the session record, as after an activity bump or refresh.
    pub fn save_record(&self, record: &SessionRecord) -> Result<(), StoreError> {
        self.backend.set(SESSION_KEY, &serde_json::to_string(record)?)
    }

    /// Remove every session key. All removals are attempted; the first error
    /// is returned.
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut first_err = None;
        for key in [USER_KEY, SESSION_KEY, REMEMBER_KEY] {
            if let Err(e) = self.backend.remove(key) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
