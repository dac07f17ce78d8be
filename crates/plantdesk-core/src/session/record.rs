use chrono::{DateTime, Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

use crate::models::UserProfile;

/// Length of the opaque session token
const TOKEN_LENGTH: usize = 48;

/// Client-held proof of login.
///
/// The token is random and never verified anywhere; it marks the session as
/// present, nothing more.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub token: String,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub issued_at: DateTime<Utc>,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub expires_at: DateTime<Utc>,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub last_activity_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Start a new session at `now` lasting `lifetime`.
    ///
    /// Returns `None` when the lifetime is not positive or the expiry cannot
    /// be represented, so `expires_at > issued_at` always holds.
    pub fn issue(now: DateTime<Utc>, lifetime: Duration) -> Option<Self> {
        let expires_at = now.checked_add_signed(lifetime).filter(|e| *e > now)?;
        Some(Self {
            token: generate_token(),
            issued_at: now,
            expires_at,
            last_activity_at: now,
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_idle(&self, now: DateTime<Utc>, idle_timeout: Duration) -> bool {
        now - self.last_activity_at > idle_timeout
    }

    /// Valid only while neither the absolute expiry nor the idle timeout has
    /// passed. There is no grace period.
    pub fn is_valid(&self, now: DateTime<Utc>, idle_timeout: Duration) -> bool {
        !self.is_expired(now) && !self.is_idle(now, idle_timeout)
    }

    /// Move the activity timestamp forward. Returns false when `now` is not
    /// later than the recorded activity, leaving the record untouched.
    pub fn touch(&mut self, now: DateTime<Utc>) -> bool {
        if now > self.last_activity_at {
            self.last_activity_at = now;
            true
        } else {
            false
        }
    }

    /// Push the expiry horizon out to `now + lifetime`. Never shortens it.
    pub fn extend(&mut self, now: DateTime<Utc>, lifetime: Duration) {
        match now.checked_add_signed(lifetime) {
            Some(horizon) if horizon > self.expires_at => self.expires_at = horizon,
            _ => {}
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.expires_at - self.issued_at
    }

    pub fn time_until_expiry(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at - now
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        self.time_until_expiry(now).num_minutes().max(0)
    }
}

/// The signed-in user together with their session, as held in memory and
/// mirrored to storage.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub user: UserProfile,
    pub record: SessionRecord,
    /// Duration class chosen at login; refreshes reuse it.
    pub remember_me: bool,
}

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}
