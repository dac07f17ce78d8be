//! Session lifecycle: login, logout, refresh, status checks and timeouts.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::config::SessionConfig;
use crate::models::UserProfile;
use crate::navigation::Navigator;
use crate::store::SessionStore;

use super::{ActivitySignal, SessionRecord, SessionSnapshot};

/// What the rest of the app may assume about the user right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Persisted state has not been restored yet.
    Loading,
    Anonymous,
    Authenticated,
}

#[derive(Debug, Default)]
struct SessionState {
    restored: bool,
    current: Option<SessionSnapshot>,
    /// Activity timestamp of the record as last written to storage.
    stored_activity: Option<DateTime<Utc>>,
}

impl SessionState {
    fn set_current(&mut self, snapshot: SessionSnapshot) {
        self.stored_activity = Some(snapshot.record.last_activity_at);
        self.current = Some(snapshot);
    }
}

/// Owns the in-memory session and mirrors every change to the store.
///
/// Storage failures never escape: a failed read or write is logged and the
/// session is treated as absent.
pub struct SessionManager {
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
    login_path: String,
    state: Mutex<SessionState>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .field("login_path", &self.login_path)
            .finish()
    }
}

impl SessionManager {
    pub fn new(
        store: SessionStore,
        navigator: Arc<dyn Navigator>,
        clock: Arc<dyn Clock>,
        config: SessionConfig,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            store,
            navigator,
            clock,
            config,
            login_path: login_path.into(),
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // =========================================================================
    // Restoration
    // =========================================================================

    /// Load the persisted session, if any. Anything unreadable, partial or
    /// no longer valid is cleared from storage. Returns whether a session was
    /// restored.
    pub fn restore(&self) -> bool {
        let now = self.clock.now();
        let loaded = self.store.load();
        let mut state = self.lock();
        state.restored = true;

        match loaded {
            Ok(Some(snapshot)) if snapshot.record.is_valid(now, self.config.idle_timeout()) => {
                info!(user = %snapshot.user.id, "Session restored");
                state.set_current(snapshot);
                true
            }
            Ok(Some(snapshot)) => {
                info!(user = %snapshot.user.id, "Stored session expired, discarding");
                self.drop_session(&mut state);
                false
            }
            Ok(None) => {
                debug!("No stored session");
                false
            }
            Err(e) => {
                warn!(error = %e, "Stored session unreadable, clearing");
                self.drop_session(&mut state);
                false
            }
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Current status without side effects.
    pub fn status(&self) -> SessionStatus {
        let now = self.clock.now();
        let state = self.lock();
        if !state.restored {
            return SessionStatus::Loading;
        }
        match state.current {
            Some(ref s) if s.record.is_valid(now, self.config.idle_timeout()) => {
                SessionStatus::Authenticated
            }
            _ => SessionStatus::Anonymous,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status() == SessionStatus::Loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == SessionStatus::Authenticated
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.lock().current.as_ref().map(|s| s.user.clone())
    }

    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.lock().current.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.lock().current.as_ref().map(|s| s.record.token.clone())
    }

    /// Time left before the absolute expiry.
    pub fn remaining(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.lock()
            .current
            .as_ref()
            .map(|s| s.record.time_until_expiry(now))
    }

    pub fn minutes_until_expiry(&self) -> Option<i64> {
        let now = self.clock.now();
        self.lock()
            .current
            .as_ref()
            .map(|s| s.record.minutes_until_expiry(now))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Start a session for a verified profile.
    ///
    /// Returns `None` if the session could not be persisted; in that case no
    /// session is kept in memory either.
    pub fn login(&self, profile: UserProfile, remember_me: bool) -> Option<SessionSnapshot> {
        let now = self.clock.now();
        let lifetime = self.config.lifetime(remember_me);

        let mut state = self.lock();
        state.restored = true;
        let Some(record) = SessionRecord::issue(now, lifetime) else {
            error!(%lifetime, "Session lifetime is empty or out of range");
            self.drop_session(&mut state);
            return None;
        };
        let snapshot = SessionSnapshot {
            user: profile,
            record,
            remember_me,
        };

        if let Err(e) = self.store.save(&snapshot) {
            error!(error = %e, "Failed to persist new session");
            self.drop_session(&mut state);
            return None;
        }

        info!(
            user = %snapshot.user.id,
            remember_me,
            expires_at = %snapshot.record.expires_at,
            "Logged in"
        );
        state.set_current(snapshot.clone());
        Some(snapshot)
    }

    /// End the session and force a full page load of the login page so no
    /// in-memory state survives.
    pub fn logout(&self) {
        {
            let mut state = self.lock();
            state.restored = true;
            if let Some(ref s) = state.current {
                info!(user = %s.user.id, "Logging out");
            }
            self.drop_session(&mut state);
        }

        if let Err(e) = self.navigator.assign(&self.login_path) {
            error!(error = %e, "Failed to load login page after logout");
        }
    }

    /// True if a valid session exists, bumping its activity timestamp.
    ///
    /// An invalid session is torn down in place (memory and storage) without
    /// navigating; redirecting is the caller's job. Immediate successive calls
    /// write to storage at most once (see `touch`).
    pub fn check_auth_status(&self) -> bool {
        let now = self.clock.now();
        let mut state = self.lock();

        let valid = match state.current {
            None => return false,
            Some(ref s) => s.record.is_valid(now, self.config.idle_timeout()),
        };
        if !valid {
            info!("Session expired or idle");
            self.drop_session(&mut state);
            return false;
        }

        self.touch(&mut state)
    }

    /// Push the expiry out by the lifetime chosen at login. No credentials
    /// are checked. Returns false if there was no valid session to extend.
    pub fn refresh_session(&self) -> bool {
        let now = self.clock.now();
        let mut state = self.lock();

        let Some(ref mut s) = state.current else {
            return false;
        };
        if !s.record.is_valid(now, self.config.idle_timeout()) {
            self.drop_session(&mut state);
            return false;
        }

        let lifetime = self.config.lifetime(s.remember_me);
        s.record.extend(now, lifetime);
        let record = s.record.clone();
        if let Err(e) = self.store.save_record(&record) {
            warn!(error = %e, "Failed to persist refreshed session");
            self.drop_session(&mut state);
            return false;
        }

        state.stored_activity = Some(record.last_activity_at);
        debug!(expires_at = %record.expires_at, "Session refreshed");
        true
    }

    /// Interaction from the user. Only a still-valid session is bumped; an
    /// expired one is left for the periodic check to log out.
    pub fn record_activity(&self, signal: ActivitySignal) -> bool {
        let now = self.clock.now();
        let mut state = self.lock();

        match state.current {
            Some(ref s) if s.record.is_valid(now, self.config.idle_timeout()) => {}
            _ => return false,
        }
        debug!(?signal, "Activity");
        self.touch(&mut state)
    }

    /// Periodic check. Logs out (with the hard navigation) when the session
    /// has expired or gone idle. Returns true if it logged out.
    pub fn enforce_timeouts(&self) -> bool {
        let now = self.clock.now();
        let timed_out = {
            let state = self.lock();
            match state.current {
                Some(ref s) => !s.record.is_valid(now, self.config.idle_timeout()),
                None => false,
            }
        };

        if timed_out {
            info!("Session timed out");
            self.logout();
        }
        timed_out
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Bump activity on the current (valid) session. The in-memory timestamp
    /// always moves forward; storage is only written once it has advanced by
    /// `activity_write_interval` past the last stored value.
    fn touch(&self, state: &mut SessionState) -> bool {
        let now = self.clock.now();
        let Some(ref mut s) = state.current else {
            return false;
        };
        if !s.record.touch(now) {
            return true;
        }

        let due = match state.stored_activity {
            Some(stored) => now - stored >= self.config.activity_write_interval(),
            None => true,
        };
        if !due {
            return true;
        }

        let record = s.record.clone();
        if let Err(e) = self.store.save_record(&record) {
            warn!(error = %e, "Failed to persist session activity");
            self.drop_session(state);
            return false;
        }
        state.stored_activity = Some(record.last_activity_at);
        true
    }

    fn drop_session(&self, state: &mut SessionState) {
        state.current = None;
        state.stored_activity = None;
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear stored session");
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ManualClock, SystemClock};
    use crate::navigation::{HistoryNavigator, TransitionKind};
    use crate::store::{KeyValueStore, MemoryStore, StoreError, SESSION_KEY, USER_KEY};
    use chrono::Utc;

    struct Harness {
        manager: SessionManager,
        backend: Arc<MemoryStore>,
        nav: Arc<HistoryNavigator>,
        clock: Arc<ManualClock>,
    }

    fn harness_with(backend: Arc<MemoryStore>) -> Harness {
        let nav = Arc::new(HistoryNavigator::new("/dashboard"));
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let manager = SessionManager::new(
            SessionStore::new(backend.clone()),
            nav.clone(),
            clock.clone(),
            SessionConfig::default(),
            "/auth/login",
        );
        Harness {
            manager,
            backend,
            nav,
            clock,
        }
    }

    fn harness() -> Harness {
        let h = harness_with(Arc::new(MemoryStore::new()));
        h.manager.restore();
        h
    }

    fn profile() -> UserProfile {
        UserProfile::new("u-1", "Sam Lee", "Operator").with_workspace("shift-log")
    }

    /// Accepts reads, fails every write.
    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.0.get(key)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("quota exceeded".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_loading_until_restored() {
        let h = harness_with(Arc::new(MemoryStore::new()));
        assert_eq!(h.manager.status(), SessionStatus::Loading);
        assert!(!h.manager.restore());
        assert_eq!(h.manager.status(), SessionStatus::Anonymous);
    }

    #[test]
    fn test_login_sets_state_and_persists() {
        let h = harness();
        let snapshot = h.manager.login(profile(), false).unwrap();

        assert!(h.manager.is_authenticated());
        assert_eq!(h.manager.user(), Some(profile()));
        assert_eq!(snapshot.record.lifetime(), Duration::hours(8));
        assert_eq!(snapshot.record.last_activity_at, h.clock.now());
        assert!(h.backend.get(USER_KEY).unwrap().is_some());
        assert!(h.backend.get(SESSION_KEY).unwrap().is_some());
    }

    #[test]
    fn test_remember_me_uses_long_lifetime() {
        let h = harness();
        let snapshot = h.manager.login(profile(), true).unwrap();
        assert_eq!(snapshot.record.lifetime(), Duration::days(30));
    }

    #[test]
    fn test_logout_clears_and_hard_navigates() {
        let h = harness();
        h.manager.login(profile(), false);
        h.manager.logout();

        assert!(!h.manager.is_authenticated());
        assert!(h.backend.is_empty());
        let transitions = h.nav.transitions();
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].kind, TransitionKind::Assign);
        assert_eq!(transitions[0].url, "/auth/login");
    }

    #[test]
    fn test_check_without_session_is_false_and_silent() {
        let h = harness();
        assert!(!h.manager.check_auth_status());
        assert_eq!(h.backend.write_count(), 0);
        assert!(h.nav.transitions().is_empty());
    }

    #[test]
    fn test_check_is_idempotent() {
        let h = harness();
        h.manager.login(profile(), false);
        h.clock.advance(Duration::minutes(1));
        let writes = h.backend.write_count();

        assert!(h.manager.check_auth_status());
        assert!(h.manager.check_auth_status());
        assert_eq!(h.backend.write_count(), writes + 1);
    }

    #[test]
    fn test_check_writes_once_for_calls_close_together() {
        let h = harness();
        h.manager.login(profile(), false);
        h.clock.advance(Duration::seconds(2));
        let writes = h.backend.write_count();

        assert!(h.manager.check_auth_status());
        h.clock.advance(Duration::milliseconds(3));
        assert!(h.manager.check_auth_status());
        h.clock.advance(Duration::milliseconds(3));
        assert!(h.manager.check_auth_status());
        assert_eq!(h.backend.write_count(), writes + 1);

        // Memory still tracks the latest bump.
        let record = h.manager.snapshot().unwrap().record;
        assert_eq!(record.last_activity_at, h.clock.now());
    }

    #[test]
    fn test_check_on_system_clock_writes_at_most_once() {
        let backend = Arc::new(MemoryStore::new());
        let manager = SessionManager::new(
            SessionStore::new(backend.clone()),
            Arc::new(HistoryNavigator::new("/dashboard")),
            Arc::new(SystemClock),
            SessionConfig::default(),
            "/auth/login",
        );
        manager.restore();
        manager.login(profile(), false).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let writes = backend.write_count();

        assert!(manager.check_auth_status());
        assert!(manager.check_auth_status());
        assert!(backend.write_count() <= writes + 1);
    }

    #[test]
    fn test_activity_write_interval_zero_writes_every_bump() {
        let backend = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let config = SessionConfig {
            activity_write_interval_seconds: 0,
            ..Default::default()
        };
        let manager = SessionManager::new(
            SessionStore::new(backend.clone()),
            Arc::new(HistoryNavigator::new("/dashboard")),
            clock.clone(),
            config,
            "/auth/login",
        );
        manager.restore();
        manager.login(profile(), false).unwrap();
        let writes = backend.write_count();

        clock.advance(Duration::milliseconds(1));
        assert!(manager.check_auth_status());
        clock.advance(Duration::milliseconds(1));
        assert!(manager.check_auth_status());
        assert_eq!(backend.write_count(), writes + 2);
    }

    #[test]
    fn test_login_with_zero_lifetime_clamps_to_minimum() {
        let backend = Arc::new(MemoryStore::new());
        let config = SessionConfig {
            short_session_hours: 0,
            ..Default::default()
        };
        let manager = SessionManager::new(
            SessionStore::new(backend.clone()),
            Arc::new(HistoryNavigator::new("/auth/login")),
            Arc::new(ManualClock::default()),
            config,
            "/auth/login",
        );
        manager.restore();

        // Clamped to the minimum lifetime, never an already-expired record.
        let snapshot = manager.login(profile(), false).unwrap();
        assert!(snapshot.record.expires_at > snapshot.record.issued_at);
        assert_eq!(snapshot.record.lifetime(), Duration::hours(1));
    }

    #[test]
    fn test_login_with_huge_lifetime_does_not_panic() {
        let backend = Arc::new(MemoryStore::new());
        let config = SessionConfig {
            long_session_days: i64::MAX / 1000,
            ..Default::default()
        };
        let manager = SessionManager::new(
            SessionStore::new(backend.clone()),
            Arc::new(HistoryNavigator::new("/auth/login")),
            Arc::new(ManualClock::default()),
            config.clone(),
            "/auth/login",
        );
        manager.restore();

        let snapshot = manager.login(profile(), true).unwrap();
        assert_eq!(snapshot.record.lifetime(), config.long_session());

        let restarted = SessionManager::new(
            SessionStore::new(backend),
            Arc::new(HistoryNavigator::new("/auth/login")),
            Arc::new(ManualClock::new(snapshot.record.issued_at)),
            config,
            "/auth/login",
        );
        assert!(restarted.restore());
    }

    #[test]
    fn test_login_at_end_of_time_fails_closed() {
        let backend = Arc::new(MemoryStore::new());
        let manager = SessionManager::new(
            SessionStore::new(backend.clone()),
            Arc::new(HistoryNavigator::new("/auth/login")),
            Arc::new(ManualClock::new(DateTime::<Utc>::MAX_UTC)),
            SessionConfig::default(),
            "/auth/login",
        );
        manager.restore();

        assert!(manager.login(profile(), false).is_none());
        assert!(!manager.is_authenticated());
        assert!(backend.is_empty());
    }

    #[test]
    fn test_check_bumps_activity() {
        let h = harness();
        h.manager.login(profile(), false);
        h.clock.advance(Duration::minutes(20));
        assert!(h.manager.check_auth_status());

        // 40 minutes after login but only 20 after the last check.
        h.clock.advance(Duration::minutes(20));
        assert!(h.manager.check_auth_status());
    }

    #[test]
    fn test_check_tears_down_idle_session_without_navigating() {
        let h = harness();
        h.manager.login(profile(), true);
        h.clock.advance(Duration::minutes(31));

        assert!(!h.manager.check_auth_status());
        assert!(h.manager.user().is_none());
        assert!(h.backend.is_empty());
        assert!(h.nav.transitions().is_empty());
    }

    #[test]
    fn test_check_tears_down_expired_session() {
        let h = harness();
        h.manager.login(profile(), false);
        // Stay active every 20 minutes until past the 8 hour horizon.
        for _ in 0..24 {
            h.clock.advance(Duration::minutes(20));
            assert!(h.manager.check_auth_status());
        }
        h.clock.advance(Duration::minutes(1));
        assert!(!h.manager.check_auth_status());
    }

    #[test]
    fn test_refresh_extends_by_login_duration_class() {
        let h = harness();
        h.manager.login(profile(), false);
        h.clock.advance(Duration::hours(1));
        h.manager.record_activity(ActivitySignal::Key);

        assert!(h.manager.refresh_session());
        let record = h.manager.snapshot().unwrap().record;
        assert_eq!(record.expires_at, h.clock.now() + Duration::hours(8));

        let stored = SessionStore::new(h.backend.clone()).load().unwrap().unwrap();
        assert_eq!(stored.record.expires_at, record.expires_at);
    }

    #[test]
    fn test_refresh_without_valid_session() {
        let h = harness();
        assert!(!h.manager.refresh_session());

        h.manager.login(profile(), false);
        h.clock.advance(Duration::minutes(45));
        assert!(!h.manager.refresh_session());
        assert!(h.manager.snapshot().is_none());
    }

    #[test]
    fn test_activity_does_not_revive_idle_session() {
        let h = harness();
        h.manager.login(profile(), false);
        h.clock.advance(Duration::minutes(31));
        assert!(!h.manager.record_activity(ActivitySignal::Pointer));
        assert!(!h.manager.is_authenticated());
    }

    #[test]
    fn test_enforce_timeouts_logs_out() {
        let h = harness();
        h.manager.login(profile(), false);
        assert!(!h.manager.enforce_timeouts());

        h.clock.advance(Duration::minutes(31));
        assert!(h.manager.enforce_timeouts());
        assert_eq!(h.nav.current_url(), "/auth/login");
        assert!(!h.manager.enforce_timeouts());
    }

    #[test]
    fn test_restore_round_trip() {
        let backend = Arc::new(MemoryStore::new());
        let first = harness_with(backend.clone());
        first.manager.restore();
        let original = first.manager.login(profile(), true).unwrap();

        let second = harness_with(backend);
        second.clock.set(first.clock.now());
        assert!(second.manager.restore());
        let restored = second.manager.snapshot().unwrap();
        assert_eq!(restored.record, original.record);
        assert_eq!(restored.record.lifetime(), Duration::days(30));
        assert!(restored.remember_me);
    }

    #[test]
    fn test_restore_discards_corrupt_state() {
        let backend = Arc::new(MemoryStore::new());
        backend.set(USER_KEY, "{\"id\":").unwrap();
        backend.set(SESSION_KEY, "[]").unwrap();

        let h = harness_with(backend.clone());
        assert!(!h.manager.restore());
        assert_eq!(h.manager.status(), SessionStatus::Anonymous);
        assert!(backend.is_empty());
    }

    #[test]
    fn test_restore_discards_idle_session() {
        let backend = Arc::new(MemoryStore::new());
        let first = harness_with(backend.clone());
        first.manager.restore();
        first.manager.login(profile(), true);

        let second = harness_with(backend.clone());
        second.clock.set(first.clock.now() + Duration::hours(2));
        assert!(!second.manager.restore());
        assert!(backend.is_empty());
    }

    #[test]
    fn test_login_fails_closed_when_store_rejects_writes() {
        let nav = Arc::new(HistoryNavigator::new("/auth/login"));
        let manager = SessionManager::new(
            SessionStore::new(Arc::new(ReadOnlyStore(MemoryStore::new()))),
            nav,
            Arc::new(ManualClock::default()),
            SessionConfig::default(),
            "/auth/login",
        );
        manager.restore();

        assert!(manager.login(profile(), false).is_none());
        assert!(!manager.is_authenticated());
        assert!(!manager.check_auth_status());
    }

    #[test]
    fn test_minutes_until_expiry() {
        let h = harness();
        assert_eq!(h.manager.minutes_until_expiry(), None);
        h.manager.login(profile(), false);
        h.clock.advance(Duration::minutes(10));
        assert_eq!(h.manager.minutes_until_expiry(), Some(470));
        assert_eq!(h.manager.remaining(), Some(Duration::minutes(470)));
    }
}
