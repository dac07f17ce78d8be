mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::{operator, Fixture};
use plantdesk_core::{
    ActivityMonitor, ActivitySignal, FileStore, HistoryNavigator, KeyValueStore, ManualClock,
    MemoryStore, NavigateOptions, NavigationOutcome, Navigator, SessionConfig, SessionManager, SessionStore,
    TransitionKind,
};

#[test]
fn test_remembered_login_survives_restart() {
    let backend = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(Utc::now()));

    let first = Fixture::with_backend("/auth/login", backend.clone(), clock.clone());
    first.session.restore();
    first.session.login(operator(), true).unwrap();
    drop(first);

    let second = Fixture::with_backend("/shift-log", backend, clock);
    assert!(second.session.is_loading());
    assert!(second.session.restore());

    let snapshot = second.session.snapshot().unwrap();
    assert_eq!(
        snapshot.record.expires_at - snapshot.record.issued_at,
        second.config.session.long_session()
    );
    assert_eq!(snapshot.user, operator());
}

#[test]
fn test_file_backed_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let config = SessionConfig::default();

    let build = |dir: &std::path::Path| {
        let store = FileStore::new(dir.to_path_buf()).unwrap();
        SessionManager::new(
            SessionStore::new(Arc::new(store)),
            Arc::new(HistoryNavigator::new("/auth/login")),
            clock.clone(),
            config.clone(),
            "/auth/login",
        )
    };

    let first = build(dir.path());
    first.restore();
    let original = first.login(operator(), false).unwrap();

    let second = build(dir.path());
    assert!(second.restore());
    assert_eq!(second.token(), Some(original.record.token));
    assert_eq!(
        second.snapshot().unwrap().record.lifetime(),
        config.short_session()
    );
}

#[test]
fn test_tampered_storage_fails_closed() {
    let backend = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(Utc::now()));

    let first = Fixture::with_backend("/auth/login", backend.clone(), clock.clone());
    first.session.restore();
    first.session.login(operator(), true).unwrap();
    backend.set("session_data", "{\"token\": 7}").unwrap();

    let second = Fixture::with_backend("/shift-log", backend.clone(), clock);
    assert!(!second.session.restore());
    assert!(!second.session.is_authenticated());
    assert!(backend.is_empty());
}

#[test]
fn test_login_then_resolve_post_login_destination() {
    let fx = Fixture::new("/auth/login?redirect=%2Fproduction%2Fdowntime");
    fx.session.restore();
    let user = fx.session.login(operator(), false).unwrap().user;

    let decision = fx
        .resolver
        .resolve("/auth/login", Some(&user), Some("%2Fproduction%2Fdowntime"));
    let outcome = fx
        .navigation
        .navigate(&decision.target_url, NavigateOptions::from(&decision));

    assert_eq!(
        outcome,
        NavigationOutcome::Navigated("/production/downtime".to_string())
    );
    assert_eq!(fx.nav.current_url(), "/production/downtime");
}

#[test]
fn test_activity_bumps_until_idle() {
    let fx = Fixture::new("/shift-log");
    fx.session.restore();
    fx.session.login(operator(), false).unwrap();

    for _ in 0..4 {
        fx.clock.advance(Duration::minutes(25));
        assert!(fx.session.record_activity(ActivitySignal::Scroll));
    }
    assert!(fx.session.is_authenticated());

    fx.clock.advance(Duration::minutes(30) + Duration::seconds(1));
    assert!(!fx.session.is_authenticated());
}

#[tokio::test(start_paused = true)]
async fn test_periodic_check_logs_out_idle_session() {
    let fx = Fixture::new("/shift-log");
    fx.session.restore();
    fx.session.login(operator(), false).unwrap();

    let _monitor = ActivityMonitor::start(fx.session.clone(), std::time::Duration::from_secs(60));

    fx.clock.advance(Duration::minutes(31));
    tokio::time::sleep(std::time::Duration::from_secs(61)).await;

    assert!(fx.session.snapshot().is_none());
    let transitions = fx.nav.transitions();
    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0].kind, TransitionKind::Assign);
    assert_eq!(transitions[0].url, "/auth/login");
}

#[tokio::test(start_paused = true)]
async fn test_periodic_check_leaves_active_session() {
    let fx = Fixture::new("/shift-log");
    fx.session.restore();
    fx.session.login(operator(), false).unwrap();

    let monitor = ActivityMonitor::start(fx.session.clone(), std::time::Duration::from_secs(60));

    for _ in 0..5 {
        fx.clock.advance(Duration::minutes(10));
        assert!(monitor.notify(ActivitySignal::Key));
        tokio::time::sleep(std::time::Duration::from_secs(61)).await;
    }

    assert!(fx.session.is_authenticated());
    assert!(fx.nav.transitions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_teardown_stops_check_and_listeners() {
    let fx = Fixture::new("/shift-log");
    fx.session.restore();
    fx.session.login(operator(), false).unwrap();

    let mut monitor = ActivityMonitor::start(fx.session.clone(), std::time::Duration::from_secs(60));
    monitor.teardown();
    assert!(!monitor.is_attached());

    fx.clock.advance(Duration::minutes(5));
    assert!(!monitor.notify(ActivitySignal::Pointer));

    fx.clock.advance(Duration::minutes(30));
    tokio::time::sleep(std::time::Duration::from_secs(180)).await;

    // Nothing ran the check, so the stale session is still held in memory.
    assert!(fx.session.snapshot().is_some());
    assert!(fx.nav.transitions().is_empty());
}
