#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use plantdesk_core::routes::defaults::default_registry;
use plantdesk_core::{
    AppConfig, HistoryNavigator, ManualClock, MemoryStore, Navigation, NavigationGuard,
    RedirectResolver, SessionManager, SessionStore, UserProfile,
};

/// Everything a page needs, wired the way the app wires it at start-up.
pub struct Fixture {
    pub config: AppConfig,
    pub backend: Arc<MemoryStore>,
    pub nav: Arc<HistoryNavigator>,
    pub clock: Arc<ManualClock>,
    pub session: Arc<SessionManager>,
    pub resolver: Arc<RedirectResolver>,
    pub navigation: Arc<Navigation>,
}

impl Fixture {
    pub fn new(start_url: &str) -> Self {
        Self::with_backend(start_url, Arc::new(MemoryStore::new()), Arc::new(ManualClock::new(Utc::now())))
    }

    pub fn with_backend(start_url: &str, backend: Arc<MemoryStore>, clock: Arc<ManualClock>) -> Self {
        let config = AppConfig::default();
        let registry = Arc::new(default_registry());
        let nav = Arc::new(HistoryNavigator::new(start_url));
        let session = Arc::new(SessionManager::new(
            SessionStore::new(backend.clone()),
            nav.clone(),
            clock.clone(),
            config.session.clone(),
            config.routing.login_path.clone(),
        ));
        let resolver = Arc::new(RedirectResolver::new(registry.clone(), &config.routing));
        let navigation = Arc::new(Navigation::new(
            registry,
            nav.clone(),
            config.routing.fallback_path.clone(),
        ));

        Self {
            config,
            backend,
            nav,
            clock,
            session,
            resolver,
            navigation,
        }
    }

    pub fn guard(&self) -> NavigationGuard {
        NavigationGuard::new(self.session.clone(), self.resolver.clone(), self.navigation.clone())
    }
}

pub fn operator() -> UserProfile {
    UserProfile::new("u-100", "Sam Lee", "Operator")
        .with_department("Packaging")
        .with_workspace("shift-log")
}

pub fn quality_engineer() -> UserProfile {
    UserProfile::new("u-200", "Riley Chen", "Quality Engineer").with_workspace("quality")
}
