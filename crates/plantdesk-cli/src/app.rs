//! Shell state: wires the session subsystem together and runs commands
//! against it the way the browser app's pages would.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use plantdesk_core::routes::defaults::default_registry;
use plantdesk_core::utils::split_target;
use plantdesk_core::{
    ActivityMonitor, ActivitySignal, AppConfig, CredentialVerifier, FileStore, GuardView,
    HistoryNavigator, Navigation, NavigationGuard, Navigator, RedirectResolver, RouteRegistry,
    SessionManager, SessionStore, SystemClock,
};

use crate::directory::DirectoryVerifier;

/// Maximum guard-driven redirects followed for a single command.
/// A chain longer than this means the route table is misconfigured.
const MAX_REDIRECT_HOPS: usize = 5;

/// Subdirectory of the data dir holding the persisted session keys
const SESSION_DIR: &str = "session";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Quitting,
}

pub struct App {
    pub config: AppConfig,
    pub state: AppState,
    registry: Arc<RouteRegistry>,
    navigator: Arc<HistoryNavigator>,
    session: Arc<SessionManager>,
    resolver: Arc<RedirectResolver>,
    navigation: Arc<Navigation>,
    verifier: Option<Box<dyn CredentialVerifier>>,
    monitor: Option<ActivityMonitor>,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let data_dir = config.data_dir()?;
        let store = FileStore::new(data_dir.join(SESSION_DIR))
            .context("Failed to open session storage")?;
        debug!(dir = ?store.dir(), "Session storage opened");
        Self::with_store(config, Arc::new(store))
    }

    pub fn with_store(config: AppConfig, store: Arc<dyn plantdesk_core::KeyValueStore>) -> Result<Self> {
        let registry = Arc::new(match config.routing.routes_file {
            Some(ref path) => RouteRegistry::load(path)
                .with_context(|| format!("Failed to load route table: {}", path.display()))?,
            None => default_registry(),
        });

        let verifier: Option<Box<dyn CredentialVerifier>> = match config.users_file {
            Some(ref path) => Some(Box::new(DirectoryVerifier::load(path)?)),
            None => {
                warn!("No users_file configured; login is unavailable");
                None
            }
        };

        let navigator = Arc::new(HistoryNavigator::new(config.routing.login_path.clone()));
        let session = Arc::new(SessionManager::new(
            SessionStore::new(store),
            navigator.clone(),
            Arc::new(SystemClock),
            config.session.clone(),
            config.routing.login_path.clone(),
        ));
        let resolver = Arc::new(RedirectResolver::new(registry.clone(), &config.routing));
        let navigation = Arc::new(Navigation::new(
            registry.clone(),
            navigator.clone(),
            config.routing.fallback_path.clone(),
        ));

        Ok(Self {
            config,
            state: AppState::Normal,
            registry,
            navigator,
            session,
            resolver,
            navigation,
            verifier,
            monitor: None,
        })
    }

    pub fn with_verifier(mut self, verifier: Box<dyn CredentialVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Restore the stored session and start the periodic idle check.
    /// Must run inside a tokio runtime.
    pub fn start(&mut self) -> Vec<String> {
        let restored = self.session.restore();
        self.monitor = Some(ActivityMonitor::start(
            self.session.clone(),
            self.config.session.check_interval(),
        ));

        if restored {
            let user = self.session.user();
            let decision = self.resolver.resolve(
                &self.navigator.current_url(),
                user.as_ref(),
                None,
            );
            self.navigation.navigate(&decision.target_url, (&decision).into());
        }
        self.render_current()
    }

    pub fn stop(&mut self) {
        if let Some(mut monitor) = self.monitor.take() {
            monitor.teardown();
        }
    }

    pub fn current_url(&self) -> String {
        self.navigator.current_url()
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Run one shell command and return the lines to print.
    pub fn handle_command(&mut self, line: &str) -> Result<Vec<String>> {
        if let Some(ref monitor) = self.monitor {
            monitor.notify(ActivitySignal::Key);
        }

        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            return Ok(Vec::new());
        };
        let args: Vec<&str> = parts.collect();

        match command {
            "open" | "go" => match args.first() {
                Some(path) => Ok(self.open(path)),
                None => Ok(vec!["usage: open <path>".to_string()]),
            },
            "back" => Ok(self.back()),
            "login" => {
                let Some(username) = args.first() else {
                    return Ok(vec!["usage: login <username> [--remember]".to_string()]);
                };
                let remember = args.iter().any(|a| *a == "--remember" || *a == "-r");
                let password = match std::env::var("PLANTDESK_PASSWORD") {
                    Ok(p) => p,
                    Err(_) => rpassword::prompt_password("Password: ")
                        .context("Failed to read password")?,
                };
                Ok(self.login(username, &password, remember))
            }
            "logout" => {
                self.session.logout();
                Ok(self.render_current())
            }
            "refresh" => {
                if self.session.refresh_session() {
                    Ok(vec![self.status_line()])
                } else {
                    Ok(vec!["No active session to refresh".to_string()])
                }
            }
            "status" => Ok(vec![self.status_line()]),
            "routes" => Ok(self.routes()),
            "help" | "?" => Ok(help()),
            "quit" | "exit" => {
                self.state = AppState::Quitting;
                Ok(Vec::new())
            }
            other => Ok(vec![format!("Unknown command: {} (try 'help')", other)]),
        }
    }

    /// Type a URL into the address bar.
    pub fn open(&mut self, path: &str) -> Vec<String> {
        if let Err(e) = self.navigator.push(path) {
            return vec![format!("Cannot open {}: {}", path, e)];
        }
        self.render_current()
    }

    pub fn back(&mut self) -> Vec<String> {
        match self.navigator.back() {
            Some(_) => self.render_current(),
            None => vec!["Already at the first page".to_string()],
        }
    }

    /// Verify credentials, start the session, then land wherever the
    /// resolver says (honoring the login page's `redirect` parameter).
    pub fn login(&mut self, username: &str, password: &str, remember_me: bool) -> Vec<String> {
        let Some(ref verifier) = self.verifier else {
            return vec!["Login unavailable: no user directory configured".to_string()];
        };

        let profile = match verifier.verify(username, password) {
            Ok(p) => p,
            Err(e) => {
                info!(username, error = %e, "Login rejected");
                return vec![format!("Login failed: {}", e)];
            }
        };

        let Some(snapshot) = self.session.login(profile, remember_me) else {
            return vec!["Login failed: could not save the session".to_string()];
        };

        let current = self.navigator.current_url();
        let (path, query) = split_target(&current);
        let return_to = query.and_then(redirect_param);
        let decision = self
            .resolver
            .resolve(path, Some(&snapshot.user), return_to);
        debug!(target = %decision.target_url, reason = %decision.reason, "Post-login destination");
        self.navigation.navigate(&decision.target_url, (&decision).into());

        let mut out = vec![format!(
            "Signed in as {} ({}) - {}",
            snapshot.user.display_name, snapshot.user.role, decision.reason
        )];
        out.extend(self.render_current());
        out
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Mount a guard on the current page, following redirects it issues
    /// (each redirect is a fresh mount on the new page).
    fn render_current(&mut self) -> Vec<String> {
        let mut out = Vec::new();

        for _ in 0..MAX_REDIRECT_HOPS {
            let url = self.navigator.current_url();
            let mut guard = NavigationGuard::new(
                self.session.clone(),
                self.resolver.clone(),
                self.navigation.clone(),
            );

            match guard.render(Some(&url)) {
                GuardView::Children => {
                    out.push(format!("[{}]", url));
                    return out;
                }
                GuardView::Placeholder | GuardView::Nothing => {
                    let next = self.navigator.current_url();
                    if next == url {
                        out.push(format!("[{}] (waiting)", url));
                        return out;
                    }
                    out.push(format!("{} -> {}", url, next));
                }
            }
        }

        warn!("Redirect chain too long, stopping");
        out.push("Too many redirects".to_string());
        out
    }

    fn status_line(&self) -> String {
        match self.session.snapshot() {
            Some(s) if self.session.is_authenticated() => format!(
                "{} ({}) on {}; session ends in {} min{}",
                s.user.display_name,
                s.user.role,
                self.navigator.current_url(),
                self.session.minutes_until_expiry().unwrap_or(0),
                if s.remember_me { " (remembered)" } else { "" }
            ),
            _ => format!("Not signed in; on {}", self.navigator.current_url()),
        }
    }

    fn routes(&self) -> Vec<String> {
        self.registry
            .routes()
            .into_iter()
            .map(|r| {
                let access = if r.requires_auth { "auth" } else { "public" };
                let roles = match r.allowed_roles {
                    plantdesk_core::RoleRequirement::Any => "any".to_string(),
                    plantdesk_core::RoleRequirement::Only(ref roles) => {
                        roles.iter().cloned().collect::<Vec<_>>().join(", ")
                    }
                };
                format!(
                    "{:<28} {:<6} {:<8} {}{}",
                    r.path,
                    access,
                    if r.is_active { "active" } else { "inactive" },
                    roles,
                    r.workspace_name
                        .as_deref()
                        .map(|w| format!(" [workspace: {}]", w))
                        .unwrap_or_default()
                )
            })
            .collect()
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Raw (still encoded) value of the `redirect` query parameter.
fn redirect_param(query: &str) -> Option<&str> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == plantdesk_core::redirect::REDIRECT_PARAM && !value.is_empty()).then_some(value)
    })
}

fn help() -> Vec<String> {
    [
        "open <path>                 navigate to a page",
        "back                        go back one page",
        "login <user> [--remember]   sign in (password prompted or PLANTDESK_PASSWORD)",
        "logout                      sign out",
        "refresh                     extend the session",
        "status                      show session state",
        "routes                      list known pages",
        "quit                        exit",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

// ============================================================================
// Tests
// ============================================================================
