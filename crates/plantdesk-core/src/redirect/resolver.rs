use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::RoutingConfig;
use crate::models::UserProfile;
use crate::routes::RouteRegistry;
use crate::utils::path_of;

use super::permission::{self, Access};
use super::{RedirectDecision, RedirectReason};

/// Query parameter on the login page carrying the return-to path
pub const REDIRECT_PARAM: &str = "redirect";

/// Decides where navigations land.
///
/// Precedence for `resolve`, first match wins:
/// 1. the return-to path, if registered, active and permitted
/// 2. the user's workspace page, under the same conditions
/// 3. the fallback page
#[derive(Debug)]
pub struct RedirectResolver {
    registry: Arc<RouteRegistry>,
    login_path: String,
    fallback_path: String,
}

impl RedirectResolver {
    pub fn new(registry: Arc<RouteRegistry>, routing: &RoutingConfig) -> Self {
        Self {
            registry,
            login_path: routing.login_path.clone(),
            fallback_path: routing.fallback_path.clone(),
        }
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn fallback_path(&self) -> &str {
        &self.fallback_path
    }

    /// The one place page access is decided.
    pub fn check_access(&self, target: &str, user: Option<&UserProfile>) -> Access {
        permission::evaluate(&self.registry, target, user)
    }

    /// Post-login (or generic) destination. Always redirects.
    ///
    /// A usable return-to or workspace page wins even when it is the page
    /// named by `current_path`; only the permission-denied path excludes the
    /// page being left.
    pub fn resolve(
        &self,
        current_path: &str,
        user: Option<&UserProfile>,
        return_to: Option<&str>,
    ) -> RedirectDecision {
        debug!(current = %path_of(current_path), "Resolving destination");

        if let Some(target) = return_to.and_then(|raw| self.return_target(raw)) {
            match self.check_access(&target, user) {
                Access::Granted => {
                    return RedirectDecision::redirect(target, RedirectReason::ReturnToOriginal, true);
                }
                access => debug!(%target, ?access, "Return-to not usable"),
            }
        }

        if let Some(target) = self.workspace_target(user, None) {
            return RedirectDecision::redirect(target, RedirectReason::WorkspaceDefault, true);
        }

        RedirectDecision::redirect(self.fallback_path.clone(), RedirectReason::DefaultFallback, true)
    }

    /// Send an unauthenticated visitor to the login page, remembering where
    /// they were headed. Adds a history entry so Back returns to the
    /// interception point.
    pub fn handle_auth_required(&self, path: &str, is_authenticated: bool) -> RedirectDecision {
        if is_authenticated {
            return RedirectDecision::stay(path, RedirectReason::AlreadyAuthenticated);
        }
        RedirectDecision::redirect(self.login_url(path), RedirectReason::AuthRequired, false)
    }

    /// Send a signed-in user away from a page they may not open. Always
    /// replaces history so Back cannot return to the denied page.
    pub fn handle_permission_denied(&self, path: &str, user: Option<&UserProfile>) -> RedirectDecision {
        let denied = path_of(path);
        let target = self
            .workspace_target(user, Some(denied))
            .unwrap_or_else(|| self.fallback_path.clone());

        debug!(path = %denied, %target, "Permission denied");
        RedirectDecision::redirect(target, RedirectReason::PermissionDenied, true)
    }

    /// Login URL with `path` carried in the `redirect` parameter.
    pub fn login_url(&self, path: &str) -> String {
        if path.is_empty() || path_of(path) == self.login_path {
            return self.login_path.clone();
        }
        format!(
            "{}?{}={}",
            self.login_path,
            REDIRECT_PARAM,
            urlencoding::encode(path)
        )
    }

    /// Decode a raw return-to value. Only same-site absolute paths are kept,
    /// and never the login page itself.
    fn return_target(&self, raw: &str) -> Option<String> {
        let decoded = match urlencoding::decode(raw.trim()) {
            Ok(d) => d.into_owned(),
            Err(e) => {
                warn!(raw, error = %e, "Undecodable return-to parameter");
                return None;
            }
        };

        if !decoded.starts_with('/') || decoded.starts_with("//") {
            warn!(target = %decoded, "Return-to is not a local path");
            return None;
        }
        if path_of(&decoded) == self.login_path {
            return None;
        }
        Some(decoded)
    }

    /// The user's workspace page, if registered, active and permitted.
    fn workspace_target(&self, user: Option<&UserProfile>, exclude: Option<&str>) -> Option<String> {
        let user = user?;
        let name = user.workspace()?;
        let Some(path) = self.registry.path_for_workspace(name) else {
            warn!(workspace = %name, user = %user.id, "Workspace not registered");
            return None;
        };
        if exclude == Some(path) {
            return None;
        }
        match self.check_access(path, Some(user)) {
            Access::Granted => Some(path.to_string()),
            access => {
                warn!(workspace = %name, %path, ?access, "Workspace page not usable");
                None
            }
        }
    }
}
