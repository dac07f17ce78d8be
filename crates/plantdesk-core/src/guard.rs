//! Render-time access gate for protected pages.
//!
//! Each mounted page gets its own `NavigationGuard`. Every render pass calls
//! `render` with the current path; the guard decides whether the page's
//! children may be shown and issues at most one redirect while the visitor
//! remains unauthenticated or unpermitted.

use std::sync::Arc;

use tracing::{debug, info};

use crate::navigation::{NavigateOptions, Navigation, NavigationOutcome};
use crate::redirect::{Access, RedirectDecision, RedirectResolver};
use crate::session::{SessionManager, SessionStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardPhase {
    /// Path not known yet.
    Pending,
    /// Path known but no decision made. Public pages stay here and render
    /// their children directly; a protected page shows the placeholder while
    /// the session is loading.
    Evaluating,
    Authorized,
    Redirecting,
}

/// What the page should draw for this render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardView {
    Nothing,
    Placeholder,
    Children,
}

pub struct NavigationGuard {
    session: Arc<SessionManager>,
    resolver: Arc<RedirectResolver>,
    navigation: Arc<Navigation>,
    phase: GuardPhase,
    /// One-shot latch: set before the redirect is issued and only cleared
    /// once the visitor is authorized.
    redirect_issued: bool,
    last_outcome: Option<NavigationOutcome>,
}

impl NavigationGuard {
    pub fn new(
        session: Arc<SessionManager>,
        resolver: Arc<RedirectResolver>,
        navigation: Arc<Navigation>,
    ) -> Self {
        Self {
            session,
            resolver,
            navigation,
            phase: GuardPhase::Pending,
            redirect_issued: false,
            last_outcome: None,
        }
    }

    pub fn phase(&self) -> GuardPhase {
        self.phase
    }

    pub fn redirect_issued(&self) -> bool {
        self.redirect_issued
    }

    /// Result of the redirect this guard issued, if any.
    pub fn last_outcome(&self) -> Option<&NavigationOutcome> {
        self.last_outcome.as_ref()
    }

    /// One render pass.
    ///
    /// Unregistered paths are treated as protected: anonymous visitors are
    /// sent to login and signed-in users are redirected away.
    pub fn render(&mut self, path: Option<&str>) -> GuardView {
        let Some(path) = path else {
            self.phase = GuardPhase::Pending;
            return GuardView::Nothing;
        };

        let requires_auth = self.resolver.registry().requires_auth(path).unwrap_or(true);
        if !requires_auth {
            self.phase = GuardPhase::Evaluating;
            return GuardView::Children;
        }

        if self.session.status() == SessionStatus::Loading {
            self.phase = GuardPhase::Evaluating;
            return GuardView::Placeholder;
        }

        if !self.session.check_auth_status() {
            let decision = self.resolver.handle_auth_required(path, false);
            return self.redirect(path, decision);
        }

        let user = self.session.user();
        match self.resolver.check_access(path, user.as_ref()) {
            Access::Granted => {
                if self.phase != GuardPhase::Authorized {
                    debug!(%path, "Guard authorized");
                }
                self.phase = GuardPhase::Authorized;
                self.redirect_issued = false;
                GuardView::Children
            }
            _ => {
                let decision = self.resolver.handle_permission_denied(path, user.as_ref());
                self.redirect(path, decision)
            }
        }
    }

    fn redirect(&mut self, path: &str, decision: RedirectDecision) -> GuardView {
        self.phase = GuardPhase::Redirecting;
        if self.redirect_issued {
            return GuardView::Placeholder;
        }

        self.redirect_issued = true;
        if decision.should_redirect {
            info!(
                from = %path,
                to = %decision.target_url,
                reason = %decision.reason,
                "Guard redirecting"
            );
            let outcome = self
                .navigation
                .navigate(&decision.target_url, NavigateOptions::from(&decision));
            self.last_outcome = Some(outcome);
        }
        GuardView::Placeholder
    }
}

impl std::fmt::Debug for NavigationGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationGuard")
            .field("phase", &self.phase)
            .field("redirect_issued", &self.redirect_issued)
            .finish()
    }
}
