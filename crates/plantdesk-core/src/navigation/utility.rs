use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::redirect::RedirectDecision;
use crate::routes::RouteRegistry;
use crate::utils::append_query;

use super::{NavigationError, Navigator};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Replace the current history entry instead of adding one.
    pub replace: bool,
    /// Query string to carry over onto the target.
    pub preserve_query: Option<String>,
}

impl NavigateOptions {
    pub fn push() -> Self {
        Self::default()
    }

    pub fn replace() -> Self {
        Self {
            replace: true,
            ..Self::default()
        }
    }

    pub fn preserving_query(mut self, query: impl Into<String>) -> Self {
        self.preserve_query = Some(query.into());
        self
    }
}

impl From<&RedirectDecision> for NavigateOptions {
    fn from(decision: &RedirectDecision) -> Self {
        Self {
            replace: decision.replace_history,
            preserve_query: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Landed on the requested target.
    Navigated(String),
    /// The target was unusable; landed on the fallback page instead.
    FellBack(String),
    /// Neither the target nor the fallback could be reached.
    GaveUp,
}

/// Registry-checked navigation.
pub struct Navigation {
    registry: Arc<RouteRegistry>,
    navigator: Arc<dyn Navigator>,
    fallback_path: String,
}

impl std::fmt::Debug for Navigation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigation")
            .field("fallback_path", &self.fallback_path)
            .finish()
    }
}

impl Navigation {
    pub fn new(
        registry: Arc<RouteRegistry>,
        navigator: Arc<dyn Navigator>,
        fallback_path: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            navigator,
            fallback_path: fallback_path.into(),
        }
    }

    pub fn current_url(&self) -> String {
        self.navigator.current_url()
    }

    /// Navigate to `target` if it is a registered, active route; otherwise,
    /// or if the transition fails, make one attempt at the fallback page.
    /// Failures are logged, never returned.
    pub fn navigate(&self, target: &str, options: NavigateOptions) -> NavigationOutcome {
        let url = match options.preserve_query {
            Some(ref query) => append_query(target, query),
            None => target.to_string(),
        };

        if !self.registry.is_navigable(&url) {
            warn!(target = %url, "Navigation target not registered or inactive, using fallback");
            return self.fall_back(&url, options.replace);
        }

        match self.transition(&url, options.replace) {
            Ok(()) => {
                debug!(target = %url, replace = options.replace, "Navigated");
                NavigationOutcome::Navigated(url)
            }
            Err(e) => {
                warn!(target = %url, error = %e, "Navigation failed, using fallback");
                self.fall_back(&url, options.replace)
            }
        }
    }

    fn fall_back(&self, failed: &str, replace: bool) -> NavigationOutcome {
        if failed == self.fallback_path || !self.registry.is_navigable(&self.fallback_path) {
            error!(fallback = %self.fallback_path, "Fallback page unavailable, giving up");
            return NavigationOutcome::GaveUp;
        }

        match self.transition(&self.fallback_path, replace) {
            Ok(()) => NavigationOutcome::FellBack(self.fallback_path.clone()),
            Err(e) => {
                error!(fallback = %self.fallback_path, error = %e, "Fallback navigation failed, giving up");
                NavigationOutcome::GaveUp
            }
        }
    }

    fn transition(&self, url: &str, replace: bool) -> Result<(), NavigationError> {
        if replace {
            self.navigator.replace(url)
        } else {
            self.navigator.push(url)
        }
    }
}
