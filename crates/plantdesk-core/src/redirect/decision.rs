use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum RedirectReason {
    #[serde(rename = "return to original destination")]
    ReturnToOriginal,
    #[serde(rename = "workspace default")]
    WorkspaceDefault,
    #[serde(rename = "default fallback")]
    DefaultFallback,
    #[serde(rename = "authentication required")]
    AuthRequired,
    #[serde(rename = "permission denied")]
    PermissionDenied,
    #[serde(rename = "already authenticated")]
    AlreadyAuthenticated,
}

impl RedirectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedirectReason::ReturnToOriginal => "return to original destination",
            RedirectReason::WorkspaceDefault => "workspace default",
            RedirectReason::DefaultFallback => "default fallback",
            RedirectReason::AuthRequired => "authentication required",
            RedirectReason::PermissionDenied => "permission denied",
            RedirectReason::AlreadyAuthenticated => "already authenticated",
        }
    }
}

impl fmt::Display for RedirectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one resolver evaluation. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct RedirectDecision {
    pub should_redirect: bool,
    /// Where to go; the current path when no redirect is needed.
    pub target_url: String,
    pub reason: RedirectReason,
    pub replace_history: bool,
}

impl RedirectDecision {
    pub fn redirect(target_url: impl Into<String>, reason: RedirectReason, replace_history: bool) -> Self {
        Self {
            should_redirect: true,
            target_url: target_url.into(),
            reason,
            replace_history,
        }
    }

    pub fn stay(current: impl Into<String>, reason: RedirectReason) -> Self {
        Self {
            should_redirect: false,
            target_url: current.into(),
            reason,
            replace_history: false,
        }
    }
}
