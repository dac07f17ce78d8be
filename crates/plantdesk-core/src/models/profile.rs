use serde::{Deserialize, Serialize};

/// Snapshot of the signed-in user, fetched once at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub display_name: String,
    /// Job title, used as the role for page access checks.
    pub role: String,
    #[serde(default)]
    pub department: Option<String>,
    /// Name of the user's home workspace page.
    #[serde(default)]
    pub workspace_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl UserProfile {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            role: role.into(),
            department: None,
            workspace_name: None,
            email: None,
            phone: None,
        }
    }

    pub fn with_workspace(mut self, workspace_name: impl Into<String>) -> Self {
        self.workspace_name = Some(workspace_name.into());
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Workspace name with surrounding whitespace removed, if non-empty.
    pub fn workspace(&self) -> Option<&str> {
        self.workspace_name
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
    }
}
