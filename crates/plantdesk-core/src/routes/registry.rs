use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::RegistryError;
use crate::utils::path_of;

// ============================================================================
// Role Requirements
// ============================================================================

/// Which roles may open a page.
///
/// Serialized as the string `"any"` or as a list of role names. Role names are
/// compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRoles", into = "RawRoles")]
pub enum RoleRequirement {
    Any,
    Only(BTreeSet<String>),
}

impl RoleRequirement {
    pub fn only<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        RoleRequirement::Only(roles.into_iter().map(|r| normalize_role(r.as_ref())).collect())
    }

    pub fn permits(&self, role: &str) -> bool {
        match self {
            RoleRequirement::Any => true,
            RoleRequirement::Only(roles) => roles.contains(&normalize_role(role)),
        }
    }
}

fn normalize_role(role: &str) -> String {
    role.trim().to_lowercase()
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawRoles {
    Keyword(String),
    List(Vec<String>),
}

impl TryFrom<RawRoles> for RoleRequirement {
    type Error = String;

    fn try_from(raw: RawRoles) -> Result<Self, Self::Error> {
        match raw {
            RawRoles::Keyword(k) if k.eq_ignore_ascii_case("any") => Ok(RoleRequirement::Any),
            RawRoles::Keyword(k) => Err(format!("unknown role keyword {:?}, expected \"any\" or a list", k)),
            RawRoles::List(roles) => Ok(RoleRequirement::only(roles)),
        }
    }
}

impl From<RoleRequirement> for RawRoles {
    fn from(req: RoleRequirement) -> Self {
        match req {
            RoleRequirement::Any => RawRoles::Keyword("any".to_string()),
            RoleRequirement::Only(roles) => RawRoles::List(roles.into_iter().collect()),
        }
    }
}

// ============================================================================
// Route Descriptors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDescriptor {
    pub path: String,
    pub requires_auth: bool,
    pub allowed_roles: RoleRequirement,
    #[serde(default)]
    pub workspace_name: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl RouteDescriptor {
    /// A page anyone can open without signing in.
    pub fn public(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            requires_auth: false,
            allowed_roles: RoleRequirement::Any,
            workspace_name: None,
            is_active: true,
        }
    }

    /// A page that requires a session, open to every role.
    pub fn protected(path: impl Into<String>) -> Self {
        Self {
            requires_auth: true,
            ..Self::public(path)
        }
    }

    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_roles = RoleRequirement::only(roles);
        self
    }

    pub fn workspace(mut self, name: impl Into<String>) -> Self {
        self.workspace_name = Some(name.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug, Default)]
pub struct RouteRegistry {
    routes: HashMap<String, RouteDescriptor>,
    /// Lower-cased workspace name -> path
    workspaces: HashMap<String, String>,
}

impl RouteRegistry {
    /// Build a registry. When a path appears more than once the first entry
    /// wins and the rest are logged and dropped; the same applies to
    /// workspace names.
    pub fn new<I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = RouteDescriptor>,
    {
        let mut routes = HashMap::new();
        let mut workspaces = HashMap::new();

        for descriptor in descriptors {
            if routes.contains_key(&descriptor.path) {
                warn!(path = %descriptor.path, "Duplicate route entry ignored");
                continue;
            }
            if let Some(name) = descriptor.workspace_name.as_deref() {
                let key = name.trim().to_lowercase();
                if workspaces.contains_key(&key) {
                    warn!(workspace = %name, path = %descriptor.path, "Duplicate workspace name ignored");
                } else {
                    workspaces.insert(key, descriptor.path.clone());
                }
            }
            routes.insert(descriptor.path.clone(), descriptor);
        }

        debug!(routes = routes.len(), workspaces = workspaces.len(), "Route registry built");
        Self { routes, workspaces }
    }

    /// Parse a JSON array of route descriptors.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let descriptors: Vec<RouteDescriptor> = serde_json::from_str(json)?;
        if let Some(bad) = descriptors.iter().find(|d| !d.path.starts_with('/')) {
            return Err(RegistryError::InvalidPath(bad.path.clone()));
        }
        Ok(Self::new(descriptors))
    }

    /// Load a JSON route table from disk.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Exact-match lookup. Any query string or fragment on `target` is ignored.
    pub fn lookup(&self, target: &str) -> Option<&RouteDescriptor> {
        self.routes.get(path_of(target))
    }

    pub fn requires_auth(&self, target: &str) -> Option<bool> {
        self.lookup(target).map(|r| r.requires_auth)
    }

    pub fn allowed_roles(&self, target: &str) -> Option<&RoleRequirement> {
        self.lookup(target).map(|r| &r.allowed_roles)
    }

    pub fn workspace_name(&self, target: &str) -> Option<&str> {
        self.lookup(target).and_then(|r| r.workspace_name.as_deref())
    }

    /// Path registered under a workspace name. A name that is itself a
    /// registered path resolves to that path.
    pub fn path_for_workspace(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        if let Some(path) = self.workspaces.get(&name.to_lowercase()) {
            return Some(path.as_str());
        }
        if name.starts_with('/') {
            return self.routes.get(name).map(|r| r.path.as_str());
        }
        None
    }

    /// Registered and active.
    pub fn is_navigable(&self, target: &str) -> bool {
        self.lookup(target).map(|r| r.is_active).unwrap_or(false)
    }

    /// All descriptors ordered by path.
    pub fn routes(&self) -> Vec<&RouteDescriptor> {
        let mut routes: Vec<_> = self.routes.values().collect();
        routes.sort_by(|a, b| a.path.cmp(&b.path));
        routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
