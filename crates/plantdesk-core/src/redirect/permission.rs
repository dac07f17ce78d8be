use crate::models::UserProfile;
use crate::routes::{RoleRequirement, RouteRegistry};

/// Result of checking whether a user may open a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// No route is registered at the path.
    Unregistered,
    /// The route exists but is switched off.
    Inactive,
    /// The route is limited to roles the user does not hold (or there is no
    /// user to hold them).
    RoleDenied,
}

impl Access {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted)
    }
}

/// Whether `user` may open `target`. Authentication is not considered here;
/// a route open to any role is granted even without a user.
pub fn evaluate(registry: &RouteRegistry, target: &str, user: Option<&UserProfile>) -> Access {
    let Some(route) = registry.lookup(target) else {
        return Access::Unregistered;
    };
    if !route.is_active {
        return Access::Inactive;
    }

    match (&route.allowed_roles, user) {
        (RoleRequirement::Any, _) => Access::Granted,
        (RoleRequirement::Only(_), None) => Access::RoleDenied,
        (roles, Some(user)) if roles.permits(&user.role) => Access::Granted,
        (RoleRequirement::Only(_), Some(_)) => Access::RoleDenied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::RouteDescriptor;

    fn registry() -> RouteRegistry {
        RouteRegistry::new(vec![
            RouteDescriptor::protected("/open"),
            RouteDescriptor::protected("/qa").roles(["Quality Engineer"]),
            RouteDescriptor::protected("/old").inactive(),
        ])
    }

    #[test]
    fn test_evaluate_variants() {
        let reg = registry();
        let qe = UserProfile::new("1", "Q", "quality engineer");
        let op = UserProfile::new("2", "O", "Operator");

        assert_eq!(evaluate(&reg, "/open", None), Access::Granted);
        assert_eq!(evaluate(&reg, "/open", Some(&op)), Access::Granted);
        assert_eq!(evaluate(&reg, "/qa", Some(&qe)), Access::Granted);
        assert_eq!(evaluate(&reg, "/qa", Some(&op)), Access::RoleDenied);
        assert_eq!(evaluate(&reg, "/qa", None), Access::RoleDenied);
        assert_eq!(evaluate(&reg, "/old", Some(&op)), Access::Inactive);
        assert_eq!(evaluate(&reg, "/missing", Some(&op)), Access::Unregistered);
    }

    #[test]
    fn test_query_ignored() {
        let reg = registry();
        assert!(evaluate(&reg, "/open?x=1", None).is_granted());
    }
}
