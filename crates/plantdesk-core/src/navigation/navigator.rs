use super::NavigationError;

/// The router/history the app runs inside.
pub trait Navigator: Send + Sync {
    /// URL of the page currently shown.
    fn current_url(&self) -> String;

    /// Client-side transition adding a history entry.
    fn push(&self, url: &str) -> Result<(), NavigationError>;

    /// Client-side transition replacing the current history entry.
    fn replace(&self, url: &str) -> Result<(), NavigationError>;

    /// Full page load, discarding all in-memory state.
    fn assign(&self, url: &str) -> Result<(), NavigationError>;
}
