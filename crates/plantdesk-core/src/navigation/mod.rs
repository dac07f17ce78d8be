//! Page transitions.
//!
//! `Navigator` is the seam to the actual router/history. `Navigation` checks
//! every target against the route registry before handing it over, falling
//! back to a safe page instead of landing on a dead route.

pub mod error;
pub mod history;
pub mod navigator;
pub mod utility;

pub use error::NavigationError;
pub use history::{HistoryNavigator, Transition, TransitionKind};
pub use navigator::Navigator;
pub use utility::{NavigateOptions, Navigation, NavigationOutcome};
