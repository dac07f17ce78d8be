//! Client-side session and redirect resolution for the PlantDesk
//! operations app.
//!
//! This crate provides:
//! - `RouteRegistry`: the static table of known pages and their access rules
//! - `SessionManager`: login/logout/refresh and expiry/idle enforcement over a
//!   persistent `KeyValueStore`
//! - `RedirectResolver`: pure decision logic for where a navigation lands
//! - `NavigationGuard`: the render-time gate around protected pages
//! - `Navigation`: registry-validated transitions through a `Navigator`

pub mod clock;
pub mod config;
pub mod guard;
pub mod models;
pub mod navigation;
pub mod redirect;
pub mod routes;
pub mod session;
pub mod store;
pub mod utils;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AppConfig, RoutingConfig, SessionConfig};
pub use guard::{GuardPhase, GuardView, NavigationGuard};
pub use models::{AuthError, CredentialVerifier, UserProfile};
pub use navigation::{
    HistoryNavigator, NavigateOptions, Navigation, NavigationError, NavigationOutcome, Navigator,
    Transition, TransitionKind,
};
pub use redirect::{Access, RedirectDecision, RedirectReason, RedirectResolver};
pub use routes::{RegistryError, RoleRequirement, RouteDescriptor, RouteRegistry};
pub use session::{
    ActivityMonitor, ActivitySignal, SessionManager, SessionRecord, SessionSnapshot, SessionStatus,
};
pub use store::{FileStore, KeyValueStore, MemoryStore, SessionStore, StoreError};
