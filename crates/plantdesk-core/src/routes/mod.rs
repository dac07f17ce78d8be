//! Static table of known pages and their access requirements.
//!
//! The registry is built once at start-up (from the built-in table or a JSON
//! file) and shared read-only as `Arc<RouteRegistry>`.

pub mod defaults;
pub mod error;
pub mod registry;

pub use error::RegistryError;
pub use registry::{RoleRequirement, RouteDescriptor, RouteRegistry};
