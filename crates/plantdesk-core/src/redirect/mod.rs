//! Where a navigation should actually land.
//!
//! `RedirectResolver` is pure: it reads the route registry and its inputs and
//! returns a fresh `RedirectDecision`, with no I/O. All role checks in the
//! crate go through `permission::evaluate`.

pub mod decision;
pub mod permission;
pub mod resolver;

pub use decision::{RedirectDecision, RedirectReason};
pub use permission::Access;
pub use resolver::{RedirectResolver, REDIRECT_PARAM};
