//! Session state for the signed-in user.
//!
//! This module provides:
//! - `SessionRecord`: token plus issue, expiry and last-activity timestamps
//! - `SessionManager`: login/logout/refresh/check over a `SessionStore`
//! - `ActivityMonitor`: interaction signals and the periodic idle check
//!
//! A session is valid while `now <= expires_at` and the last interaction was
//! no more than the idle timeout ago.

pub mod activity;
pub mod manager;
pub mod record;

pub use activity::{ActivityMonitor, ActivitySignal};
pub use manager::{SessionManager, SessionStatus};
pub use record::{SessionRecord, SessionSnapshot};
