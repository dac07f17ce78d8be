//! Interaction tracking and the periodic idle check.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::SessionManager;

/// Kinds of user interaction that count as activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivitySignal {
    Pointer,
    Key,
    Scroll,
    Touch,
}

impl ActivitySignal {
    pub const ALL: [ActivitySignal; 4] = [
        ActivitySignal::Pointer,
        ActivitySignal::Key,
        ActivitySignal::Scroll,
        ActivitySignal::Touch,
    ];
}

/// Forwards interaction signals to the session manager and runs the
/// periodic timeout check.
///
/// Dropping the monitor (or calling `teardown`) stops the check and detaches
/// every listener.
pub struct ActivityMonitor {
    manager: Arc<SessionManager>,
    listeners: HashSet<ActivitySignal>,
    tick: Option<JoinHandle<()>>,
}

impl ActivityMonitor {
    /// Attach listeners for every signal and spawn the periodic check on the
    /// current tokio runtime.
    pub fn start(manager: Arc<SessionManager>, interval: Duration) -> Self {
        let tick_manager = Arc::clone(&manager);
        let tick = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if tick_manager.enforce_timeouts() {
                    debug!("Periodic check logged the session out");
                }
            }
        });

        debug!(?interval, "Activity monitor started");
        Self {
            manager,
            listeners: ActivitySignal::ALL.into_iter().collect(),
            tick: Some(tick),
        }
    }

    /// Deliver an interaction. Ignored once torn down. Returns whether the
    /// session's activity was bumped.
    pub fn notify(&self, signal: ActivitySignal) -> bool {
        if !self.listeners.contains(&signal) {
            return false;
        }
        self.manager.record_activity(signal)
    }

    pub fn is_attached(&self) -> bool {
        !self.listeners.is_empty() || self.tick.is_some()
    }

    pub fn teardown(&mut self) {
        self.listeners.clear();
        if let Some(tick) = self.tick.take() {
            tick.abort();
            debug!("Activity monitor stopped");
        }
    }
}

impl Drop for ActivityMonitor {
    fn drop(&mut self) {
        self.teardown();
    }
}
