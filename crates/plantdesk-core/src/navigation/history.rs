use std::sync::{Mutex, MutexGuard};

use super::{NavigationError, Navigator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Push,
    Replace,
    Assign,
}

/// One call made through the navigator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub kind: TransitionKind,
    pub url: String,
}

#[derive(Debug)]
struct History {
    entries: Vec<String>,
    index: usize,
    transitions: Vec<Transition>,
    page_loads: usize,
}

/// In-memory browser history with a back stack.
///
/// Keeps a log of every transition so callers can see exactly what was
/// navigated and how.
#[derive(Debug)]
pub struct HistoryNavigator {
    history: Mutex<History>,
}

impl HistoryNavigator {
    pub fn new(start_url: impl Into<String>) -> Self {
        Self {
            history: Mutex::new(History {
                entries: vec![start_url.into()],
                index: 0,
                transitions: Vec::new(),
                page_loads: 1,
            }),
        }
    }

    /// Step back one entry. Returns the new current URL, or `None` at the
    /// start of history.
    pub fn back(&self) -> Option<String> {
        let mut history = self.lock();
        if history.index == 0 {
            return None;
        }
        history.index -= 1;
        Some(history.entries[history.index].clone())
    }

    pub fn entries(&self) -> Vec<String> {
        let history = self.lock();
        history.entries[..=history.index].to_vec()
    }

    pub fn transitions(&self) -> Vec<Transition> {
        self.lock().transitions.clone()
    }

    /// Number of full page loads, counting the initial one.
    pub fn page_loads(&self) -> usize {
        self.lock().page_loads
    }

    fn lock(&self) -> MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, kind: TransitionKind, url: &str) -> Result<(), NavigationError> {
        if url.is_empty() {
            return Err(NavigationError::Failed("empty URL".to_string()));
        }

        let mut history = self.lock();
        match kind {
            TransitionKind::Replace => {
                let idx = history.index;
                history.entries[idx] = url.to_string();
            }
            TransitionKind::Push | TransitionKind::Assign => {
                let keep = history.index + 1;
                history.entries.truncate(keep);
                history.entries.push(url.to_string());
                history.index = keep;
            }
        }
        if kind == TransitionKind::Assign {
            history.page_loads += 1;
        }
        history.transitions.push(Transition {
            kind,
            url: url.to_string(),
        });
        Ok(())
    }
}

impl Navigator for HistoryNavigator {
    fn current_url(&self) -> String {
        let history = self.lock();
        history.entries[history.index].clone()
    }

    fn push(&self, url: &str) -> Result<(), NavigationError> {
        self.record(TransitionKind::Push, url)
    }

    fn replace(&self, url: &str) -> Result<(), NavigationError> {
        self.record(TransitionKind::Replace, url)
    }

    fn assign(&self, url: &str) -> Result<(), NavigationError> {
        self.record(TransitionKind::Assign, url)
    }
}
