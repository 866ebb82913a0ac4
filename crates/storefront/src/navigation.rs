//! The "go to path" side effect.
//!
//! Services never route themselves; they ask a [`Navigator`] to move the
//! front end to a path. A browser shell would push history state, the CLI
//! prints the path.

use std::sync::{PoisonError, RwLock};

use tracing::debug;

/// Moves the front end to another screen.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Navigator that records every visited path.
///
/// Used by front ends without a router and by tests.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    history: RwLock<Vec<String>>,
}

impl HistoryNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The path navigated to last.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Every path navigated to, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, path: &str) {
        debug!(path, "Navigating");
        self.history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }
}
