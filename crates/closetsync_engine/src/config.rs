//! Configuration for the sync coordinator.

use std::time::Duration;

/// Default quiet period before a pending write is pushed to the cloud.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Configuration for a [`crate::HybridStore`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Quiet period before a pending write is pushed. Every new write to
    /// the same key restarts the window.
    pub debounce: Duration,
}

impl EngineConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    /// Sets the debounce window.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
