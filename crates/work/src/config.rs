//! Manager configuration.

/// Tunables for [`crate::WorkloadManager`].
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Activity records shown on the dashboard
    pub recent_activity_limit: usize,
    /// Activity records returned when the caller gives no limit
    pub default_activity_limit: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            recent_activity_limit: 10,
            default_activity_limit: 20,
        }
    }
}

impl ManagerConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many activity records the dashboard shows.
    pub fn with_recent_activity_limit(mut self, limit: usize) -> Self {
        self.recent_activity_limit = limit;
        self
    }

    /// Set the default activity page size.
    pub fn with_default_activity_limit(mut self, limit: usize) -> Self {
        self.default_activity_limit = limit;
        self
    }
}
