//! Configuration for the session registry.

use std::time::Duration;

/// Default idle lifetime of a session (30 minutes).
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(30 * 60);

/// Default interval between reaper sweeps (1 minute).
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Default name of the cookie carrying the session identifier.
pub const DEFAULT_COOKIE_NAME: &str = "goSessionId";

/// Configuration for the session registry.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Sessions idle for at least this long are evicted by the reaper.
    pub max_age: Duration,

    /// Interval between reaper sweeps.
    pub cleanup_interval: Duration,

    /// Cookie name used to carry the session identifier.
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_age: DEFAULT_MAX_AGE,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
        }
    }
}

impl SessionConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the idle lifetime after which a session expires.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Set the reaper interval.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Set the session cookie name.
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }
}
