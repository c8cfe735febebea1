//! Cache configuration.

use std::time::Duration;

/// Query cache behaviour; built from `[cache]` settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheConfig {
    /// Age after which a settled success is refetched on the next `ensure`.
    /// `None` keeps values until they are forgotten or refetched explicitly.
    pub stale_after: Option<Duration>,
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            stale_after: settings.stale_after,
        }
    }
}

impl CacheConfig {
    pub fn with_stale_after(stale_after: Duration) -> Self {
        Self {
            stale_after: Some(stale_after),
        }
    }

    /// Whether a value settled `age` ago should be fetched again.
    pub fn is_stale(&self, age: Duration) -> bool {
        self.stale_after.is_some_and(|limit| age >= limit)
    }
}
