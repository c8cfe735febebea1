//! Query cache
//!
//! Process-wide store of retrieval results keyed by intent and parameters.
//! Consumers call [`QueryCache::ensure`] and get either the settled state or
//! wait on the single fetch running for that key.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! # refetch successes older than this on next use; omit to keep forever
//! stale_after_secs = 300
//! ```

mod config;
mod keys;
mod state;
mod store;

pub use config::CacheConfig;
pub use keys::QueryKey;
pub use state::QueryState;
pub use store::{
    METRIC_CACHE_DISCARDED, METRIC_CACHE_HIT, METRIC_CACHE_JOINED, METRIC_CACHE_MISS,
    METRIC_FETCH_MS, QueryCache,
};
