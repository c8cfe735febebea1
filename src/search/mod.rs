//! In-process free-text search over an already fetched post corpus.

mod matcher;
mod session;

pub use matcher::{filter_posts, matches};
pub use session::{DEFAULT_DEBOUNCE, SearchSession, SearchSnapshot, SearchState};
