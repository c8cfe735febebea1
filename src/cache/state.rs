use std::fmt;
use std::sync::Arc;

use crate::cms::error::CmsError;

/// Observable state of one cache key.
///
/// Payloads and failures are shared through `Arc` so every consumer of a key
/// sees the same value without cloning it.
pub enum QueryState<V> {
    /// Never requested, forgotten, or waiting on a missing parameter.
    Idle,
    Loading,
    Success(Arc<V>),
    Error(Arc<CmsError>),
}

impl<V> QueryState<V> {
    pub fn is_idle(&self) -> bool {
        matches!(self, QueryState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, QueryState::Success(_) | QueryState::Error(_))
    }

    pub fn value(&self) -> Option<&Arc<V>> {
        match self {
            QueryState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Arc<CmsError>> {
        match self {
            QueryState::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QueryState::Idle => "idle",
            QueryState::Loading => "loading",
            QueryState::Success(_) => "success",
            QueryState::Error(_) => "error",
        }
    }
}

impl<V> Clone for QueryState<V> {
    fn clone(&self) -> Self {
        match self {
            QueryState::Idle => QueryState::Idle,
            QueryState::Loading => QueryState::Loading,
            QueryState::Success(value) => QueryState::Success(Arc::clone(value)),
            QueryState::Error(err) => QueryState::Error(Arc::clone(err)),
        }
    }
}

impl<V> Default for QueryState<V> {
    fn default() -> Self {
        QueryState::Idle
    }
}

impl<V> fmt::Debug for QueryState<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryState::Error(err) => f.debug_tuple("Error").field(err).finish(),
            other => f.write_str(other.label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_payload() {
        let state = QueryState::Success(Arc::new(vec![1, 2, 3]));
        let cloned = state.clone();
        let (Some(a), Some(b)) = (state.value(), cloned.value()) else {
            panic!("expected success");
        };
        assert!(Arc::ptr_eq(a, b));
    }

    #[test]
    fn predicates() {
        let idle: QueryState<()> = QueryState::default();
        assert!(idle.is_idle());
        assert!(!idle.is_settled());
        assert!(QueryState::<()>::Loading.is_loading());
        let failed: QueryState<()> =
            QueryState::Error(Arc::new(CmsError::not_found("post", "gone")));
        assert!(failed.is_settled());
        assert!(failed.error().is_some_and(|err| err.is_not_found()));
    }
}
