//! Cache key definitions.
//!
//! A key is the retrieval intent name plus its canonical parameter string, so
//! `post_by_slug(slug=a)` and `post_by_slug(slug=b)` never share an entry.

use std::fmt;

use crate::cms::query::RetrievalIntent;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    intent: &'static str,
    params: String,
}

impl QueryKey {
    pub fn new(intent: &'static str, params: impl Into<String>) -> Self {
        Self {
            intent,
            params: params.into(),
        }
    }

    pub fn intent(&self) -> &'static str {
        self.intent
    }

    pub fn params(&self) -> &str {
        &self.params
    }
}

impl From<&RetrievalIntent> for QueryKey {
    fn from(intent: &RetrievalIntent) -> Self {
        Self::new(intent.name(), intent.params())
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            f.write_str(self.intent)
        } else {
            write!(f, "{}?{}", self.intent, self.params)
        }
    }
}
