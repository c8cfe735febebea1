//! Debounced search session.
//!
//! Every query change bumps a generation and restarts a single timer. When the
//! timer fires it filters the corpus and publishes the outcome only if no
//! newer query arrived in the meantime.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::domain::entities::{Listing, Post};
use crate::util::lock::mutex_lock;

use super::matcher::filter_posts;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

const SOURCE: &str = "search::session";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchState {
    /// No query; show the prompt.
    #[default]
    Idle,
    Pending {
        query: String,
    },
    Results {
        query: String,
        posts: Vec<Post>,
    },
    NoResults {
        query: String,
    },
}

impl SearchState {
    pub fn is_pending(&self) -> bool {
        matches!(self, SearchState::Pending { .. })
    }

    pub fn query(&self) -> Option<&str> {
        match self {
            SearchState::Idle => None,
            SearchState::Pending { query }
            | SearchState::Results { query, .. }
            | SearchState::NoResults { query } => Some(query),
        }
    }
}

/// Published state together with the generation that produced it.
#[derive(Debug, Clone, Default)]
pub struct SearchSnapshot {
    pub generation: u64,
    pub state: SearchState,
}

struct Shared {
    delay: Duration,
    corpus: Mutex<Arc<Listing<Post>>>,
    tx: watch::Sender<SearchSnapshot>,
}

pub struct SearchSession {
    shared: Arc<Shared>,
    query: Mutex<String>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl SearchSession {
    pub fn new(delay: Duration, corpus: Arc<Listing<Post>>) -> Self {
        let (tx, _) = watch::channel(SearchSnapshot::default());
        Self {
            shared: Arc::new(Shared {
                delay,
                corpus: Mutex::new(corpus),
                tx,
            }),
            query: Mutex::new(String::new()),
            timer: Mutex::new(None),
        }
    }

    pub fn state(&self) -> SearchState {
        self.shared.tx.borrow().state.clone()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.shared.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.shared.tx.subscribe()
    }

    /// Replace the query. A blank query resets to [`SearchState::Idle`] at
    /// once; anything else is evaluated after the debounce delay.
    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        *mutex_lock(&self.query, SOURCE, "set_query") = query.clone();
        self.schedule(query);
    }

    /// Swap the corpus and evaluate the current query against it.
    pub fn set_corpus(&self, corpus: Arc<Listing<Post>>) {
        *mutex_lock(&self.shared.corpus, SOURCE, "set_corpus") = corpus;
        let query = mutex_lock(&self.query, SOURCE, "set_corpus").clone();
        self.schedule(query);
    }

    /// Wait until the current query has been evaluated.
    pub async fn settled(&self) -> SearchState {
        let mut rx = self.subscribe();
        match rx.wait_for(|snapshot| !snapshot.state.is_pending()).await {
            Ok(snapshot) => snapshot.state.clone(),
            Err(_) => SearchState::Idle,
        }
    }

    fn schedule(&self, query: String) {
        let mut timer = mutex_lock(&self.timer, SOURCE, "schedule");
        if let Some(pending) = timer.take() {
            pending.abort();
        }

        let blank = query.trim().is_empty();
        let mut generation = 0;
        self.shared.tx.send_modify(|snapshot| {
            snapshot.generation += 1;
            generation = snapshot.generation;
            snapshot.state = if blank {
                SearchState::Idle
            } else {
                SearchState::Pending {
                    query: query.clone(),
                }
            };
        });
        if blank {
            return;
        }

        let shared = Arc::clone(&self.shared);
        *timer = Some(tokio::spawn(async move {
            tokio::time::sleep(shared.delay).await;
            shared.evaluate(generation, query);
        }));
    }
}

impl Shared {
    fn evaluate(&self, generation: u64, query: String) {
        let corpus = Arc::clone(&*mutex_lock(&self.corpus, SOURCE, "evaluate"));
        let posts = filter_posts(&corpus.items, &query);
        let matched = posts.len();
        let state = if posts.is_empty() {
            SearchState::NoResults { query }
        } else {
            SearchState::Results { query, posts }
        };

        let applied = self.tx.send_if_modified(|snapshot| {
            if snapshot.generation != generation {
                return false;
            }
            snapshot.state = state;
            true
        });
        if applied {
            debug!(target_module = SOURCE, generation, matched, "search evaluated");
        } else {
            debug!(target_module = SOURCE, generation, "superseded search result dropped");
        }
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        if let Some(pending) = mutex_lock(&self.timer, SOURCE, "drop").take() {
            pending.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::domain::entities::{Pagination, Related};

    fn post(id: u64, title: &str) -> Post {
        Post {
            id,
            title: title.to_string(),
            slug: format!("post-{id}"),
            content: String::new(),
            excerpt: None,
            published_at: datetime!(2024-01-01 0:00 UTC),
            cover_image: Related::Absent,
            author: Related::Absent,
            categories: Vec::new(),
            tags: Vec::new(),
        }
    }

    fn corpus(posts: Vec<Post>) -> Arc<Listing<Post>> {
        Arc::new(Listing::new(posts, Pagination::default()))
    }

    #[tokio::test(start_paused = true)]
    async fn stays_pending_until_delay_elapses() {
        let session = SearchSession::new(DEFAULT_DEBOUNCE, corpus(vec![post(1, "Rust")]));
        session.set_query("rust");
        assert!(session.state().is_pending());

        tokio::time::advance(Duration::from_millis(299)).await;
        tokio::task::yield_now().await;
        assert!(session.state().is_pending());

        let state = session.settled().await;
        assert!(matches!(state, SearchState::Results { ref posts, .. } if posts.len() == 1));
    }

    #[tokio::test(start_paused = true)]
    async fn blank_query_resets_immediately() {
        let session = SearchSession::new(DEFAULT_DEBOUNCE, corpus(vec![post(1, "Rust")]));
        session.set_query("rust");
        session.set_query("   ");
        assert_eq!(session.state(), SearchState::Idle);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(session.state(), SearchState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn new_corpus_reevaluates_current_query() {
        let session = SearchSession::new(DEFAULT_DEBOUNCE, corpus(Vec::new()));
        session.set_query("rust");
        assert_eq!(
            session.settled().await,
            SearchState::NoResults {
                query: "rust".to_string()
            }
        );

        session.set_corpus(corpus(vec![post(1, "Rust"), post(2, "Go")]));
        assert!(session.state().is_pending());
        let SearchState::Results { posts, .. } = session.settled().await else {
            panic!("expected results");
        };
        assert_eq!(posts.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1]);
    }
}
