use std::sync::{Arc, Mutex};
use std::time::Duration;

use sleekblog::domain::entities::{Listing, Pagination, Post};
use sleekblog::search::{DEFAULT_DEBOUNCE, SearchSession, SearchState, filter_posts};

mod support;

use support::post;

fn corpus(posts: Vec<Post>) -> Arc<Listing<Post>> {
    Arc::new(Listing::new(posts, Pagination::default()))
}

fn scenario_corpus() -> Arc<Listing<Post>> {
    corpus(vec![
        post(1, "Intro to Rust", "..."),
        post(2, "Go basics", "..."),
    ])
}

#[tokio::test(start_paused = true)]
async fn query_matches_after_debounce() {
    let session = SearchSession::new(DEFAULT_DEBOUNCE, scenario_corpus());
    session.set_query("rust");

    let SearchState::Results { query, posts } = session.settled().await else {
        panic!("expected results");
    };
    assert_eq!(query, "rust");
    assert_eq!(posts.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1]);
}

#[tokio::test(start_paused = true)]
async fn only_the_last_query_is_applied() {
    let session = SearchSession::new(DEFAULT_DEBOUNCE, scenario_corpus());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let observer = tokio::spawn({
        let mut updates = session.subscribe();
        let seen = Arc::clone(&seen);
        async move {
            while updates.changed().await.is_ok() {
                let state = updates.borrow_and_update().state.clone();
                if !state.is_pending() {
                    seen.lock().expect("seen lock").push(state);
                }
            }
        }
    });

    session.set_query("go");
    tokio::time::sleep(Duration::from_millis(100)).await;
    session.set_query("rust");
    tokio::time::sleep(Duration::from_millis(100)).await;
    session.set_query("intro");

    let state = session.settled().await;
    assert!(matches!(&state, SearchState::Results { query, .. } if query == "intro"));

    tokio::time::sleep(Duration::from_secs(1)).await;
    observer.abort();

    let seen = seen.lock().expect("seen lock");
    assert!(!seen.is_empty());
    assert!(seen.iter().all(|state| state.query() == Some("intro")));
    assert_eq!(session.state(), state);
}

#[tokio::test(start_paused = true)]
async fn whitespace_query_is_idle_not_empty_results() {
    let session = SearchSession::new(DEFAULT_DEBOUNCE, scenario_corpus());
    session.set_query("   ");
    assert_eq!(session.state(), SearchState::Idle);
    assert_eq!(session.settled().await, SearchState::Idle);

    session.set_query("");
    assert_eq!(session.state(), SearchState::Idle);
}

#[tokio::test(start_paused = true)]
async fn zero_matches_is_no_results() {
    let session = SearchSession::new(DEFAULT_DEBOUNCE, scenario_corpus());
    session.set_query("haskell");
    assert_eq!(
        session.settled().await,
        SearchState::NoResults {
            query: "haskell".to_string()
        }
    );
}

#[test]
fn exact_title_always_finds_its_post() {
    let corpus = vec![
        post(1, "Intro to Rust", "<p>ownership</p>"),
        post(2, "Go basics", "<p>goroutines</p>"),
        post(3, "Ünïcode Títles", "<p>text</p>"),
    ];
    for post in &corpus {
        let found = filter_posts(&corpus, &post.title);
        assert!(found.iter().any(|candidate| candidate.id == post.id));
    }
}
