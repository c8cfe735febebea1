use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use sleekblog::application::service::{BlogService, ListingLimits};
use sleekblog::cache::CacheConfig;
use sleekblog::cms::CmsClient;
use sleekblog::domain::media::MediaResolver;
use sleekblog::presentation::{text, views};
use sleekblog::search::{SearchSession, SearchState};
use url::Url;

mod support;

use support::{list_json, post_json};

fn service(server: &MockServer) -> BlogService {
    let origin = Url::parse(&server.base_url()).expect("origin");
    let client = CmsClient::new(&origin, "/api", Duration::from_secs(5)).expect("client");
    BlogService::new(
        Arc::new(client),
        CacheConfig::default(),
        ListingLimits::default(),
    )
}

fn media(server: &MockServer) -> MediaResolver {
    MediaResolver::with_default_placeholder(server.base_url())
}

#[tokio::test]
async fn missing_post_renders_removed_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/posts")
                .query_param("filters[slug][$eq]", "ghost");
            then.status(200).json_body(list_json(Vec::new()));
        })
        .await;

    let state = service(&server).post("ghost").await;
    let page = views::post_page(&state, &media(&server));
    assert_eq!(
        page,
        views::PostPage::Failed {
            message: views::POST_NOT_FOUND
        }
    );
    assert_eq!(
        text::post(&page),
        "This post may have been removed or doesn't exist.\n"
    );
}

#[tokio::test]
async fn empty_category_renders_empty_message_not_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/posts")
                .query_param("filters[categories][slug][$eq]", "poetry");
            then.status(200).json_body(list_json(Vec::new()));
        })
        .await;

    let state = service(&server).category_posts("poetry").await;
    let page = views::category_page("poetry", &state, &media(&server));
    assert_eq!(page.header.title, "poetry");
    assert_eq!(
        page.body,
        views::ListingBody::Empty {
            message: "No posts found in this category."
        }
    );
    assert!(!text::listing(&page).contains("Failed"));
}

#[tokio::test]
async fn failing_category_renders_failure_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/posts");
            then.status(502).body("bad gateway");
        })
        .await;

    let state = service(&server).category_posts("poetry").await;
    let page = views::category_page("poetry", &state, &media(&server));
    assert_eq!(
        page.body,
        views::ListingBody::Failed {
            message: views::CATEGORY_FAILED
        }
    );
}

#[tokio::test]
async fn author_page_is_titled_from_first_post() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/posts")
                .query_param("filters[author][id][$eq]", "7");
            then.status(200)
                .json_body(list_json(vec![post_json(1, "Borrowing", "borrowing")]));
        })
        .await;

    let state = service(&server).author_posts(7).await;
    let page = views::author_page(&state, &media(&server));
    assert_eq!(page.header.title, "Posts by Ada");
    let views::ListingBody::Cards(cards) = &page.body else {
        panic!("expected cards");
    };
    assert_eq!(cards[0].cover_url, "/placeholder.svg");
    assert_eq!(cards[0].published, "Mar 1, 2024");
    assert_eq!(cards[0].author.href.as_deref(), Some("/author/7"));
}

#[tokio::test]
async fn search_page_over_fetched_corpus() {
    let server = MockServer::start_async().await;
    let corpus_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/posts")
                .query_param("pagination[limit]", "100");
            then.status(200).json_body(list_json(vec![
                post_json(1, "Intro to Rust", "intro-to-rust"),
                post_json(2, "Go basics", "go-basics"),
            ]));
        })
        .await;

    let service = service(&server);
    let media = media(&server);
    let corpus = service.search_corpus().await;
    let session = SearchSession::new(
        Duration::from_millis(10),
        corpus.value().cloned().expect("corpus"),
    );

    let prompt = views::search_page(&corpus, &SearchState::Idle, &media);
    assert!(text::search(&prompt).contains("Enter a search term to find articles."));

    session.set_query("rust");
    let page = views::search_page(&corpus, &session.settled().await, &media);
    let rendered = text::search(&page);
    assert!(rendered.contains("1 results found for \"rust\""));
    assert!(rendered.contains("Intro to Rust (/blog/intro-to-rust)"));

    // Queries never go back to the CMS.
    session.set_query("go");
    session.settled().await;
    corpus_mock.assert_async().await;
}
