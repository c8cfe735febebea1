//! Page queries backed by the shared query cache.
//!
//! Each page asks for exactly one retrieval. Requests whose parameters are
//! not known yet stay [`QueryState::Idle`] and never reach the CMS.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheConfig, QueryCache, QueryKey, QueryState};
use crate::cms::error::CmsError;
use crate::cms::query::{DEFAULT_LATEST_LIMIT, DEFAULT_LISTING_LIMIT, RetrievalIntent};
use crate::config::Settings;
use crate::domain::entities::{Category, Listing, Post};

use super::source::ContentSource;

const DEFAULT_HOME_LIMIT: u32 = 9;
const DEFAULT_CORPUS_LIMIT: u32 = 100;

/// Page sizes used when building intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingLimits {
    pub home: u32,
    pub page: u32,
    pub corpus: u32,
}

impl Default for ListingLimits {
    fn default() -> Self {
        Self {
            home: DEFAULT_HOME_LIMIT,
            page: DEFAULT_LISTING_LIMIT,
            corpus: DEFAULT_CORPUS_LIMIT,
        }
    }
}

impl From<&Settings> for ListingLimits {
    fn from(settings: &Settings) -> Self {
        Self {
            home: settings.listing.home_limit.get(),
            page: settings.listing.page_limit.get(),
            corpus: settings.search.corpus_limit.get(),
        }
    }
}

/// Whether to reuse a settled entry or fetch again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Ensure,
    Refetch,
}

pub struct BlogService {
    source: Arc<dyn ContentSource>,
    listings: QueryCache<Listing<Post>>,
    posts: QueryCache<Post>,
    categories: QueryCache<Listing<Category>>,
    limits: ListingLimits,
}

impl BlogService {
    pub fn new(source: Arc<dyn ContentSource>, cache: CacheConfig, limits: ListingLimits) -> Self {
        Self {
            source,
            listings: QueryCache::new(cache),
            posts: QueryCache::new(cache),
            categories: QueryCache::new(cache),
            limits,
        }
    }

    pub fn limits(&self) -> ListingLimits {
        self.limits
    }

    pub fn home_intent(&self) -> RetrievalIntent {
        RetrievalIntent::LatestPosts {
            limit: self.limits.home,
        }
    }

    pub fn corpus_intent(&self) -> RetrievalIntent {
        RetrievalIntent::LatestPosts {
            limit: self.limits.corpus,
        }
    }

    /// Latest posts for the home page.
    pub async fn home(&self) -> QueryState<Listing<Post>> {
        self.latest(self.limits.home, Mode::Ensure).await
    }

    /// Latest posts with an explicit limit; [`DEFAULT_LATEST_LIMIT`] when
    /// `None`.
    pub async fn latest_posts(&self, limit: Option<u32>) -> QueryState<Listing<Post>> {
        self.latest(limit.unwrap_or(DEFAULT_LATEST_LIMIT), Mode::Ensure)
            .await
    }

    /// The large "everything" listing search filters over.
    pub async fn search_corpus(&self) -> QueryState<Listing<Post>> {
        self.latest(self.limits.corpus, Mode::Ensure).await
    }

    pub async fn post(&self, slug: &str) -> QueryState<Post> {
        self.post_with(slug, Mode::Ensure).await
    }

    /// Retry a post page, joining any fetch already running.
    pub async fn reload_post(&self, slug: &str) -> QueryState<Post> {
        self.post_with(slug, Mode::Refetch).await
    }

    pub async fn category_posts(&self, slug: &str) -> QueryState<Listing<Post>> {
        let intent = RetrievalIntent::PostsByCategory {
            slug: slug.to_string(),
            limit: self.limits.page,
        };
        let (slug, limit) = (slug.to_string(), self.limits.page);
        self.load(&self.listings, intent, Mode::Ensure, move |source| async move {
            source.posts_by_category(&slug, limit).await
        })
        .await
    }

    pub async fn author_posts(&self, author_id: u64) -> QueryState<Listing<Post>> {
        let limit = self.limits.page;
        let intent = RetrievalIntent::PostsByAuthor { author_id, limit };
        self.load(&self.listings, intent, Mode::Ensure, move |source| async move {
            source.posts_by_author(author_id, limit).await
        })
        .await
    }

    pub async fn tag_posts(&self, slug: &str) -> QueryState<Listing<Post>> {
        let intent = RetrievalIntent::PostsByTag {
            slug: slug.to_string(),
            limit: self.limits.page,
        };
        let (slug, limit) = (slug.to_string(), self.limits.page);
        self.load(&self.listings, intent, Mode::Ensure, move |source| async move {
            source.posts_by_tag(&slug, limit).await
        })
        .await
    }

    pub async fn categories(&self) -> QueryState<Listing<Category>> {
        self.load(
            &self.categories,
            RetrievalIntent::Categories,
            Mode::Ensure,
            |source| async move { source.categories().await },
        )
        .await
    }

    /// Cached state of `intent` without triggering a fetch.
    pub fn peek_listing(&self, intent: &RetrievalIntent) -> QueryState<Listing<Post>> {
        self.listings.get(&QueryKey::from(intent))
    }

    /// Drop whatever is cached for `intent`; a fetch still running for it is
    /// discarded when it completes.
    pub fn forget(&self, intent: &RetrievalIntent) -> bool {
        let key = QueryKey::from(intent);
        match intent {
            RetrievalIntent::PostBySlug { .. } => self.posts.forget(&key),
            RetrievalIntent::Categories => self.categories.forget(&key),
            RetrievalIntent::LatestPosts { .. }
            | RetrievalIntent::PostsByCategory { .. }
            | RetrievalIntent::PostsByAuthor { .. }
            | RetrievalIntent::PostsByTag { .. } => self.listings.forget(&key),
        }
    }

    pub fn clear(&self) {
        self.listings.clear();
        self.posts.clear();
        self.categories.clear();
    }

    async fn latest(&self, limit: u32, mode: Mode) -> QueryState<Listing<Post>> {
        let intent = RetrievalIntent::LatestPosts { limit };
        self.load(&self.listings, intent, mode, move |source| async move {
            source.latest_posts(limit).await
        })
        .await
    }

    async fn post_with(&self, slug: &str, mode: Mode) -> QueryState<Post> {
        let intent = RetrievalIntent::PostBySlug {
            slug: slug.to_string(),
        };
        let slug = slug.to_string();
        self.load(&self.posts, intent, mode, move |source| async move {
            source.post_by_slug(&slug).await
        })
        .await
    }

    async fn load<V, F, Fut>(
        &self,
        cache: &QueryCache<V>,
        intent: RetrievalIntent,
        mode: Mode,
        fetch: F,
    ) -> QueryState<V>
    where
        V: Send + Sync + 'static,
        F: FnOnce(Arc<dyn ContentSource>) -> Fut,
        Fut: Future<Output = Result<V, CmsError>> + Send + 'static,
    {
        if !intent.is_ready() {
            debug!(intent = intent.name(), "skipping retrieval with missing parameters");
            return QueryState::Idle;
        }

        let key = QueryKey::from(&intent);
        let source = Arc::clone(&self.source);
        let loader = move || fetch(source);
        match mode {
            Mode::Ensure => cache.ensure(key, loader).await,
            Mode::Refetch => cache.refetch(key, loader).await,
        }
    }
}
