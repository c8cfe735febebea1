//! Page view models.
//!
//! Each page maps the state of its single query to exactly one of loading,
//! failure, empty or content, carrying the message a reader sees.

use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};

use crate::cache::QueryState;
use crate::cms::error::{CmsError, FailureKind};
use crate::domain::entities::{Author, Category, Listing, Post, Tag};
use crate::domain::media::MediaResolver;
use crate::search::SearchState;

pub const CARD_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:short] [day padding:none], [year]");
pub const DETAIL_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");

const EXCERPT_FALLBACK_CHARS: usize = 150;
const AUTHOR_TITLE_FALLBACK: &str = "Author";

pub const HOME_FAILED: &str = "Failed to load latest posts. Please try again later.";
pub const HOME_EMPTY: &str = "No posts found.";
pub const POST_NOT_FOUND: &str = "This post may have been removed or doesn't exist.";
pub const POST_FAILED: &str = "Failed to load the blog post. Please try again later.";
pub const CATEGORY_FAILED: &str = "Failed to load category posts. Please try again later.";
pub const CATEGORY_EMPTY: &str = "No posts found in this category.";
pub const AUTHOR_FAILED: &str = "Failed to load author posts. Please try again later.";
pub const AUTHOR_EMPTY: &str = "No posts found by this author.";
pub const TAG_FAILED: &str = "Failed to load tagged posts. Please try again later.";
pub const TAG_EMPTY: &str = "No posts found with this tag.";
pub const SEARCH_FAILED: &str = "Failed to load posts. Please try again later.";
pub const SEARCH_PROMPT: &str = "Enter a search term to find articles.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkView {
    pub label: String,
    pub href: String,
}

impl LinkView {
    fn category(category: &Category) -> Self {
        Self {
            label: category.name.clone(),
            href: format!("/category/{}", category.slug),
        }
    }

    fn tag(tag: &Tag) -> Self {
        Self {
            label: tag.name.clone(),
            href: format!("/tag/{}", tag.slug),
        }
    }
}

/// Author byline; `href` is absent when the post has no author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorLink {
    pub name: String,
    pub href: Option<String>,
}

impl AuthorLink {
    fn from_post(post: &Post) -> Self {
        Self {
            name: post.author_name().to_string(),
            href: post.author_id().map(|id| format!("/author/{id}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCard {
    pub href: String,
    pub title: String,
    pub excerpt: String,
    pub cover_url: String,
    pub categories: Vec<LinkView>,
    pub author: AuthorLink,
    pub published: String,
}

impl PostCard {
    pub fn from_post(post: &Post, media: &MediaResolver) -> Self {
        Self {
            href: format!("/blog/{}", post.slug),
            title: post.title.clone(),
            excerpt: card_excerpt(post),
            cover_url: media.resolve(post.cover_url()),
            categories: post.categories.iter().map(LinkView::category).collect(),
            author: AuthorLink::from_post(post),
            published: format_date(post.published_at, CARD_DATE_FORMAT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDetail {
    pub title: String,
    pub cover_url: String,
    pub categories: Vec<LinkView>,
    pub author: AuthorLink,
    pub published: String,
    pub content_html: String,
    pub tags: Vec<LinkView>,
}

impl PostDetail {
    pub fn from_post(post: &Post, media: &MediaResolver) -> Self {
        Self {
            title: post.title.clone(),
            cover_url: media.resolve(post.cover_url()),
            categories: post.categories.iter().map(LinkView::category).collect(),
            author: AuthorLink::from_post(post),
            published: format_date(post.published_at, DETAIL_DATE_FORMAT),
            content_html: post.content.clone(),
            tags: post.tags.iter().map(LinkView::tag).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageHeader {
    pub title: String,
    pub description: Option<String>,
}

impl PageHeader {
    fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: Some(description.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingBody {
    Loading,
    Failed { message: &'static str },
    Empty { message: &'static str },
    Cards(Vec<PostCard>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    pub header: PageHeader,
    pub body: ListingBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostPage {
    Loading,
    Failed { message: &'static str },
    Ready(Box<PostDetail>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchBody {
    /// The corpus is still loading.
    Loading,
    Failed {
        message: &'static str,
    },
    Prompt {
        message: &'static str,
    },
    /// A query is waiting for the debounce delay.
    Searching {
        query: String,
    },
    NoResults {
        message: String,
    },
    Results {
        summary: String,
        cards: Vec<PostCard>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    pub header: PageHeader,
    pub body: SearchBody,
}

/// Category links shown in the navigation bar; hidden entirely when empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryNav {
    pub links: Vec<LinkView>,
}

pub fn home_page(state: &QueryState<Listing<Post>>, media: &MediaResolver) -> ListingPage {
    ListingPage {
        header: PageHeader::new(
            "Latest Articles",
            "Discover the latest stories, insights, and ideas from our community of writers.",
        ),
        body: listing_body(state, media, HOME_FAILED, HOME_EMPTY),
    }
}

pub fn category_page(
    slug: &str,
    state: &QueryState<Listing<Post>>,
    media: &MediaResolver,
) -> ListingPage {
    let name = first_post(state)
        .and_then(|post| post.category(slug))
        .map_or(slug, |category| category.name.as_str());
    ListingPage {
        header: PageHeader::new(name, format!("Browse all articles in the {name} category.")),
        body: listing_body(state, media, CATEGORY_FAILED, CATEGORY_EMPTY),
    }
}

pub fn author_page(state: &QueryState<Listing<Post>>, media: &MediaResolver) -> ListingPage {
    let name = first_post(state)
        .and_then(|post| post.author.present())
        .and_then(Author::display_name)
        .unwrap_or(AUTHOR_TITLE_FALLBACK);
    ListingPage {
        header: PageHeader::new(
            format!("Posts by {name}"),
            format!("Browse all articles written by {name}."),
        ),
        body: listing_body(state, media, AUTHOR_FAILED, AUTHOR_EMPTY),
    }
}

pub fn tag_page(
    slug: &str,
    state: &QueryState<Listing<Post>>,
    media: &MediaResolver,
) -> ListingPage {
    let name = first_post(state)
        .and_then(|post| post.tag(slug))
        .map_or(slug, |tag| tag.name.as_str());
    ListingPage {
        header: PageHeader::new(
            format!("#{name}"),
            format!("Browse all articles tagged with #{name}."),
        ),
        body: listing_body(state, media, TAG_FAILED, TAG_EMPTY),
    }
}

/// A post page without a slug never fetches and reads as not found.
pub fn post_page(state: &QueryState<Post>, media: &MediaResolver) -> PostPage {
    match state {
        QueryState::Loading => PostPage::Loading,
        QueryState::Idle => PostPage::Failed {
            message: POST_NOT_FOUND,
        },
        QueryState::Error(err) => PostPage::Failed {
            message: post_failure_message(err),
        },
        QueryState::Success(post) => PostPage::Ready(Box::new(PostDetail::from_post(post, media))),
    }
}

pub fn post_failure_message(err: &CmsError) -> &'static str {
    match err.kind() {
        FailureKind::NotFound => POST_NOT_FOUND,
        FailureKind::Transport => POST_FAILED,
    }
}

pub fn search_page(
    corpus: &QueryState<Listing<Post>>,
    search: &SearchState,
    media: &MediaResolver,
) -> SearchPage {
    let body = match corpus {
        QueryState::Idle | QueryState::Loading => SearchBody::Loading,
        QueryState::Error(_) => SearchBody::Failed {
            message: SEARCH_FAILED,
        },
        QueryState::Success(_) => match search {
            SearchState::Idle => SearchBody::Prompt {
                message: SEARCH_PROMPT,
            },
            SearchState::Pending { query } => SearchBody::Searching {
                query: query.clone(),
            },
            SearchState::NoResults { query } => SearchBody::NoResults {
                message: format!("No articles found for \"{query}\"."),
            },
            SearchState::Results { query, posts } => SearchBody::Results {
                summary: format!("{} results found for \"{query}\"", posts.len()),
                cards: posts
                    .iter()
                    .map(|post| PostCard::from_post(post, media))
                    .collect(),
            },
        },
    };
    SearchPage {
        header: PageHeader {
            title: "Search Articles".to_string(),
            description: None,
        },
        body,
    }
}

/// Navigation categories. Failures only hide the menu; the client has
/// already logged them.
pub fn category_nav(state: &QueryState<Listing<Category>>) -> CategoryNav {
    CategoryNav {
        links: state
            .value()
            .map(|listing| listing.iter().map(LinkView::category).collect())
            .unwrap_or_default(),
    }
}

/// The explicit excerpt, or the first 150 characters of the content.
pub fn card_excerpt(post: &Post) -> String {
    match post.excerpt.as_deref() {
        Some(excerpt) => excerpt.to_string(),
        None => {
            let mut excerpt: String = post.content.chars().take(EXCERPT_FALLBACK_CHARS).collect();
            excerpt.push_str("...");
            excerpt
        }
    }
}

fn listing_body(
    state: &QueryState<Listing<Post>>,
    media: &MediaResolver,
    failed: &'static str,
    empty: &'static str,
) -> ListingBody {
    match state {
        QueryState::Loading => ListingBody::Loading,
        QueryState::Error(_) => ListingBody::Failed { message: failed },
        QueryState::Idle => ListingBody::Empty { message: empty },
        QueryState::Success(listing) if listing.is_empty() => ListingBody::Empty { message: empty },
        QueryState::Success(listing) => ListingBody::Cards(
            listing
                .iter()
                .map(|post| PostCard::from_post(post, media))
                .collect(),
        ),
    }
}

fn first_post(state: &QueryState<Listing<Post>>) -> Option<&Post> {
    state.value().and_then(|listing| listing.first())
}

fn format_date(value: OffsetDateTime, format: &[FormatItem<'_>]) -> String {
    value
        .format(format)
        .unwrap_or_else(|_| value.date().to_string())
}
