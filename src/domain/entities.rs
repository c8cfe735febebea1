//! Domain records normalized from CMS envelopes.

use time::OffsetDateTime;

pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// A relation that the CMS may or may not have populated.
///
/// `Absent` covers both "not populated" and "explicitly null" (a deleted or
/// unset relation). It is a normal state, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Related<T> {
    Present(T),
    Absent,
}

impl<T> Related<T> {
    pub fn present(&self) -> Option<&T> {
        match self {
            Related::Present(value) => Some(value),
            Related::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Related::Absent)
    }
}

impl<T> Default for Related<T> {
    fn default() -> Self {
        Related::Absent
    }
}

impl<T> From<Option<T>> for Related<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Related::Present(value),
            None => Related::Absent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub id: u64,
    /// Path or URL exactly as sent by the CMS; resolve before rendering.
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub alternative_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: u64,
    pub name: String,
    pub bio: Option<String>,
    pub avatar: Related<Media>,
}

impl Author {
    /// The name, unless the CMS sent a blank one.
    pub fn display_name(&self) -> Option<&str> {
        Some(self.name.as_str()).filter(|name| !name.trim().is_empty())
    }
}

/// Shared shape of categories and tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub id: u64,
    pub name: String,
    pub slug: String,
}

pub type Category = Term;
pub type Tag = Term;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub slug: String,
    /// Rich text as HTML.
    pub content: String,
    pub excerpt: Option<String>,
    pub published_at: OffsetDateTime,
    pub cover_image: Related<Media>,
    pub author: Related<Author>,
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
}

impl Post {
    pub fn author_name(&self) -> &str {
        self.author
            .present()
            .and_then(Author::display_name)
            .unwrap_or(UNKNOWN_AUTHOR)
    }

    pub fn author_id(&self) -> Option<u64> {
        self.author.present().map(|author| author.id)
    }

    pub fn cover_url(&self) -> Option<&str> {
        self.cover_image.present().map(|media| media.url.as_str())
    }

    pub fn category(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.slug == slug)
    }

    pub fn tag(&self, slug: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.slug == slug)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total: u64,
}

/// Ordered entities plus the pagination block of the envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Listing<T> {
    pub fn new(items: Vec<T>, pagination: Pagination) -> Self {
        Self { items, pagination }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}
