//! Envelope → domain record conversion.
//!
//! Relations arrive double-wrapped and may be null or missing; they become
//! [`Related::Absent`] or empty lists here so nothing downstream has to chase
//! optional chains.

use sleekblog_cms_types as wire;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::warn;

use crate::domain::entities::{Author, Listing, Media, Pagination, Post, Related, Term};
use crate::domain::error::DomainError;

/// Listing of posts. Rows that fail [`post`] are logged and skipped.
pub fn posts(envelope: wire::ListEnvelope<wire::PostAttributes>) -> Listing<Post> {
    let pagination = pagination(envelope.meta.pagination, envelope.data.len());
    let items = envelope
        .data
        .into_iter()
        .filter_map(|entity| {
            let id = entity.id;
            post(entity)
                .inspect_err(|err| warn!(post_id = id, reason = %err, "skipping malformed post"))
                .ok()
        })
        .collect();
    Listing::new(items, pagination)
}

pub fn terms(envelope: wire::ListEnvelope<wire::TermAttributes>) -> Listing<Term> {
    let pagination = pagination(envelope.meta.pagination, envelope.data.len());
    let items = envelope.data.into_iter().filter_map(term).collect();
    Listing::new(items, pagination)
}

/// A single post; fails on an empty slug or a missing or invalid
/// `publishedAt`.
pub fn post(entity: wire::Entity<wire::PostAttributes>) -> Result<Post, DomainError> {
    let wire::Entity { id, attributes } = entity;

    if attributes.slug.trim().is_empty() {
        return Err(DomainError::invariant(format!("post {id} has an empty slug")));
    }

    let published_at = parse_timestamp(id, attributes.published_at.as_deref())?;

    Ok(Post {
        id,
        title: attributes.title,
        slug: attributes.slug,
        content: attributes.content,
        excerpt: attributes.excerpt.filter(|value| !value.trim().is_empty()),
        published_at,
        cover_image: Related::from(attributes.cover_image.into_inner().and_then(media)),
        author: Related::from(attributes.author.into_inner().map(author)),
        categories: terms_of(attributes.categories),
        tags: terms_of(attributes.tags),
    })
}

fn parse_timestamp(id: u64, raw: Option<&str>) -> Result<OffsetDateTime, DomainError> {
    let raw = raw.ok_or_else(|| DomainError::validation(format!("post {id} has no publishedAt")))?;
    OffsetDateTime::parse(raw, &Rfc3339).map_err(|err| {
        DomainError::validation(format!("post {id} has invalid publishedAt `{raw}`: {err}"))
    })
}

fn author(entity: wire::Entity<wire::AuthorAttributes>) -> Author {
    let wire::Entity { id, attributes } = entity;
    Author {
        id,
        name: attributes.name,
        bio: attributes.bio,
        avatar: Related::from(attributes.avatar.into_inner().and_then(media)),
    }
}

/// Media without a url is as good as no media.
fn media(entity: wire::Entity<wire::MediaAttributes>) -> Option<Media> {
    let wire::Entity { id, attributes } = entity;
    if attributes.url.trim().is_empty() {
        return None;
    }
    Some(Media {
        id,
        url: attributes.url,
        width: attributes.width,
        height: attributes.height,
        alternative_text: attributes.alternative_text,
    })
}

fn terms_of(relation: wire::RelationMany<wire::TermAttributes>) -> Vec<Term> {
    relation.into_inner().into_iter().filter_map(term).collect()
}

/// Terms are addressed by slug; a term without one is dropped and a blank
/// name falls back to the slug.
fn term(entity: wire::Entity<wire::TermAttributes>) -> Option<Term> {
    let wire::Entity { id, attributes } = entity;
    if attributes.slug.trim().is_empty() {
        return None;
    }
    let name = if attributes.name.trim().is_empty() {
        attributes.slug.clone()
    } else {
        attributes.name
    };
    Some(Term {
        id,
        name,
        slug: attributes.slug,
    })
}

/// Fills in whichever of the page-based or limit-based fields the CMS left out.
fn pagination(raw: Option<wire::Pagination>, count: usize) -> Pagination {
    let raw = raw.unwrap_or_default();
    let count_u32 = u32::try_from(count).unwrap_or(u32::MAX);

    let total = raw.total.unwrap_or(count as u64);
    let page_size = raw.page_size.or(raw.limit).unwrap_or(count_u32);
    let page = raw.page.unwrap_or_else(|| match raw.start {
        Some(start) if page_size > 0 => start / page_size + 1,
        _ => 1,
    });
    let page_count = raw.page_count.unwrap_or_else(|| {
        if page_size == 0 {
            0
        } else {
            u32::try_from(total.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
        }
    });

    Pagination {
        page,
        page_size,
        page_count,
        total,
    }
}
