//! Wire shapes of the Strapi-style REST envelope.
//!
//! Every response is `{ data, meta }`. Each entity is wrapped as
//! `{ id, attributes }` and every relation attribute is wrapped once more as
//! `{ data: null | {..} | [..] }`. A relation key that was not populated is
//! simply missing from `attributes`; both cases deserialize to an empty
//! relation here so the consumer only ever deals with "present" or "absent".
//!
//! Scalar attributes of related entities may also come back `null`; they
//! decode to empty strings and are treated as missing downstream.

use serde::{Deserialize, Deserializer, Serialize};

/// Collection response wrapper.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(bound(deserialize = "A: Deserialize<'de>"))]
pub struct ListEnvelope<A> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub data: Vec<Entity<A>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: Meta,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Meta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Pagination block.
///
/// Page-based requests report `page`/`pageSize`/`pageCount`; limit-based
/// requests report `start`/`limit`. Both carry `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub page_count: Option<u32>,
    #[serde(default)]
    pub start: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// `{ id, attributes }` wrapper shared by every entity.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Entity<A> {
    pub id: u64,
    pub attributes: A,
}

/// To-one relation: `{ data: null | { id, attributes } }`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RelationOne<A> {
    #[serde(default = "Option::default")]
    pub data: Option<Entity<A>>,
}

impl<A> Default for RelationOne<A> {
    fn default() -> Self {
        Self { data: None }
    }
}

impl<A> RelationOne<A> {
    pub fn into_inner(self) -> Option<Entity<A>> {
        self.data
    }
}

/// To-many relation: `{ data: [ { id, attributes }, .. ] }`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(bound(deserialize = "A: Deserialize<'de>"))]
pub struct RelationMany<A> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub data: Vec<Entity<A>>,
}

impl<A> Default for RelationMany<A> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

impl<A> RelationMany<A> {
    pub fn into_inner(self) -> Vec<Entity<A>> {
        self.data
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAttributes {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cover_image: RelationOne<MediaAttributes>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: RelationOne<AuthorAttributes>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: RelationMany<TermAttributes>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: RelationMany<TermAttributes>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AuthorAttributes {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub avatar: RelationOne<MediaAttributes>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAttributes {
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub alternative_text: Option<String>,
}

/// Attributes shared by categories and tags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TermAttributes {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
}

/// Error body sent alongside non-2xx responses.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_and_null_relations_are_empty() {
        let raw = json!({
            "title": "Hello",
            "slug": "hello",
            "content": "<p>hi</p>",
            "publishedAt": "2024-03-01T10:00:00.000Z",
            "author": { "data": null },
            "categories": null
        });

        let attrs: PostAttributes = serde_json::from_value(raw).expect("post attributes");
        assert!(attrs.author.data.is_none());
        assert!(attrs.cover_image.data.is_none());
        assert!(attrs.categories.data.is_empty());
        assert!(attrs.tags.data.is_empty());
    }

    #[test]
    fn null_scalars_in_relations_decode_as_empty() {
        let raw = json!({
            "data": [{
                "id": 2,
                "attributes": {
                    "title": "Anonymous",
                    "slug": "anonymous",
                    "publishedAt": "2024-03-01T10:00:00.000Z",
                    "coverImage": { "data": { "id": 9, "attributes": { "url": null } } },
                    "author": { "data": { "id": 7, "attributes": { "name": null } } },
                    "categories": { "data": [
                        { "id": 3, "attributes": { "name": null, "slug": "rust" } }
                    ] }
                }
            }]
        });

        let envelope: ListEnvelope<PostAttributes> =
            serde_json::from_value(raw).expect("list envelope");
        let attrs = &envelope.data[0].attributes;
        let author = attrs.author.data.as_ref().expect("author");
        assert_eq!(author.attributes.name, "");
        let cover = attrs.cover_image.data.as_ref().expect("cover");
        assert_eq!(cover.attributes.url, "");
        assert_eq!(attrs.categories.data[0].attributes.name, "");
    }

    #[test]
    fn list_envelope_with_limit_pagination() {
        let raw = json!({
            "data": [
                { "id": 3, "attributes": { "name": "Rust", "slug": "rust" } }
            ],
            "meta": { "pagination": { "start": 0, "limit": 10, "total": 1 } }
        });

        let envelope: ListEnvelope<TermAttributes> =
            serde_json::from_value(raw).expect("list envelope");
        assert_eq!(envelope.data.len(), 1);
        assert_eq!(envelope.data[0].attributes.slug, "rust");
        let pagination = envelope.meta.pagination.expect("pagination");
        assert_eq!(pagination.limit, Some(10));
        assert_eq!(pagination.total, Some(1));
        assert_eq!(pagination.page, None);
    }

    #[test]
    fn envelope_without_meta_defaults() {
        let raw = json!({ "data": [] });
        let envelope: ListEnvelope<TermAttributes> =
            serde_json::from_value(raw).expect("list envelope");
        assert_eq!(envelope.meta, Meta::default());
    }

    #[test]
    fn error_body_parses() {
        let raw = json!({
            "data": null,
            "error": { "status": 404, "name": "NotFoundError", "message": "Not Found" }
        });
        let body: ErrorBody = serde_json::from_value(raw).expect("error body");
        assert_eq!(body.error.status, Some(404));
        assert_eq!(body.error.message.as_deref(), Some("Not Found"));
    }
}
