#![allow(dead_code)]

use serde_json::{Value, json};
use sleekblog::domain::entities::{Post, Related};
use time::macros::datetime;

pub fn post_json(id: u64, title: &str, slug: &str) -> Value {
    json!({
        "id": id,
        "attributes": {
            "title": title,
            "slug": slug,
            "content": format!("<p>{title} body</p>"),
            "excerpt": null,
            "publishedAt": "2024-03-01T10:00:00.000Z",
            "coverImage": { "data": null },
            "author": { "data": { "id": 7, "attributes": { "name": "Ada" } } },
            "categories": { "data": [
                { "id": 2, "attributes": { "name": "Programming", "slug": "programming" } }
            ] }
        }
    })
}

pub fn list_json(items: Vec<Value>) -> Value {
    let total = items.len();
    json!({
        "data": items,
        "meta": { "pagination": { "page": 1, "pageSize": 25, "pageCount": 1, "total": total } }
    })
}

pub fn post(id: u64, title: &str, content: &str) -> Post {
    Post {
        id,
        title: title.to_string(),
        slug: format!("post-{id}"),
        content: content.to_string(),
        excerpt: None,
        published_at: datetime!(2024-01-01 0:00 UTC),
        cover_image: Related::Absent,
        author: Related::Absent,
        categories: Vec::new(),
        tags: Vec::new(),
    }
}
