//! HTTP retrieval client for the CMS REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use sleekblog_cms_types::{ErrorBody, ListEnvelope, PostAttributes, TermAttributes};
use tracing::{debug, error};

use crate::application::source::ContentSource;
use crate::config::CmsSettings;
use crate::domain::entities::{Category, Listing, Post};

use super::error::CmsError;
use super::normalize;
use super::query::RetrievalIntent;

const BODY_EXCERPT_LIMIT: usize = 200;

#[derive(Clone, Debug)]
pub struct CmsClient {
    client: Client,
    base: Url,
}

impl CmsClient {
    /// `origin` is the CMS origin, `api_prefix` the path resources live under.
    pub fn new(origin: &Url, api_prefix: &str, timeout: Duration) -> Result<Self, CmsError> {
        let base = api_base(origin, api_prefix)?;
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()?;
        Ok(Self { client, base })
    }

    pub fn from_settings(settings: &CmsSettings) -> Result<Self, CmsError> {
        Self::new(&settings.origin, &settings.api_prefix, settings.timeout)
    }

    pub fn user_agent() -> &'static str {
        concat!("sleekblog/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Absolute request URL for an intent.
    pub fn url(&self, intent: &RetrievalIntent) -> Result<Url, CmsError> {
        let descriptor = intent.descriptor();
        let mut url = self.base.join(descriptor.resource.as_str())?;
        let pairs = descriptor.query_pairs();
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in &pairs {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn fetch<T: DeserializeOwned>(&self, intent: &RetrievalIntent) -> Result<T, CmsError> {
        let url = self.url(intent)?;
        debug!(intent = intent.name(), params = %intent.params(), %url, "requesting CMS");
        let response = self.client.get(url).send().await?;
        Self::handle(response).await
    }

    async fn handle<T: DeserializeOwned>(response: Response) -> Result<T, CmsError> {
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(CmsError::status(status.as_u16(), error_message(&bytes)));
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn list_posts(&self, intent: &RetrievalIntent) -> Result<Listing<Post>, CmsError> {
        let envelope: ListEnvelope<PostAttributes> = self.fetch(intent).await?;
        Ok(normalize::posts(envelope))
    }
}

#[async_trait]
impl ContentSource for CmsClient {
    async fn latest_posts(&self, limit: u32) -> Result<Listing<Post>, CmsError> {
        let intent = RetrievalIntent::LatestPosts { limit };
        logged(&intent, self.list_posts(&intent).await)
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Post, CmsError> {
        let intent = RetrievalIntent::PostBySlug {
            slug: slug.to_string(),
        };
        let result = self
            .fetch::<ListEnvelope<PostAttributes>>(&intent)
            .await
            .and_then(|envelope| {
                let entity = envelope
                    .data
                    .into_iter()
                    .next()
                    .ok_or_else(|| CmsError::not_found("post", slug))?;
                Ok(normalize::post(entity)?)
            });
        logged(&intent, result)
    }

    async fn posts_by_category(
        &self,
        category_slug: &str,
        limit: u32,
    ) -> Result<Listing<Post>, CmsError> {
        let intent = RetrievalIntent::PostsByCategory {
            slug: category_slug.to_string(),
            limit,
        };
        logged(&intent, self.list_posts(&intent).await)
    }

    async fn posts_by_author(
        &self,
        author_id: u64,
        limit: u32,
    ) -> Result<Listing<Post>, CmsError> {
        let intent = RetrievalIntent::PostsByAuthor { author_id, limit };
        logged(&intent, self.list_posts(&intent).await)
    }

    async fn posts_by_tag(&self, tag_slug: &str, limit: u32) -> Result<Listing<Post>, CmsError> {
        let intent = RetrievalIntent::PostsByTag {
            slug: tag_slug.to_string(),
            limit,
        };
        logged(&intent, self.list_posts(&intent).await)
    }

    async fn categories(&self) -> Result<Listing<Category>, CmsError> {
        let intent = RetrievalIntent::Categories;
        let result = self
            .fetch::<ListEnvelope<TermAttributes>>(&intent)
            .await
            .map(normalize::terms);
        logged(&intent, result)
    }
}

/// Log a failed retrieval with its intent before handing it back.
fn logged<T>(intent: &RetrievalIntent, result: Result<T, CmsError>) -> Result<T, CmsError> {
    if let Err(err) = &result {
        error!(
            intent = intent.name(),
            params = %intent.params(),
            failure = ?err.kind(),
            error = %err,
            "CMS retrieval failed"
        );
    }
    result
}

fn api_base(origin: &Url, api_prefix: &str) -> Result<Url, CmsError> {
    let mut origin = origin.clone();
    if !origin.path().ends_with('/') {
        let path = format!("{}/", origin.path());
        origin.set_path(&path);
    }
    let prefix = api_prefix.trim_matches('/');
    if prefix.is_empty() {
        return Ok(origin);
    }
    Ok(origin.join(&format!("{prefix}/"))?)
}

fn error_message(bytes: &[u8]) -> String {
    if let Ok(body) = serde_json::from_slice::<ErrorBody>(bytes)
        && let Some(message) = body.error.message
    {
        return message;
    }
    let text = String::from_utf8_lossy(bytes);
    text.chars().take(BODY_EXCERPT_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(origin: &str, prefix: &str) -> CmsClient {
        let origin = Url::parse(origin).expect("origin");
        CmsClient::new(&origin, prefix, Duration::from_secs(5)).expect("client")
    }

    #[test]
    fn api_base_handles_slashes() {
        assert_eq!(
            client("http://localhost:1337", "/api").base().as_str(),
            "http://localhost:1337/api/"
        );
        assert_eq!(
            client("http://cms.example.com/strapi", "api/").base().as_str(),
            "http://cms.example.com/strapi/api/"
        );
        assert_eq!(
            client("http://localhost:1337/", "").base().as_str(),
            "http://localhost:1337/"
        );
    }

    #[test]
    fn url_encodes_filter_values() {
        let client = client("http://localhost:1337", "/api");
        let url = client
            .url(&RetrievalIntent::PostBySlug {
                slug: "a&b c".to_string(),
            })
            .expect("url");
        assert_eq!(url.path(), "/api/posts");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs[0],
            ("filters[slug][$eq]".to_string(), "a&b c".to_string())
        );
    }

    #[test]
    fn categories_url_has_sort_only() {
        let client = client("http://localhost:1337", "/api");
        let url = client.url(&RetrievalIntent::Categories).expect("url");
        assert_eq!(url.path(), "/api/categories");
        assert_eq!(
            url.query_pairs().collect::<Vec<_>>(),
            vec![("sort".into(), "name:asc".into())]
        );
    }

    #[test]
    fn error_message_prefers_cms_error_body() {
        let body = br#"{"data":null,"error":{"status":500,"name":"InternalServerError","message":"Internal Server Error"}}"#;
        assert_eq!(error_message(body), "Internal Server Error");
        assert_eq!(error_message(b"plain failure"), "plain failure");
    }
}
