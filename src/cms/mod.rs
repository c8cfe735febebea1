//! CMS adapter: query mapping, wire normalization and the HTTP client.

pub mod client;
pub mod error;
pub mod normalize;
pub mod query;

pub use client::CmsClient;
pub use error::{CmsError, FailureKind};
pub use query::RetrievalIntent;
