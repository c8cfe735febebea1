use std::error::Error as StdError;

use thiserror::Error;

use crate::{cms::error::CmsError, config::LoadError, infra::error::InfraError};

/// Top-level failure of the binary. CMS retrieval failures are rendered as
/// page states; only bootstrap problems end up here.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("failed to set up CMS client: {0}")]
    Client(#[from] CmsError),
}

impl AppError {
    /// The error followed by each of its sources, outermost first.
    pub fn chain(&self) -> Vec<String> {
        let mut messages = vec![self.to_string()];
        let mut current = self.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        messages
    }
}
