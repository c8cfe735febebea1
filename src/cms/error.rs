use thiserror::Error;

use crate::domain::error::DomainError;

/// How a consumer should message a failed retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The lookup succeeded but matched nothing ("this post doesn't exist").
    NotFound,
    /// Network, status or body problems ("try again later").
    Transport,
}

#[derive(Debug, Error)]
pub enum CmsError {
    #[error("invalid CMS url: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("CMS responded with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to decode CMS response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("malformed CMS record: {0}")]
    Malformed(#[from] DomainError),
    #[error("retrieval task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("{entity} `{key}` not found")]
    NotFound { entity: &'static str, key: String },
}

impl CmsError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            CmsError::NotFound { .. } => FailureKind::NotFound,
            CmsError::Url(_)
            | CmsError::Http(_)
            | CmsError::Status { .. }
            | CmsError::Decode(_)
            | CmsError::Malformed(_)
            | CmsError::Task(_) => FailureKind::Transport,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == FailureKind::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_distinguishable() {
        let err = CmsError::not_found("post", "missing-slug");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "post `missing-slug` not found");
    }

    #[test]
    fn status_and_decode_are_transport() {
        assert_eq!(
            CmsError::status(502, "bad gateway").kind(),
            FailureKind::Transport
        );
        let decode = serde_json::from_str::<u8>("nope").expect_err("invalid json");
        assert_eq!(CmsError::from(decode).kind(), FailureKind::Transport);
        assert_eq!(
            CmsError::from(DomainError::validation("bad date")).kind(),
            FailureKind::Transport
        );
    }
}
