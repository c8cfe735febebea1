//! Resolution of CMS media references into renderable URLs.

pub const DEFAULT_PLACEHOLDER: &str = "/placeholder.svg";

const ABSOLUTE_SCHEMES: [&str; 3] = ["http://", "https://", "data:"];

/// Turns CMS-relative asset paths into absolute URLs.
///
/// Total over its input: a malformed path yields a well-formed string that may
/// point nowhere, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaResolver {
    origin: String,
    placeholder: String,
}

impl MediaResolver {
    pub fn new(origin: impl Into<String>, placeholder: impl Into<String>) -> Self {
        let origin = origin.into();
        Self {
            origin: origin.trim_end_matches('/').to_string(),
            placeholder: placeholder.into(),
        }
    }

    pub fn with_default_placeholder(origin: impl Into<String>) -> Self {
        Self::new(origin, DEFAULT_PLACEHOLDER)
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn resolve(&self, path: Option<&str>) -> String {
        let Some(path) = path.filter(|value| !value.is_empty()) else {
            return self.placeholder.clone();
        };

        if is_absolute(path) {
            return path.to_string();
        }

        if path.starts_with('/') {
            format!("{}{path}", self.origin)
        } else {
            format!("{}/{path}", self.origin)
        }
    }
}

fn is_absolute(path: &str) -> bool {
    ABSOLUTE_SCHEMES.iter().any(|scheme| {
        path.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}
