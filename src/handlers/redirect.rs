//! Redirect handler.

use super::Handler;
use crate::http::{Request, Response};
use crate::trie::split_path;
use async_trait::async_trait;
use http::StatusCode;

/// Issues 301/302 redirects for a declared route.
///
/// For a prefix-source route the part of the incoming path beyond the
/// matched prefix is appended to the target, and the query string is
/// preserved. The joined location never carries a trailing slash
/// unless it is the bare root.
#[derive(Debug)]
pub struct RedirectHandler {
    source_segments: Vec<String>,
    target: String,
    prefix: bool,
    temporary: bool,
}

impl RedirectHandler {
    /// Create a redirect from `source_path` to `target`.
    #[must_use]
    pub fn new(source_path: &str, target: impl Into<String>, prefix: bool, temporary: bool) -> Self {
        Self {
            source_segments: split_path(source_path)
                .into_iter()
                .map(str::to_owned)
                .collect(),
            target: target.into(),
            prefix,
            temporary,
        }
    }

    /// Append the unmatched tail of `path` to the target.
    fn location_for(&self, path: &str) -> String {
        let segments = split_path(path);
        let tail = segments
            .get(self.source_segments.len()..)
            .unwrap_or_default();

        let mut location = self.target.trim_end_matches('/').to_owned();
        for segment in tail {
            location.push('/');
            location.push_str(segment);
        }
        if location.is_empty() {
            location.push('/');
        }
        location
    }
}

#[async_trait]
impl Handler for RedirectHandler {
    async fn call(&self, request: &Request) -> Response {
        let mut location = if self.prefix {
            self.location_for(request.path())
        } else {
            self.target.clone()
        };

        if self.prefix {
            if let Some(query) = request.query() {
                location.push('?');
                location.push_str(query);
            }
        }

        let status = if self.temporary {
            StatusCode::FOUND
        } else {
            StatusCode::MOVED_PERMANENTLY
        };

        Response::builder()
            .status(status)
            .header("location", location)
            .build()
    }
}
