//! The multiplexer itself.

use super::RouteKind;
use crate::handlers::Handler;
use crate::http::{Request, Response};
use crate::trie::{split_path, Trie};
use sha1::{Digest, Sha1};
use std::sync::Arc;

/// A routing table: three tries, a route count, and a running
/// fingerprint of the insertion sequence.
///
/// A mux is mutated only through [`Mux::handle`] while it is being
/// built; once published through the router it is only read. Lookups
/// never panic and never fail; any fault is a miss.
#[derive(Debug, Default)]
pub struct Mux {
    exact: Trie<Arc<dyn Handler>>,
    prefix: Trie<Arc<dyn Handler>>,
    suffix: Trie<Arc<dyn Handler>>,
    count: usize,
    checksum: Sha1,
}

impl Mux {
    /// Create an empty mux.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `path` under the given route kind.
    ///
    /// Suffix paths are stored with reversed segments, so suffix
    /// lookup is a longest-prefix walk over the reversed request path.
    /// Registering the same `(path, kind)` twice overwrites the
    /// earlier handler but still advances the count and fingerprint:
    /// both track insertion history, not the final table.
    pub fn handle(&mut self, path: &str, kind: RouteKind, handler: Arc<dyn Handler>) {
        self.count += 1;
        self.checksum.update(path.as_bytes());
        self.checksum.update(kind.tag().as_bytes());

        let segments = split_path(path);
        match kind {
            RouteKind::Exact => self.exact.set(&segments, handler),
            RouteKind::Prefix => self.prefix.set(&segments, handler),
            RouteKind::Suffix => {
                let reversed: Vec<&str> = segments.iter().rev().copied().collect();
                self.suffix.set(&reversed, handler);
            },
        }
    }

    /// Find the handler registered for `path`, if any.
    ///
    /// Precedence: suffix routes (longest suffix first), then exact
    /// routes, then prefix routes (longest prefix first).
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Arc<dyn Handler>> {
        let segments = split_path(path);
        let reversed: Vec<&str> = segments.iter().rev().copied().collect();

        self.suffix
            .get_longest_prefix(&reversed)
            .or_else(|| self.exact.get(&segments))
            .or_else(|| self.prefix.get_longest_prefix(&segments))
    }

    /// Dispatch a request to its matching handler, or answer 404.
    pub async fn dispatch(&self, request: &Request) -> Response {
        match self.lookup(request.path()) {
            Some(handler) => handler.call(request).await,
            None => Response::not_found().text("not found").build(),
        }
    }

    /// Number of `handle` calls that built this mux.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.count
    }

    /// Hex SHA-1 digest of the insertion sequence: the concatenation
    /// of `path` and kind tag for every registered route, in order.
    ///
    /// Identical catalogs loaded in identical order produce identical
    /// digests, which is how operators confirm two instances carry the
    /// same table.
    #[must_use]
    pub fn route_checksum(&self) -> String {
        let digest = self.checksum.clone().finalize();
        digest.iter().map(|byte| format!("{byte:02x}")).collect()
    }
}
