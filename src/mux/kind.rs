//! Route kinds.

use std::fmt;

/// How a registered path matches incoming request paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    /// Matches iff the request's segment sequence equals the
    /// registered sequence.
    Exact,
    /// Matches iff the registered sequence is a (possibly empty)
    /// prefix of the request's segment sequence.
    Prefix,
    /// Matches iff the registered sequence is a suffix of the
    /// request's segment sequence.
    Suffix,
}

impl RouteKind {
    /// Parse the catalog's `route_type` field. Anything other than
    /// `prefix` or `suffix` is treated as exact.
    #[must_use]
    pub fn from_catalog(route_type: &str) -> Self {
        match route_type {
            "prefix" => RouteKind::Prefix,
            "suffix" => RouteKind::Suffix,
            _ => RouteKind::Exact,
        }
    }

    /// The tag mixed into the route fingerprint after the path bytes.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            RouteKind::Exact => "(exact)",
            RouteKind::Prefix => "(prefix)",
            RouteKind::Suffix => "(suffix)",
        }
    }
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RouteKind::Exact => "exact",
            RouteKind::Prefix => "prefix",
            RouteKind::Suffix => "suffix",
        };
        write!(f, "{name}")
    }
}
