//! Method registry: the closed set of method names the server dispatches on.

use super::{
    ApiMethod, GetLibraryNodeBySlug, GetLibraryNodes,
    GetLibraryNodesWithLibraryPostsWithLatestVersions,
};
use std::fmt;

/// One variant per registered method.
///
/// The router matches on this enum exhaustively, so adding a variant without
/// a handler does not compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GetLibraryNodes,
    GetLibraryNodesWithLibraryPostsWithLatestVersions,
    GetLibraryNodeBySlug,
}

impl Method {
    pub const ALL: [Method; 3] = [
        Method::GetLibraryNodes,
        Method::GetLibraryNodesWithLibraryPostsWithLatestVersions,
        Method::GetLibraryNodeBySlug,
    ];

    /// Wire name of this method.
    pub const fn name(self) -> &'static str {
        match self {
            Method::GetLibraryNodes => GetLibraryNodes::NAME,
            Method::GetLibraryNodesWithLibraryPostsWithLatestVersions => {
                GetLibraryNodesWithLibraryPostsWithLatestVersions::NAME
            }
            Method::GetLibraryNodeBySlug => GetLibraryNodeBySlug::NAME,
        }
    }

    /// Resolves a wire name. Matching is exact and case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    /// Returns all registered method names.
    pub fn list_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|m| m.name()).collect()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
