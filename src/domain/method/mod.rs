//! Method contracts for the dispatch API.
//!
//! Every remote call is addressed by a method name alone. This module binds
//! each name to the parameter and response types that travel with it, so the
//! client can only send what the server expects and decodes exactly what the
//! server returns:
//!
//! ```ignore
//! let page = client
//!     .request::<GetLibraryNodes>(PaginationRequest::new(1, 20))
//!     .await?;
//! ```

use crate::domain::library::{LibraryNode, LibraryNodesPage, LibraryNodesWithPostsPage, SlugRequest};
use crate::domain::pagination::PaginationRequest;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod registry;

pub use registry::Method;

/// Contract for a single API method.
///
/// Implementors are zero-sized markers; a method that has no implementor
/// cannot be requested, so unknown names are caught at build time on the
/// client side. The server resolves names through [`Method`].
pub trait ApiMethod {
    /// Wire name, used as the sole routing key.
    const NAME: &'static str;

    /// Registry variant for this contract.
    const METHOD: Method;

    type Parameters: Serialize + DeserializeOwned + Send + Sync + 'static;
    type Response: Serialize + DeserializeOwned + Send + Sync + 'static;
}

/// Paginated listing of library nodes.
pub struct GetLibraryNodes;

impl ApiMethod for GetLibraryNodes {
    const NAME: &'static str = "getLibraryNodes";
    const METHOD: Method = Method::GetLibraryNodes;
    type Parameters = PaginationRequest;
    type Response = LibraryNodesPage;
}

/// Paginated listing that embeds each node's posts with their latest version.
pub struct GetLibraryNodesWithLibraryPostsWithLatestVersions;

impl ApiMethod for GetLibraryNodesWithLibraryPostsWithLatestVersions {
    const NAME: &'static str = "getLibraryNodesWithLibraryPostsWithLatestVersions";
    const METHOD: Method = Method::GetLibraryNodesWithLibraryPostsWithLatestVersions;
    type Parameters = PaginationRequest;
    type Response = LibraryNodesWithPostsPage;
}

/// Single node lookup by exact slug.
pub struct GetLibraryNodeBySlug;

impl ApiMethod for GetLibraryNodeBySlug {
    const NAME: &'static str = "getLibraryNodeBySlug";
    const METHOD: Method = Method::GetLibraryNodeBySlug;
    type Parameters = SlugRequest;
    type Response = LibraryNode;
}
