pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::library_service::{LibraryError, LibraryService};
pub use domain::library::{LibraryNode, LibraryNodeWithPosts, LibraryNodesPage, LibraryNodesWithPostsPage};
pub use domain::method::{
    ApiMethod, GetLibraryNodeBySlug, GetLibraryNodes, GetLibraryNodesWithLibraryPostsWithLatestVersions,
    Method,
};
pub use domain::pagination::{compute_pagination, PaginationRequest, PaginationResult};
pub use storage::{open_store, LibraryStore, MemoryLibraryStore, OpenMode, PostgresLibraryStore};
pub use transport::client::{ClientError, LibraryClient};
