//! Content handlers for the library API.
//!
//! This is where pagination and slug resolution happen. The service reads
//! through a [`LibraryStore`] and never mutates it, so one instance can be
//! shared across all requests.

use crate::domain::library::{
    LibraryNode, LibraryNodeWithPosts, LibraryNodesPage, LibraryNodesWithPostsPage,
    LibraryPostWithLatestVersion,
};
use crate::domain::pagination::{compute_pagination, PaginationRequest, PaginationResult};
use crate::storage::LibraryStore;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("library node with slug '{0}' not found")]
    NotFound(String),

    #[error("{0}")]
    InvalidParameters(String),

    #[error("library store failure: {0:#}")]
    Store(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, LibraryError>;

pub struct LibraryService {
    store: Arc<dyn LibraryStore>,
}

impl LibraryService {
    pub fn new(store: Arc<dyn LibraryStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn LibraryStore> {
        &self.store
    }

    /// Filters by the search term (if any), then returns the requested page.
    ///
    /// A page past the end yields no nodes but still reports the real `pagesTotal`.
    pub async fn list_library_nodes(&self, request: &PaginationRequest) -> Result<LibraryNodesPage> {
        let (library_nodes, pagination) = self.page_of_nodes(request).await?;
        Ok(LibraryNodesPage {
            library_nodes,
            pagination,
        })
    }

    /// Same page as [`list_library_nodes`](Self::list_library_nodes), with each
    /// node's posts and their latest versions embedded.
    pub async fn list_library_nodes_with_latest_versions(
        &self,
        request: &PaginationRequest,
    ) -> Result<LibraryNodesWithPostsPage> {
        let (nodes, pagination) = self.page_of_nodes(request).await?;

        let node_ids: Vec<String> = nodes.iter().map(|n| n.id.clone()).collect();
        let mut posts_by_node: HashMap<String, Vec<LibraryPostWithLatestVersion>> = HashMap::new();
        for post in self.store.posts_with_latest_versions(&node_ids).await? {
            posts_by_node
                .entry(post.library_node_id.clone())
                .or_default()
                .push(post);
        }

        let library_nodes = nodes
            .into_iter()
            .map(|node| {
                let posts = posts_by_node.remove(&node.id).unwrap_or_default();
                LibraryNodeWithPosts::new(node, posts)
            })
            .collect();

        Ok(LibraryNodesWithPostsPage {
            library_nodes,
            pagination,
        })
    }

    /// Exact slug lookup; no prefix or case-insensitive matching.
    pub async fn get_library_node_by_slug(&self, slug: &str) -> Result<LibraryNode> {
        self.store
            .node_by_slug(slug)
            .await?
            .ok_or_else(|| LibraryError::NotFound(slug.to_string()))
    }

    async fn page_of_nodes(
        &self,
        request: &PaginationRequest,
    ) -> Result<(Vec<LibraryNode>, PaginationResult)> {
        request.validate().map_err(LibraryError::InvalidParameters)?;
        let search = request.search_term();

        let total = self.store.count_nodes(search).await?;
        let pagination = compute_pagination(total, request.page, request.items_per_page);

        let nodes = if request.offset() >= total {
            Vec::new()
        } else {
            self.store
                .list_nodes(search, request.offset(), request.items_per_page)
                .await?
        };

        tracing::debug!(
            backend = self.store.backend_name(),
            search = search.unwrap_or(""),
            total,
            page = request.page,
            returned = nodes.len(),
            "listed library nodes"
        );
        Ok((nodes, pagination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::library::{LibraryPost, LibraryPostVersion};
    use crate::storage::MemoryLibraryStore;
    use chrono::{TimeZone, Utc};

    fn node(i: usize) -> LibraryNode {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        LibraryNode {
            id: format!("id-{i}"),
            slug: format!("node-{i}"),
            title: if i % 10 == 0 {
                format!("Rust guide {i}")
            } else {
                format!("Article {i}")
            },
            description: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn service_with(count: usize) -> LibraryService {
        let store = MemoryLibraryStore::builder()
            .nodes((0..count).map(node))
            .build()
            .unwrap();
        LibraryService::new(Arc::new(store))
    }

    #[tokio::test]
    async fn first_page_of_45() {
        let svc = service_with(45);
        let page = svc.list_library_nodes(&PaginationRequest::new(1, 20)).await.unwrap();
        assert_eq!(page.library_nodes.len(), 20);
        assert_eq!(
            page.pagination,
            PaginationResult {
                page: 1,
                items_per_page: 20,
                pages_total: 3
            }
        );
        assert_eq!(page.library_nodes[0].slug, "node-0");
    }

    #[tokio::test]
    async fn last_partial_page_of_45() {
        let svc = service_with(45);
        let page = svc.list_library_nodes(&PaginationRequest::new(3, 20)).await.unwrap();
        assert_eq!(page.library_nodes.len(), 5);
        assert_eq!(page.library_nodes[0].slug, "node-40");
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty_not_an_error() {
        let svc = service_with(45);
        let page = svc.list_library_nodes(&PaginationRequest::new(4, 20)).await.unwrap();
        assert!(page.library_nodes.is_empty());
        assert_eq!(page.pagination.pages_total, 3);
        assert_eq!(page.pagination.page, 4);
    }

    #[tokio::test]
    async fn empty_store_reports_one_page() {
        let svc = service_with(0);
        let page = svc.list_library_nodes(&PaginationRequest::default()).await.unwrap();
        assert!(page.library_nodes.is_empty());
        assert_eq!(page.pagination.pages_total, 1);
    }

    #[tokio::test]
    async fn search_is_applied_before_paging() {
        let svc = service_with(45);
        // Titles "Rust guide 0", "Rust guide 10", ... "Rust guide 40".
        let req = PaginationRequest::new(2, 2).with_search_term("rust");
        let page = svc.list_library_nodes(&req).await.unwrap();
        assert_eq!(page.pagination.pages_total, 3);
        let slugs: Vec<_> = page.library_nodes.iter().map(|n| n.slug.as_str()).collect();
        assert_eq!(slugs, ["node-20", "node-30"]);
    }

    #[tokio::test]
    async fn blank_search_lists_everything() {
        let svc = service_with(45);
        let req = PaginationRequest::new(1, 100).with_search_term("  ");
        let page = svc.list_library_nodes(&req).await.unwrap();
        assert_eq!(page.library_nodes.len(), 45);
    }

    #[tokio::test]
    async fn zero_page_is_rejected() {
        let svc = service_with(3);
        let err = svc.list_library_nodes(&PaginationRequest::new(0, 20)).await.unwrap_err();
        assert!(matches!(err, LibraryError::InvalidParameters(_)));
        let err = svc.list_library_nodes(&PaginationRequest::new(1, 0)).await.unwrap_err();
        assert!(matches!(err, LibraryError::InvalidParameters(_)));
    }

    #[tokio::test]
    async fn slug_lookup_hits_and_misses() {
        let svc = service_with(5);
        let first = svc.get_library_node_by_slug("node-3").await.unwrap();
        let again = svc.get_library_node_by_slug("node-3").await.unwrap();
        assert_eq!(first, again);
        assert_eq!(first.id, "id-3");

        let err = svc.get_library_node_by_slug("does-not-exist").await.unwrap_err();
        assert!(matches!(err, LibraryError::NotFound(ref s) if s == "does-not-exist"));
        assert!(matches!(
            svc.get_library_node_by_slug("node").await,
            Err(LibraryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn embeds_latest_versions_per_node() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let post = |id: &str, node_id: &str| LibraryPost {
            id: id.to_string(),
            slug: id.to_string(),
            title: id.to_string(),
            library_node_id: node_id.to_string(),
            created_at: ts,
        };
        let version = |post_id: &str, v: u32| LibraryPostVersion {
            id: format!("{post_id}-{v}"),
            library_post_id: post_id.to_string(),
            version: v,
            title: format!("{post_id} v{v}"),
            content: "body".to_string(),
            created_at: ts,
        };
        let store = MemoryLibraryStore::builder()
            .nodes((0..3).map(node))
            .post(post("a", "id-0"))
            .post(post("b", "id-0"))
            .post(post("c", "id-2"))
            .version(version("a", 1))
            .version(version("a", 2))
            .version(version("c", 1))
            .build()
            .unwrap();
        let svc = LibraryService::new(Arc::new(store));

        let page = svc
            .list_library_nodes_with_latest_versions(&PaginationRequest::new(1, 2))
            .await
            .unwrap();
        assert_eq!(page.library_nodes.len(), 2);
        assert_eq!(page.pagination.pages_total, 2);

        let first = &page.library_nodes[0];
        assert_eq!(first.library_posts.len(), 2);
        assert_eq!(first.library_posts[0].library_post_versions[0].title, "a v2");
        assert!(first.library_posts[1].library_post_versions.is_empty());
        assert!(page.library_nodes[1].library_posts.is_empty());

        let second = svc
            .list_library_nodes_with_latest_versions(&PaginationRequest::new(2, 2))
            .await
            .unwrap();
        assert_eq!(second.library_nodes[0].library_posts[0].id, "c");
    }
}
