//! Backing stores for library content.
//!
//! The API only ever reads from a store. Which store backs a running server is
//! decided by configuration (see [`open_store`]).

use crate::domain::library::{LibraryNode, LibraryPostWithLatestVersion};
use crate::infra::config::StoreConfig;
use async_trait::async_trait;
use std::sync::Arc;

pub mod memory;
pub mod postgres;

pub use memory::{LibraryFixture, MemoryLibraryStore, MemoryLibraryStoreBuilder};
pub use postgres::PostgresLibraryStore;

/// Read access to library content.
///
/// Implementations define the base order of nodes. Search filtering must keep
/// that order and be applied before `offset`/`limit`, so that paging walks the
/// filtered set.
#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// Short backend label for logs and health output.
    fn backend_name(&self) -> &'static str;

    /// Number of nodes matching `search` (all nodes when `None`).
    async fn count_nodes(&self, search: Option<&str>) -> anyhow::Result<u64>;

    /// Window of matching nodes in base order.
    async fn list_nodes(
        &self,
        search: Option<&str>,
        offset: u64,
        limit: u32,
    ) -> anyhow::Result<Vec<LibraryNode>>;

    /// Exact slug lookup.
    async fn node_by_slug(&self, slug: &str) -> anyhow::Result<Option<LibraryNode>>;

    /// Posts belonging to any of `node_ids`, each with at most its latest version.
    async fn posts_with_latest_versions(
        &self,
        node_ids: &[String],
    ) -> anyhow::Result<Vec<LibraryPostWithLatestVersion>>;

    /// Cheap reachability check.
    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// How a store is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Serving traffic: missing tables are created.
    Serve,
    /// Checks only. Postgres sessions are read-only and no DDL is issued.
    Inspect,
}

impl OpenMode {
    pub fn prepares_schema(self) -> bool {
        matches!(self, OpenMode::Serve)
    }
}

/// Opens the store selected by `config`.
pub async fn open_store(config: &StoreConfig, mode: OpenMode) -> anyhow::Result<Arc<dyn LibraryStore>> {
    match config {
        StoreConfig::Postgres {
            database_url,
            max_connections,
        } => {
            let store = match mode {
                OpenMode::Serve => PostgresLibraryStore::connect(database_url, *max_connections).await?,
                OpenMode::Inspect => {
                    PostgresLibraryStore::connect_read_only(database_url, *max_connections).await?
                }
            };
            if mode.prepares_schema() {
                store.ensure_schema().await?;
            }
            Ok(Arc::new(store))
        }
        StoreConfig::Fixture { path } => Ok(Arc::new(MemoryLibraryStore::from_json_file(path)?)),
        StoreConfig::Empty => Ok(Arc::new(MemoryLibraryStore::empty())),
    }
}

/// Case-insensitive substring match on title or slug.
///
/// `needle` must already be lowercased.
pub(crate) fn node_matches(node: &LibraryNode, needle: &str) -> bool {
    node.title.to_lowercase().contains(needle) || node.slug.to_lowercase().contains(needle)
}
