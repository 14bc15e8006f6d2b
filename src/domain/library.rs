//! Library content as served by the API: nodes, their posts and post versions.

use crate::domain::pagination::PaginationResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A unit of library content, addressed externally by its `slug`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LibraryNode {
    /// Opaque internal identifier.
    pub id: String,
    /// Unique, human-readable identifier used for lookups and URLs.
    pub slug: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LibraryPost {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub library_node_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LibraryPostVersion {
    pub id: String,
    pub library_post_id: String,
    /// Monotonic per post; the highest value is the latest version.
    pub version: u32,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A post together with (at most) its latest version.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LibraryPostWithLatestVersion {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub library_node_id: String,
    pub created_at: DateTime<Utc>,
    /// Empty when the post has no versions yet, otherwise exactly one element.
    pub library_post_versions: Vec<LibraryPostVersion>,
}

impl LibraryPostWithLatestVersion {
    pub fn new(post: LibraryPost, latest: Option<LibraryPostVersion>) -> Self {
        Self {
            id: post.id,
            slug: post.slug,
            title: post.title,
            library_node_id: post.library_node_id,
            created_at: post.created_at,
            library_post_versions: latest.into_iter().collect(),
        }
    }

    pub fn latest_version(&self) -> Option<&LibraryPostVersion> {
        self.library_post_versions.first()
    }
}

/// A node with its posts embedded, each carrying its latest version.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LibraryNodeWithPosts {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub library_posts: Vec<LibraryPostWithLatestVersion>,
}

impl LibraryNodeWithPosts {
    pub fn new(node: LibraryNode, library_posts: Vec<LibraryPostWithLatestVersion>) -> Self {
        Self {
            id: node.id,
            slug: node.slug,
            title: node.title,
            description: node.description,
            created_at: node.created_at,
            updated_at: node.updated_at,
            library_posts,
        }
    }
}

/// Response of `getLibraryNodes`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LibraryNodesPage {
    pub library_nodes: Vec<LibraryNode>,
    pub pagination: PaginationResult,
}

/// Response of `getLibraryNodesWithLibraryPostsWithLatestVersions`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LibraryNodesWithPostsPage {
    pub library_nodes: Vec<LibraryNodeWithPosts>,
    pub pagination: PaginationResult,
}

/// Parameters of `getLibraryNodeBySlug`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct SlugRequest {
    pub slug: String,
}

impl SlugRequest {
    pub fn new(slug: impl Into<String>) -> Self {
        Self { slug: slug.into() }
    }
}
