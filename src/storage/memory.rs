//! In-memory library store, seeded once and read-only afterwards.

use super::{node_matches, LibraryStore};
use crate::domain::library::{
    LibraryNode, LibraryPost, LibraryPostVersion, LibraryPostWithLatestVersion,
};
use anyhow::{bail, Context};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// On-disk seed format for [`MemoryLibraryStore`].
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct LibraryFixture {
    #[serde(default)]
    pub library_nodes: Vec<LibraryNode>,
    #[serde(default)]
    pub library_posts: Vec<LibraryPost>,
    #[serde(default)]
    pub library_post_versions: Vec<LibraryPostVersion>,
}

/// Library content held in memory. Nodes keep their insertion order.
#[derive(Debug, Default)]
pub struct MemoryLibraryStore {
    nodes: Vec<LibraryNode>,
    slug_index: HashMap<String, usize>,
    /// Sorted by creation time, then id.
    posts: Vec<LibraryPost>,
    latest_versions: HashMap<String, LibraryPostVersion>,
}

impl MemoryLibraryStore {
    pub fn builder() -> MemoryLibraryStoreBuilder {
        MemoryLibraryStoreBuilder::default()
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: LibraryFixture) -> anyhow::Result<Self> {
        let mut builder = Self::builder();
        for node in fixture.library_nodes {
            builder = builder.node(node);
        }
        for post in fixture.library_posts {
            builder = builder.post(post);
        }
        for version in fixture.library_post_versions {
            builder = builder.version(version);
        }
        builder.build()
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture {}", path.display()))?;
        let fixture: LibraryFixture = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse fixture {}", path.display()))?;
        let store = Self::from_fixture(fixture)
            .with_context(|| format!("invalid fixture {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            nodes = store.nodes.len(),
            posts = store.posts.len(),
            "loaded library fixture"
        );
        Ok(store)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn matching<'a>(&'a self, search: Option<&str>) -> Box<dyn Iterator<Item = &'a LibraryNode> + 'a> {
        match search {
            Some(term) => {
                let needle = term.to_lowercase();
                Box::new(self.nodes.iter().filter(move |n| node_matches(n, &needle)))
            }
            None => Box::new(self.nodes.iter()),
        }
    }
}

#[async_trait]
impl LibraryStore for MemoryLibraryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn count_nodes(&self, search: Option<&str>) -> anyhow::Result<u64> {
        Ok(self.matching(search).count() as u64)
    }

    async fn list_nodes(
        &self,
        search: Option<&str>,
        offset: u64,
        limit: u32,
    ) -> anyhow::Result<Vec<LibraryNode>> {
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        Ok(self
            .matching(search)
            .skip(skip)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn node_by_slug(&self, slug: &str) -> anyhow::Result<Option<LibraryNode>> {
        Ok(self.slug_index.get(slug).map(|&i| self.nodes[i].clone()))
    }

    async fn posts_with_latest_versions(
        &self,
        node_ids: &[String],
    ) -> anyhow::Result<Vec<LibraryPostWithLatestVersion>> {
        let wanted: HashSet<&str> = node_ids.iter().map(String::as_str).collect();
        Ok(self
            .posts
            .iter()
            .filter(|p| wanted.contains(p.library_node_id.as_str()))
            .map(|p| {
                LibraryPostWithLatestVersion::new(p.clone(), self.latest_versions.get(&p.id).cloned())
            })
            .collect())
    }
}

/// Collects content and checks referential integrity on [`build`](Self::build).
#[derive(Debug, Default)]
pub struct MemoryLibraryStoreBuilder {
    nodes: Vec<LibraryNode>,
    posts: Vec<LibraryPost>,
    versions: Vec<LibraryPostVersion>,
}

impl MemoryLibraryStoreBuilder {
    pub fn node(mut self, node: LibraryNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn nodes(mut self, nodes: impl IntoIterator<Item = LibraryNode>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    pub fn post(mut self, post: LibraryPost) -> Self {
        self.posts.push(post);
        self
    }

    pub fn version(mut self, version: LibraryPostVersion) -> Self {
        self.versions.push(version);
        self
    }

    pub fn build(self) -> anyhow::Result<MemoryLibraryStore> {
        let mut node_ids = HashSet::new();
        let mut slug_index = HashMap::with_capacity(self.nodes.len());
        for (idx, node) in self.nodes.iter().enumerate() {
            if !node_ids.insert(node.id.as_str()) {
                bail!("duplicate library node id '{}'", node.id);
            }
            if slug_index.insert(node.slug.clone(), idx).is_some() {
                bail!("duplicate library node slug '{}'", node.slug);
            }
        }

        let mut post_ids = HashSet::new();
        for post in &self.posts {
            if !post_ids.insert(post.id.as_str()) {
                bail!("duplicate library post id '{}'", post.id);
            }
            if !node_ids.contains(post.library_node_id.as_str()) {
                bail!(
                    "library post '{}' references unknown node '{}'",
                    post.id,
                    post.library_node_id
                );
            }
        }

        let mut seen_versions = HashSet::new();
        let mut latest_versions: HashMap<String, LibraryPostVersion> = HashMap::new();
        for version in self.versions {
            if !post_ids.contains(version.library_post_id.as_str()) {
                bail!(
                    "library post version '{}' references unknown post '{}'",
                    version.id,
                    version.library_post_id
                );
            }
            if !seen_versions.insert((version.library_post_id.clone(), version.version)) {
                bail!(
                    "library post '{}' has version {} more than once",
                    version.library_post_id,
                    version.version
                );
            }
            let newer = latest_versions
                .get(&version.library_post_id)
                .map_or(true, |current| version.version > current.version);
            if newer {
                latest_versions.insert(version.library_post_id.clone(), version);
            }
        }

        let mut posts = self.posts;
        posts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        Ok(MemoryLibraryStore {
            nodes: self.nodes,
            slug_index,
            posts,
            latest_versions,
        })
    }
}
