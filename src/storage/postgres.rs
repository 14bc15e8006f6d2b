//! Library store backed by PostgreSQL.

use super::LibraryStore;
use crate::domain::library::{LibraryNode, LibraryPost, LibraryPostVersion, LibraryPostWithLatestVersion};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::str::FromStr;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS library_nodes (
        id TEXT PRIMARY KEY,
        slug TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        description TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS library_posts (
        id TEXT PRIMARY KEY,
        slug TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        library_node_id TEXT NOT NULL REFERENCES library_nodes(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE INDEX IF NOT EXISTS library_posts_node_idx ON library_posts (library_node_id)",
    "CREATE TABLE IF NOT EXISTS library_post_versions (
        id TEXT PRIMARY KEY,
        library_post_id TEXT NOT NULL REFERENCES library_posts(id) ON DELETE CASCADE,
        version INTEGER NOT NULL CHECK (version > 0),
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        UNIQUE (library_post_id, version)
    )",
];

// `$1` is an ILIKE pattern or NULL for "no filter".
const NODE_FILTER: &str =
    r"($1::text IS NULL OR title ILIKE $1 ESCAPE '\' OR slug ILIKE $1 ESCAPE '\')";

/// Reads library content from the `library_*` tables.
///
/// Base order is newest first (`created_at DESC`), ties broken by `id`.
#[derive(Clone)]
pub struct PostgresLibraryStore {
    pool: PgPool,
}

impl PostgresLibraryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = PgConnectOptions::from_str(database_url)?;
        Self::connect_with(options, max_connections).await
    }

    /// Every session runs with `default_transaction_read_only = on`, so writes
    /// (including [`ensure_schema`](Self::ensure_schema)) are refused by the server.
    pub async fn connect_read_only(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = PgConnectOptions::from_str(database_url)?
            .options([("default_transaction_read_only", "on")]);
        Self::connect_with(options, max_connections).await
    }

    async fn connect_with(options: PgConnectOptions, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the library tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        for stmt in SCHEMA {
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        Ok(())
    }
}

/// Escapes LIKE metacharacters and wraps the term for a substring match.
fn like_pattern(search: Option<&str>) -> Option<String> {
    search.map(|term| {
        let mut out = String::with_capacity(term.len() + 2);
        out.push('%');
        for c in term.chars() {
            if matches!(c, '%' | '_' | '\\') {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('%');
        out
    })
}

fn node_from_row(row: &PgRow) -> Result<LibraryNode> {
    Ok(LibraryNode {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn post_from_row(row: &PgRow) -> Result<LibraryPostWithLatestVersion> {
    let post = LibraryPost {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        title: row.try_get("title")?,
        library_node_id: row.try_get("library_node_id")?,
        created_at: row.try_get("created_at")?,
    };
    let latest = match row.try_get::<Option<String>, _>("version_id")? {
        Some(version_id) => {
            let version: i32 = row.try_get("version")?;
            Some(LibraryPostVersion {
                id: version_id,
                library_post_id: post.id.clone(),
                version: u32::try_from(version)
                    .map_err(|_| anyhow::anyhow!("negative version {} for post {}", version, post.id))?,
                title: row.try_get("version_title")?,
                content: row.try_get("version_content")?,
                created_at: row.try_get("version_created_at")?,
            })
        }
        None => None,
    };
    Ok(LibraryPostWithLatestVersion::new(post, latest))
}

#[async_trait]
impl LibraryStore for PostgresLibraryStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn count_nodes(&self, search: Option<&str>) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) AS total FROM library_nodes WHERE {NODE_FILTER}");
        let row = sqlx::query(&sql)
            .bind(like_pattern(search))
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = row.try_get("total")?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn list_nodes(&self, search: Option<&str>, offset: u64, limit: u32) -> Result<Vec<LibraryNode>> {
        let sql = format!(
            "SELECT id, slug, title, description, created_at, updated_at
             FROM library_nodes
             WHERE {NODE_FILTER}
             ORDER BY created_at DESC, id ASC
             LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query(&sql)
            .bind(like_pattern(search))
            .bind(i64::from(limit))
            .bind(i64::try_from(offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(node_from_row).collect()
    }

    async fn node_by_slug(&self, slug: &str) -> Result<Option<LibraryNode>> {
        let row = sqlx::query(
            "SELECT id, slug, title, description, created_at, updated_at
             FROM library_nodes WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(node_from_row).transpose()
    }

    async fn posts_with_latest_versions(&self, node_ids: &[String]) -> Result<Vec<LibraryPostWithLatestVersion>> {
        if node_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query(
            r#"
            SELECT * FROM (
                SELECT DISTINCT ON (p.id)
                       p.id, p.slug, p.title, p.library_node_id, p.created_at,
                       v.id AS version_id, v.version, v.title AS version_title,
                       v.content AS version_content, v.created_at AS version_created_at
                FROM library_posts p
                LEFT JOIN library_post_versions v ON v.library_post_id = p.id
                WHERE p.library_node_id = ANY($1)
                ORDER BY p.id, v.version DESC NULLS LAST
            ) latest
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(node_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(post_from_row).collect()
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
