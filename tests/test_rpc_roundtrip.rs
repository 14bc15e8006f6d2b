//! End-to-end dispatch test: start the router on an ephemeral port and drive it
//! through `LibraryClient` (and raw reqwest where the typed client cannot go).

use chrono::{Duration, TimeZone, Utc};
use library_api::domain::library::SlugRequest;
use library_api::infra::config::ClientConfig;
use library_api::transport::wire::{ApiErrorBody, ErrorCode};
use library_api::transport::http::HealthEnvelope;
use library_api::{
    transport, ClientError, GetLibraryNodeBySlug, GetLibraryNodes,
    GetLibraryNodesWithLibraryPostsWithLatestVersions, LibraryClient, LibraryNode, LibraryService,
    MemoryLibraryStore, PaginationRequest, PaginationResult,
};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::json;
use std::sync::Arc;

fn nodes(count: usize) -> Vec<LibraryNode> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| LibraryNode {
            id: format!("node-{i:03}"),
            slug: format!("article-{i}"),
            title: if i % 9 == 0 {
                format!("Tokio internals part {i}")
            } else {
                format!("Article {i}")
            },
            description: Some(format!("Description {i}")),
            created_at: base + Duration::hours(i as i64),
            updated_at: base + Duration::hours(i as i64),
        })
        .collect()
}

/// Spawns the API on 127.0.0.1:0 and returns its base URL.
async fn spawn_server(count: usize) -> Result<String, Box<dyn std::error::Error>> {
    let store = MemoryLibraryStore::builder().nodes(nodes(count)).build()?;
    serve(store).await
}

async fn serve(store: MemoryLibraryStore) -> Result<String, Box<dyn std::error::Error>> {
    let app_state = transport::http::AppState::new(LibraryService::new(Arc::new(store)));
    let router = transport::http::create_router(app_state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Ok(format!("http://127.0.0.1:{}", port))
}

async fn spawn_client(count: usize) -> Result<(String, LibraryClient), Box<dyn std::error::Error>> {
    let base_url = spawn_server(count).await?;
    let client = LibraryClient::new(&ClientConfig::new(base_url.clone()))?;
    Ok((base_url, client))
}

#[tokio::test]
async fn test_pages_over_45_nodes() -> Result<(), Box<dyn std::error::Error>> {
    let (_, client) = spawn_client(45).await?;

    // Scenario A
    let first = client.get_library_nodes(PaginationRequest::new(1, 20)).await?;
    assert_eq!(first.library_nodes.len(), 20);
    assert_eq!(
        first.pagination,
        PaginationResult {
            page: 1,
            items_per_page: 20,
            pages_total: 3
        }
    );

    // Scenario B
    let third = client.get_library_nodes(PaginationRequest::new(3, 20)).await?;
    assert_eq!(third.library_nodes.len(), 5);
    assert_eq!(third.library_nodes[0].slug, "article-40");

    // Scenario C
    let fourth = client.get_library_nodes(PaginationRequest::new(4, 20)).await?;
    assert!(fourth.library_nodes.is_empty());
    assert_eq!(fourth.pagination.pages_total, 3);
    Ok(())
}

#[tokio::test]
async fn test_page_and_size_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let (_, client) = spawn_client(45).await?;
    for (page, per_page) in [(1, 1), (2, 7), (5, 10), (12, 4), (100, 3)] {
        let result = client
            .request::<GetLibraryNodes>(PaginationRequest::new(page, per_page))
            .await?;
        assert_eq!(result.pagination.page, page);
        assert_eq!(result.pagination.items_per_page, per_page);
        let expected_total = std::cmp::max(1, (45 + per_page - 1) / per_page);
        assert_eq!(result.pagination.pages_total, expected_total);
    }
    Ok(())
}

#[tokio::test]
async fn test_defaults_when_parameters_omitted() -> Result<(), Box<dyn std::error::Error>> {
    let (_, client) = spawn_client(45).await?;
    let page = client.request_without_parameters::<GetLibraryNodes>().await?;
    assert_eq!(page.pagination.page, 1);
    assert_eq!(page.pagination.items_per_page, 20);
    assert_eq!(page.library_nodes.len(), 20);
    Ok(())
}

#[tokio::test]
async fn test_search_filters_before_paging() -> Result<(), Box<dyn std::error::Error>> {
    let (_, client) = spawn_client(45).await?;
    // Matches i = 0, 9, 18, 27, 36.
    let req = PaginationRequest::new(1, 2).with_search_term("TOKIO");
    let page = client.get_library_nodes(req).await?;
    assert_eq!(page.pagination.pages_total, 3);
    let slugs: Vec<_> = page.library_nodes.iter().map(|n| n.slug.as_str()).collect();
    assert_eq!(slugs, ["article-0", "article-9"]);

    let last = client
        .get_library_nodes(PaginationRequest::new(3, 2).with_search_term("tokio"))
        .await?;
    assert_eq!(last.library_nodes.len(), 1);
    assert_eq!(last.library_nodes[0].slug, "article-36");
    Ok(())
}

#[tokio::test]
async fn test_slug_lookup() -> Result<(), Box<dyn std::error::Error>> {
    let (_, client) = spawn_client(10).await?;

    let a = client.get_library_node_by_slug("article-7").await?;
    let b = client
        .request::<GetLibraryNodeBySlug>(SlugRequest::new("article-7"))
        .await?;
    assert_eq!(a, b);
    assert_eq!(a.id, "node-007");

    // Scenario D
    let err = client
        .get_library_node_by_slug("does-not-exist")
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
    match err {
        ClientError::Api { status, .. } => assert_eq!(status, reqwest::StatusCode::NOT_FOUND),
        other => panic!("expected Api error, got {other:?}"),
    }

    // No partial matching.
    let err = client.get_library_node_by_slug("article").await.unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn test_variant_listing_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/library.json");
    let base_url = serve(MemoryLibraryStore::from_json_file(fixture)?).await?;
    let client = LibraryClient::new(&ClientConfig::new(base_url.clone()))?;

    let first = client
        .request::<GetLibraryNodesWithLibraryPostsWithLatestVersions>(PaginationRequest::new(1, 2))
        .await?;
    assert_eq!(
        first.pagination,
        PaginationResult {
            page: 1,
            items_per_page: 2,
            pages_total: 2
        }
    );
    let slugs: Vec<_> = first.library_nodes.iter().map(|n| n.slug.as_str()).collect();
    assert_eq!(slugs, ["getting-started", "async-rust-patterns"]);

    let getting_started = &first.library_nodes[0];
    assert_eq!(getting_started.library_posts.len(), 2);
    let install = &getting_started.library_posts[0];
    assert_eq!(install.slug, "installing");
    assert_eq!(install.library_post_versions.len(), 1);
    assert_eq!(install.library_post_versions[0].id, "post-install-v2");
    assert_eq!(install.library_post_versions[0].version, 2);
    assert!(getting_started.library_posts[1].library_post_versions.is_empty());

    let select = &first.library_nodes[1].library_posts[0];
    assert_eq!(select.library_post_versions[0].version, 1);

    let second = client
        .get_library_nodes_with_latest_versions(PaginationRequest::new(2, 2))
        .await?;
    assert_eq!(second.pagination.pages_total, 2);
    assert_eq!(second.library_nodes.len(), 1);
    assert!(second.library_nodes[0].library_posts.is_empty());

    // Wire names as sent by the server.
    let raw: serde_json::Value = reqwest::Client::new()
        .post(format!("{}/api", base_url))
        .json(&json!({
            "method": "getLibraryNodesWithLibraryPostsWithLatestVersions",
            "parameters": { "page": 1, "itemsPerPage": 1 }
        }))
        .send()
        .await?
        .json()
        .await?;
    let post = &raw["data"]["libraryNodes"][0]["libraryPosts"][0];
    assert_eq!(post["libraryPostVersions"][0]["version"], 2);
    assert_eq!(raw["data"]["pagination"]["pagesTotal"], 3);
    Ok(())
}

#[tokio::test]
async fn test_unknown_method_and_malformed_body() -> Result<(), Box<dyn std::error::Error>> {
    let base_url = spawn_server(3).await?;
    let http = reqwest::Client::new();

    // Scenario E
    let resp = http
        .post(format!("{}/api", base_url))
        .json(&json!({ "method": "unregisteredMethod", "parameters": {} }))
        .send()
        .await?;
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    let body: ApiErrorBody = resp.json().await?;
    assert_eq!(body.error.code, ErrorCode::UnknownMethod);
    assert!(body.error.message.contains("unregisteredMethod"));

    let resp = http
        .post(format!("{}/api", base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(resp.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    let body: ApiErrorBody = resp.json().await?;
    assert_eq!(body.error.code, ErrorCode::InvalidParameters);

    let resp = http
        .post(format!("{}/api", base_url))
        .json(&json!({ "method": "getLibraryNodes", "parameters": { "itemsPerPage": 0 } }))
        .send()
        .await?;
    assert_eq!(resp.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    let body: ApiErrorBody = resp.json().await?;
    assert_eq!(body.error.code, ErrorCode::InvalidParameters);
    Ok(())
}

#[tokio::test]
async fn test_invalid_parameters_surface_through_client() -> Result<(), Box<dyn std::error::Error>> {
    let (_, client) = spawn_client(3).await?;
    let err = client
        .get_library_nodes(PaginationRequest::new(0, 20))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::InvalidParameters));
    Ok(())
}

#[tokio::test]
async fn test_custom_headers_are_accepted() -> Result<(), Box<dyn std::error::Error>> {
    let (_, client) = spawn_client(3).await?;
    let mut headers = HeaderMap::new();
    headers.insert("x-request-id", HeaderValue::from_static("test-123"));
    let page = client
        .request_with_headers::<GetLibraryNodes>(PaginationRequest::default(), headers)
        .await?;
    assert_eq!(page.library_nodes.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_requests_share_one_client() -> Result<(), Box<dyn std::error::Error>> {
    let (_, client) = spawn_client(45).await?;
    let mut handles = Vec::new();
    for page in 1..=3u32 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.get_library_nodes(PaginationRequest::new(page, 20)).await
        }));
    }
    let mut sizes = Vec::new();
    for handle in handles {
        sizes.push(handle.await??.library_nodes.len());
    }
    assert_eq!(sizes, [20, 20, 5]);
    Ok(())
}

#[tokio::test]
async fn test_health_endpoint() -> Result<(), Box<dyn std::error::Error>> {
    let base_url = spawn_server(1).await?;
    let resp = reqwest::get(format!("{}/health", base_url)).await?;
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: HealthEnvelope = resp.json().await?;
    assert_eq!(body.data.status, "ok");
    assert_eq!(body.data.backend, "memory");
    assert_eq!(body.data.error, None);
    Ok(())
}
