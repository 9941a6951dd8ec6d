use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use record_search::api::create_router;
use record_search::api::handlers::AppState;
use record_search::core::index_sync::{IndexSynchronizer, SyncReport, SyncState};
use record_search::core::query_router::QueryRouter;
use rstest::rstest;
use serde_json::{json, Value};
use tokio::sync::watch;
use tower::ServiceExt;

use crate::support::{sample_rows, MemoryRecordStore, MemorySearchIndex};

fn app(
    store: &std::sync::Arc<MemoryRecordStore>,
    index: &std::sync::Arc<MemorySearchIndex>,
    sync_state: SyncState,
) -> Router {
    let (_tx, rx) = watch::channel(sync_state);
    create_router(AppState {
        router: QueryRouter::new(store.clone(), index.clone()),
        sync_state: rx,
    })
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_is_always_healthy() {
    let store = MemoryRecordStore::new(sample_rows());
    let index = MemorySearchIndex::new();
    index.set_unreachable(true);

    let (status, body) = get(app(&store, &index, SyncState::Pending), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy" }));
}

#[tokio::test]
async fn scan_endpoint_returns_search_response() {
    let store = MemoryRecordStore::new(sample_rows());
    let index = MemorySearchIndex::new();

    let (status, body) = get(app(&store, &index, SyncState::Pending), "/search?query=apple").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "results": [
                { "id": 1, "text": "apple pie" },
                { "id": 3, "text": "apple tart" }
            ],
            "query": "apple"
        })
    );
}

#[tokio::test]
async fn scan_endpoint_decodes_percent_encoded_terms() {
    let store = MemoryRecordStore::new(sample_rows());
    let index = MemorySearchIndex::new();

    let (status, body) = get(
        app(&store, &index, SyncState::Pending),
        "/search?query=apple%20t",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "apple t");
    assert_eq!(body["results"], json!([{ "id": 3, "text": "apple tart" }]));
}

#[tokio::test]
async fn scan_endpoint_with_no_matches_returns_empty_array() {
    let store = MemoryRecordStore::new(sample_rows());
    let index = MemorySearchIndex::new();

    let (status, body) = get(app(&store, &index, SyncState::Pending), "/search?query=kiwi").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "results": [], "query": "kiwi" }));
}

#[rstest]
#[case("/search")]
#[case("/search?query=")]
#[case("/search/optimized")]
#[case("/search/optimized?query=")]
#[case("/search?query=%20%20%20")]
#[case("/search/optimized?query=%20%20%20")]
#[tokio::test]
async fn missing_query_is_a_bad_request(#[case] uri: &str) {
    let store = MemoryRecordStore::new(sample_rows());
    let index = MemorySearchIndex::new();

    let (status, body) = get(app(&store, &index, SyncState::Pending), uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert_eq!(store.calls(), 0);
    assert_eq!(index.calls(), 0);
}

#[tokio::test]
async fn scan_endpoint_hides_backend_detail_on_failure() {
    let store = MemoryRecordStore::new(sample_rows());
    store.set_unreachable(true);
    let index = MemorySearchIndex::new();

    let (status, body) = get(app(&store, &index, SyncState::Pending), "/search?query=apple").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Database error" }));
}

#[tokio::test]
async fn optimized_endpoint_returns_indexed_results() {
    let store = MemoryRecordStore::new(sample_rows());
    let index = MemorySearchIndex::new();
    IndexSynchronizer::new(store.clone(), index.clone())
        .mirror_all()
        .await
        .unwrap();

    let (status, body) = get(
        app(&store, &index, SyncState::Pending),
        "/search/optimized?query=apple",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "apple");
    let mut found = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|hit| hit["id"].as_i64().unwrap())
        .collect::<Vec<_>>();
    found.sort_unstable();
    assert_eq!(found, vec![1, 3]);
}

#[tokio::test]
async fn optimized_endpoint_reports_index_failure_in_band() {
    let store = MemoryRecordStore::new(sample_rows());
    let index = MemorySearchIndex::new();
    index.set_unreachable(true);

    let (status, body) = get(
        app(&store, &index, SyncState::Pending),
        "/search/optimized?query=apple",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "error": "Elasticsearch search failed" }));
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn ready_reflects_sync_state() {
    let store = MemoryRecordStore::new(sample_rows());
    let index = MemorySearchIndex::new();

    let (status, body) = get(app(&store, &index, SyncState::Running), "/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({ "state": "running" }));

    let completed = SyncState::Completed {
        report: SyncReport {
            scanned: 3,
            indexed: 3,
            failed: 0,
            schema_created: true,
        },
    };
    let (status, body) = get(app(&store, &index, completed), "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "completed");
    assert_eq!(body["report"]["indexed"], 3);
}
