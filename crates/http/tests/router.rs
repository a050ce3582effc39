use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use modrank_core::{CreatorSummary, CreatorsSnapshot, ItemRecord, ItemsSnapshot};
use modrank_http::{AppState, create_router};
use modrank_service::SnapshotStore;
use serde_json::Value;
use tower::ServiceExt;

fn item(name: &str, author: &str, downloads: u64) -> ItemRecord {
    ItemRecord {
        id: None,
        name: name.to_owned(),
        author: Some(author.to_owned()),
        authors: vec![author.to_owned()],
        download_count: downloads,
        download_rate: 1.0,
        created_at: None,
        days_existing: 1.0,
    }
}

async fn seed(dir: &Path) {
    let generated_at = Utc.with_ymd_and_hms(2024, 1, 21, 0, 0, 0).single().expect("time");
    let items = ItemsSnapshot {
        generated_at,
        items: vec![
            item("Create Deco", "Orion", 60),
            item("Create Trains", "Vega", 500),
            item("Create Lights", "Orion", 40),
        ],
    };
    let creators = CreatorsSnapshot {
        generated_at,
        creators: vec![CreatorSummary {
            name: "Orion".to_owned(),
            download_count: 100,
            item_count: 2,
            download_rate: 10.0,
            days_existing: 10.0,
        }],
    };
    SnapshotStore::new(dir).commit_snapshots(&items, &creators).await.expect("seed");
}

fn router(dir: &Path, public_dir: Option<&Path>) -> Router {
    create_router(Arc::new(AppState {
        store: SnapshotStore::new(dir),
        public_dir: public_dir.map(Path::to_path_buf),
    }))
}

async fn get(router: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    (status, body.to_vec())
}

fn json(body: &[u8]) -> Value {
    serde_json::from_slice(body).expect("json body")
}

#[tokio::test]
async fn health_is_ok() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (status, body) = get(router(dir.path(), None), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn snapshots_are_served_verbatim_under_every_alias() {
    let dir = tempfile::tempdir().expect("tempdir");
    seed(dir.path()).await;
    let on_disk = std::fs::read(dir.path().join("items.json")).expect("read");
    for uri in ["/api/items", "/api/items.json", "/api/mods", "/api/mods.json"] {
        let (status, body) = get(router(dir.path(), None), uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body, on_disk, "{uri}");
    }
    for uri in ["/api/creators", "/api/authors", "/api/authors.json"] {
        let (status, body) = get(router(dir.path(), None), uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(json(&body)["creators"][0]["name"], "Orion");
    }
}

#[tokio::test]
async fn missing_snapshot_is_json_404() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (status, body) = get(router(dir.path(), None), "/api/authors").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body), serde_json::json!({ "error": "File not found" }));
}

#[tokio::test]
async fn chart_keeps_static_rank_under_search() {
    let dir = tempfile::tempdir().expect("tempdir");
    seed(dir.path()).await;
    let (status, body) = get(router(dir.path(), None), "/api/chart?q=lights").await;
    assert_eq!(status, StatusCode::OK);
    let view = json(&body);
    assert_eq!(view["population"], "items");
    assert_eq!(view["total"], 3);
    assert_eq!(view["matched"], 1);
    assert_eq!(view["generatedAt"], "2024-01-21T00:00:00Z");
    assert_eq!(view["chart"]["mode"], "grouped");
    assert_eq!(view["chart"]["labels"][0], "#3 Create Lights (by Orion)");
}

#[tokio::test]
async fn chart_proportional_mode_has_one_series() {
    let dir = tempfile::tempdir().expect("tempdir");
    seed(dir.path()).await;
    let uri = "/api/chart?population=creators&sort=mods&mode=proportional";
    let (status, body) = get(router(dir.path(), None), uri).await;
    assert_eq!(status, StatusCode::OK);
    let view = json(&body);
    assert_eq!(view["chart"]["mode"], "proportional");
    assert_eq!(view["chart"]["series"]["sortAlias"], "mods");
    assert_eq!(view["chart"]["slices"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn chart_rejects_bad_direction() {
    let dir = tempfile::tempdir().expect("tempdir");
    seed(dir.path()).await;
    let (status, body) = get(router(dir.path(), None), "/api/chart?dir=sideways").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json(&body)["error"].as_str().is_some_and(|e| e.contains("sideways")));
}

#[tokio::test]
async fn public_dir_is_served_as_fallback() {
    let data = tempfile::tempdir().expect("tempdir");
    let public = tempfile::tempdir().expect("tempdir");
    std::fs::write(public.path().join("index.html"), "<h1>modrank</h1>").expect("write");
    let (status, body) = get(router(data.path(), Some(public.path())), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"<h1>modrank</h1>");
}
