//! End-to-end tests for the HTTP surface.
//!
//! Each test boots a stub upstream (table service + automation webhooks) and
//! a real application server on ephemeral ports, then drives the API the way
//! the browser dashboard does. The stub counts upstream traffic, which is
//! how cache behavior (hits, invalidation, single fetch per refresh) is
//! asserted from the outside.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};

use guichet_api::{create_router, AppConfig, AppState};

const PASSWORD: &str = "s3cret-dashboard";

// ============================================================================
// STUB UPSTREAM
// ============================================================================

#[derive(Default)]
struct Stub {
    fetches: AtomicUsize,
    updates: AtomicUsize,
    restores: AtomicUsize,
    recovery_a: AtomicUsize,
    recovery_b: AtomicUsize,
    fail_update: AtomicBool,
    fail_recovery_b: AtomicBool,
    snapshots: Mutex<Vec<Value>>,
}

impl Stub {
    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

async fn stub_list(
    State(stub): State<Arc<Stub>>,
    Path((_base, table)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> Json<Value> {
    if table == "Backup Data" {
        return Json(json!({
            "records": [
                {
                    "id": "recBak2",
                    "fields": { "Date": "2025-11-02", "Id du backup": "backup-47" }
                },
                {
                    "id": "recBak1",
                    "fields": { "Date": "2025-11-01", "Id du backup": "backup-46" }
                }
            ]
        }));
    }

    let query = query.unwrap_or_default();
    if query.contains("offset=") {
        // Second and final page.
        Json(json!({
            "records": [
                {
                    "id": "rec2",
                    "fields": { "Ville": "Paris", "Ventes - Fever - Or": 25 }
                }
            ]
        }))
    } else {
        stub.fetches.fetch_add(1, Ordering::SeqCst);
        Json(json!({
            "records": [
                {
                    "id": "rec1",
                    "fields": { "Ville": "Lyon", "Ventes - Fever - Or": 10 }
                }
            ],
            "offset": "itrPage2"
        }))
    }
}

async fn stub_update(
    State(stub): State<Arc<Stub>>,
    Path((_base, _table, id)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    if stub.fail_update.load(Ordering::SeqCst) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": { "type": "INVALID_VALUE_FOR_COLUMN" } })),
        );
    }
    stub.updates.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::OK,
        Json(json!({ "id": id, "fields": body["fields"] })),
    )
}

async fn stub_restore(State(stub): State<Arc<Stub>>) -> &'static str {
    stub.restores.fetch_add(1, Ordering::SeqCst);
    "restore accepted"
}

async fn stub_snapshot(State(stub): State<Arc<Stub>>, Json(payload): Json<Value>) -> Json<Value> {
    stub.snapshots.lock().unwrap().push(payload);
    Json(json!({ "saved": true }))
}

async fn stub_recover_a(State(stub): State<Arc<Stub>>) -> &'static str {
    stub.recovery_a.fetch_add(1, Ordering::SeqCst);
    "recovery A accepted"
}

async fn stub_recover_b(State(stub): State<Arc<Stub>>) -> impl IntoResponse {
    if stub.fail_recovery_b.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "recovery B down");
    }
    stub.recovery_b.fetch_add(1, Ordering::SeqCst);
    (StatusCode::OK, "recovery B accepted")
}

fn stub_router(stub: Arc<Stub>) -> Router {
    Router::new()
        .route("/v0/:base/:table", get(stub_list))
        .route("/v0/:base/:table/:id", patch(stub_update))
        .route("/hooks/restore", post(stub_restore))
        .route("/hooks/snapshot", post(stub_snapshot))
        .route("/hooks/recover-a", post(stub_recover_a))
        .route("/hooks/recover-b", post(stub_recover_b))
        .with_state(stub)
}

// ============================================================================
// HARNESS
// ============================================================================

async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

struct Harness {
    stub: Arc<Stub>,
    base: String,
    client: reqwest::Client,
}

impl Harness {
    async fn start() -> Self {
        let stub = Arc::new(Stub::default());
        let upstream = spawn(stub_router(stub.clone())).await;

        let config = AppConfig {
            airtable_api_key: "patStubKey".to_string(),
            airtable_base_id: "appStubBase".to_string(),
            airtable_base_url: format!("http://{upstream}/v0"),
            table_name: "Allocation billetterie".to_string(),
            backup_table_name: "Backup Data".to_string(),
            snapshot_webhook_url: format!("http://{upstream}/hooks/snapshot"),
            restore_webhook_url: format!("http://{upstream}/hooks/restore"),
            recovery_webhook_urls: vec![
                format!("http://{upstream}/hooks/recover-a"),
                format!("http://{upstream}/hooks/recover-b"),
            ],
            dashboard_password: PASSWORD.to_string(),
            cache_ttl: Duration::from_secs(300),
            client_refresh_ms: 10_000,
            static_dir: PathBuf::from("static"),
        };

        let state = AppState::new(config).unwrap();
        let app = spawn(create_router(state)).await;

        Self {
            stub,
            base: format!("http://{app}"),
            client: reqwest::Client::new(),
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{}", self.base, path))
            .basic_auth("dash", Some(PASSWORD))
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}{}", self.base, path))
            .basic_auth("dash", Some(PASSWORD))
    }

    fn patch(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .patch(format!("{}{}", self.base, path))
            .basic_auth("dash", Some(PASSWORD))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[tokio::test]
async fn serves_paginated_table_through_the_cache() {
    let h = Harness::start().await;

    let records: Vec<Value> = h
        .get("/api/data")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(records.len(), 2, "both upstream pages must be merged");
    assert_eq!(records[0]["id"], "rec1");
    assert_eq!(records[1]["fields"]["Ville"], "Paris");
    assert_eq!(h.stub.fetches(), 1);

    // Fresh window: answered from cache, no new upstream traffic.
    let again: Vec<Value> = h
        .get("/api/data")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(again, records);
    assert_eq!(h.stub.fetches(), 1);

    // Forced reads always refetch.
    let response = h.get("/api/data?force=true").send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(h.stub.fetches(), 2);
}

#[tokio::test]
async fn gate_rejects_requests_without_the_shared_password() {
    let h = Harness::start().await;

    let response = h
        .client
        .get(format!("{}/api/data", h.base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let challenge = response
        .headers()
        .get("www-authenticate")
        .and_then(|value| value.to_str().ok())
        .unwrap();
    assert!(challenge.starts_with("Basic"));

    let response = h
        .client
        .get(format!("{}/api/data", h.base))
        .basic_auth("dash", Some("wrong-password"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // No upstream call was made on behalf of unauthenticated requests.
    assert_eq!(h.stub.fetches(), 0);

    // Health stays public.
    let response = h
        .client
        .get(format!("{}/health/ready", h.base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["details"]["cache"]["state"], "empty");
}

#[tokio::test]
async fn update_record_writes_through_and_invalidates_once() {
    let h = Harness::start().await;

    h.get("/api/data").send().await.unwrap();
    assert_eq!(h.stub.fetches(), 1);

    let response = h
        .patch("/api/update-record")
        .json(&json!({
            "recordId": "rec1",
            "fieldName": "Ventes - Fever - Or",
            "value": 42
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], "rec1");
    assert_eq!(body["fields"]["Ventes - Fever - Or"], 42);
    assert_eq!(h.stub.updates.load(Ordering::SeqCst), 1);

    // The snapshot was superseded: the next read must hit upstream even
    // though the TTL is nowhere near expired.
    h.get("/api/data").send().await.unwrap();
    assert_eq!(h.stub.fetches(), 2);
}

#[tokio::test]
async fn update_record_rejects_computed_and_unknown_columns() {
    let h = Harness::start().await;
    h.get("/api/data").send().await.unwrap();

    let response = h
        .patch("/api/update-record")
        .json(&json!({
            "recordId": "rec1",
            "fieldName": "Total - Ventes - Or",
            "value": 42
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "FIELD_NOT_EDITABLE");

    let response = h
        .patch("/api/update-record")
        .json(&json!({
            "recordId": "rec1",
            "fieldName": "Ventes - Fever - Bronze",
            "value": 42
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = h
        .patch("/api/update-record")
        .json(&json!({
            "recordId": "rec1",
            "fieldName": "Ventes - Fever - Or",
            "value": "quarante-deux"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // None of the rejections reached upstream or invalidated the cache.
    assert_eq!(h.stub.updates.load(Ordering::SeqCst), 0);
    h.get("/api/data").send().await.unwrap();
    assert_eq!(h.stub.fetches(), 1);
}

#[tokio::test]
async fn upstream_write_rejection_passes_status_and_body_through() {
    let h = Harness::start().await;
    h.stub.fail_update.store(true, Ordering::SeqCst);

    let response = h
        .patch("/api/update-record")
        .json(&json!({
            "recordId": "rec1",
            "fieldName": "Ventes - Fever - Or",
            "value": 42
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "UPSTREAM_WRITE");
    assert_eq!(body["details"]["status"], 422);
    assert_eq!(
        body["details"]["body"]["error"]["type"],
        "INVALID_VALUE_FOR_COLUMN"
    );
}

#[tokio::test]
async fn lists_backup_descriptors() {
    let h = Harness::start().await;

    let backups: Vec<Value> = h
        .get("/api/list-backups")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(backups.len(), 2);
    assert_eq!(backups[0]["id"], "recBak2");
    assert_eq!(backups[0]["date"], "2025-11-02");
    assert_eq!(backups[0]["backupId"], "backup-47");
}

#[tokio::test]
async fn restore_invalidates_the_cache() {
    let h = Harness::start().await;
    h.get("/api/data").send().await.unwrap();
    assert_eq!(h.stub.fetches(), 1);

    let response = h
        .post("/api/trigger-restore")
        .json(&json!({ "recordId": "recBak2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["details"], "restore accepted");
    assert_eq!(h.stub.restores.load(Ordering::SeqCst), 1);

    h.get("/api/data").send().await.unwrap();
    assert_eq!(h.stub.fetches(), 2);
}

#[tokio::test]
async fn restore_requires_a_record_id() {
    let h = Harness::start().await;

    let response = h
        .post("/api/trigger-restore")
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(h.stub.restores.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn recovery_succeeds_only_when_both_hooks_accept() {
    let h = Harness::start().await;

    let response = h.post("/api/trigger-recovery").send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(h.stub.recovery_a.load(Ordering::SeqCst), 1);
    assert_eq!(h.stub.recovery_b.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn partial_recovery_failure_reports_failure_but_still_invalidates() {
    let h = Harness::start().await;
    h.get("/api/data").send().await.unwrap();
    assert_eq!(h.stub.fetches(), 1);

    h.stub.fail_recovery_b.store(true, Ordering::SeqCst);
    let response = h.post("/api/trigger-recovery").send().await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "UPSTREAM_WRITE");

    // The accepting hook may have touched the table, so the snapshot is
    // treated as superseded even though the combined call failed.
    h.get("/api/data").send().await.unwrap();
    assert_eq!(h.stub.fetches(), 2);
}

#[tokio::test]
async fn save_snapshot_forwards_the_payload_verbatim() {
    let h = Harness::start().await;

    let payload = json!({ "records": [{ "Ville": "Lyon", "Ventes - Fever - Or": 10 }] });
    let response = h
        .post("/api/save-snapshot")
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "saved": true }));

    let stored = h.stub.snapshots.lock().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0], payload);
}

#[tokio::test]
async fn config_js_is_gated_and_carries_the_catalog_without_secrets() {
    let h = Harness::start().await;

    let response = h
        .client
        .get(format!("{}/config.js", h.base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = h.get("/config.js").send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("application/javascript"));

    let script = response.text().await.unwrap();
    assert!(script.contains("window.GUICHET_CONFIG"));
    assert!(script.contains("Ventes - Fever - Or"));
    assert!(script.contains("Taux de remplissage"));
    assert!(!script.contains("patStubKey"));
    assert!(!script.contains(PASSWORD));
}
