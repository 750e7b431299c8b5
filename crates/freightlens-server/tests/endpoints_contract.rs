use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use freightlens_core::dates::format_iso_date;
use freightlens_core::warehouse::{NamedParam, Row, WarehouseError, WarehousePort};
use freightlens_query::{normalize_company_keyword, QueryLimits, SqliteWarehouse};
use freightlens_server::{ApiConfig, AppState, RateLimitConfig};
use rusqlite::Connection;
use serde_json::{json, Value};
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use tower::ServiceExt;

fn seeded_warehouse() -> SqliteWarehouse {
    let conn = Connection::open_in_memory().expect("open memory db");
    conn.execute_batch(
        "
        CREATE TABLE shipments (
          id                INTEGER PRIMARY KEY,
          company_id        TEXT NOT NULL,
          company_name      TEXT NOT NULL,
          company_name_norm TEXT NOT NULL,
          mode              TEXT NOT NULL,
          shipped_on        TEXT,
          snapshot_on       TEXT NOT NULL,
          origin_country    TEXT NOT NULL,
          dest_country      TEXT NOT NULL,
          carrier           TEXT,
          hs_code           TEXT,
          value_usd         REAL,
          weight_kg         REAL
        );
        ",
    )
    .expect("schema");

    let today = OffsetDateTime::now_utc().date();
    let recent = format_iso_date(today.saturating_sub(Duration::days(30)));
    let old = format_iso_date(today.saturating_sub(Duration::days(400)));
    for (id, shipped_on, mode, origin, carrier) in [
        (1, recent.as_str(), "air", "CN", "Maersk"),
        (2, recent.as_str(), "air", "CN", "Maersk"),
        (3, old.as_str(), "ocean", "DE", "MSC"),
    ] {
        conn.execute(
            "INSERT INTO shipments (id, company_id, company_name, company_name_norm, mode,
                                    shipped_on, snapshot_on, origin_country, dest_country,
                                    carrier, hs_code, value_usd, weight_kg)
             VALUES (?1, 'acme', 'Acme Freight', ?2, ?3, ?4, ?4, ?5, 'US', ?6, '8471', NULL, NULL)",
            rusqlite::params![
                id,
                normalize_company_keyword("Acme Freight"),
                mode,
                shipped_on,
                origin,
                carrier
            ],
        )
        .expect("insert");
    }
    SqliteWarehouse::new(conn)
}

fn test_router(api: ApiConfig) -> Router {
    let state = AppState::new(api, QueryLimits::default(), Arc::new(seeded_warehouse()));
    freightlens_server::build_router(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn post_search(payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/companies/search")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request")
}

#[tokio::test]
async fn search_returns_company_rows_and_total() {
    let router = test_router(ApiConfig::default());
    let response = router.oneshot(post_search(&json!({}))).await.expect("send");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total"], json!(1));
    let row = &body["rows"][0];
    assert_eq!(row["company_id"], json!("acme"));
    assert_eq!(row["shipments_12m"], json!(2));
    assert_eq!(row["top_carriers"][0], json!("Maersk"));
}

#[tokio::test]
async fn search_filters_flow_through_to_the_engine() {
    let router = test_router(ApiConfig::default());
    let response = router
        .oneshot(post_search(&json!({"filters": {"origin": ["JP"]}, "search": {}})))
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], json!(0));
    assert_eq!(body["rows"], json!([]));
}

#[tokio::test]
async fn search_validation_failures_map_to_400() {
    let router = test_router(ApiConfig::default());
    let response = router
        .oneshot(post_search(&json!({"pagination": {"limit": "bad"}})))
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], json!("validation_failed"));
    assert_eq!(
        body["error"]["details"]["field_errors"][0]["field"],
        json!("pagination.limit")
    );
}

#[tokio::test]
async fn non_json_body_maps_to_400() {
    let router = test_router(ApiConfig::default());
    let request = Request::builder()
        .method("POST")
        .uri("/v1/companies/search")
        .header("content-type", "application/json")
        .body(Body::from("not json"))
        .expect("request");
    let response = router.oneshot(request).await.expect("send");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], json!("invalid_request_body"));
}

#[tokio::test]
async fn shipments_returns_rows_newest_first() {
    let router = test_router(ApiConfig::default());
    let request = Request::builder()
        .uri("/v1/companies/shipments?company_id=acme&limit=2")
        .body(Body::empty())
        .expect("request");
    let response = router.oneshot(request).await.expect("send");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let rows = body["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["mode"], json!("air"));
    assert_eq!(rows[0]["origin_country"], json!("CN"));
}

#[tokio::test]
async fn shipments_without_company_id_maps_to_400() {
    let router = test_router(ApiConfig::default());
    let request = Request::builder()
        .uri("/v1/companies/shipments")
        .body(Body::empty())
        .expect("request");
    let response = router.oneshot(request).await.expect("send");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], json!("missing_company_id"));
}

#[tokio::test]
async fn request_id_is_propagated_from_the_caller() {
    let router = test_router(ApiConfig::default());
    let request = Request::builder()
        .method("POST")
        .uri("/v1/companies/search")
        .header("x-request-id", "req-from-gateway")
        .body(Body::from("{}"))
        .expect("request");
    let response = router.oneshot(request).await.expect("send");
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-from-gateway")
    );
}

#[tokio::test]
async fn exhausted_ip_rate_limit_maps_to_429() {
    let api = ApiConfig {
        rate_limit_per_ip: RateLimitConfig {
            capacity: 1.0,
            refill_per_sec: 0.0,
        },
        ..ApiConfig::default()
    };
    let router = test_router(api);

    let first = Request::builder()
        .method("POST")
        .uri("/v1/companies/search")
        .header("x-forwarded-for", "10.0.0.1")
        .body(Body::from("{}"))
        .expect("request");
    let response = router.clone().oneshot(first).await.expect("send");
    assert_eq!(response.status(), StatusCode::OK);

    let second = Request::builder()
        .method("POST")
        .uri("/v1/companies/search")
        .header("x-forwarded-for", "10.0.0.1")
        .body(Body::from("{}"))
        .expect("request");
    let response = router.oneshot(second).await.expect("send");
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], json!("rate_limited"));
}

#[tokio::test]
async fn readiness_probe_answers_ready() {
    let router = test_router(ApiConfig::default());
    let request = Request::builder()
        .uri("/readyz")
        .body(Body::empty())
        .expect("request");
    let response = router.oneshot(request).await.expect("send");
    assert_eq!(response.status(), StatusCode::OK);
}

struct FailingWarehouse;

#[async_trait::async_trait]
impl WarehousePort for FailingWarehouse {
    async fn run_query(
        &self,
        _sql: &str,
        _params: &[NamedParam],
    ) -> Result<Vec<Row>, WarehouseError> {
        Err(WarehouseError("connection refused".to_string()))
    }
}

fn failing_router() -> Router {
    let state = AppState::new(
        ApiConfig::default(),
        QueryLimits::default(),
        Arc::new(FailingWarehouse),
    );
    freightlens_server::build_router(state)
}

#[tokio::test]
async fn readiness_probe_fails_when_the_warehouse_is_down() {
    let request = Request::builder()
        .uri("/readyz")
        .body(Body::empty())
        .expect("request");
    let response = failing_router().oneshot(request).await.expect("send");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], json!("not_ready"));
}

#[tokio::test]
async fn warehouse_failures_surface_as_5xx_without_their_cause() {
    let response = failing_router()
        .oneshot(post_search(&json!({})))
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], json!("query_execution_failed"));
    assert!(!body["error"]["message"]
        .as_str()
        .expect("message")
        .contains("connection refused"));
}
