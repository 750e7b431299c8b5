use crate::AppState;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use freightlens_api::{
    map_error, normalize_search_request, parse_shipment_params, search_response_dto,
    shipments_response_dto, ApiError, ApiErrorCode,
};
use freightlens_core::dates;
use freightlens_query::{
    classify_query, company_shipments, normalized_query_hash, search_companies, QueryClass,
    ShipmentQuery,
};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::Ordering;
use std::time::Instant;
use tokio::sync::OwnedSemaphorePermit;
use tracing::{info, warn};

pub(crate) fn error_json(code: ApiErrorCode, message: &str, details: Value) -> ApiError {
    ApiError::new(code, message, details)
}

pub(crate) fn api_error_response(err: &ApiError) -> Response {
    let status = StatusCode::from_u16(map_error(err).status_code)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({"error": err}))).into_response()
}

pub(crate) fn make_request_id(state: &AppState) -> String {
    let id = state.request_id_seed.fetch_add(1, Ordering::Relaxed);
    format!("req-{id:016x}")
}

pub(crate) fn propagated_request_id(headers: &HeaderMap, state: &AppState) -> String {
    if let Some(raw) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    if let Some(raw) = headers.get("traceparent").and_then(|v| v.to_str().ok()) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return format!("trace-{trimmed}");
        }
    }
    make_request_id(state)
}

pub(crate) fn with_request_id(mut response: Response, request_id: &str) -> Response {
    if let Ok(v) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert("x-request-id", v);
    }
    response
}

async fn enforce_ip_rate_limit(state: &AppState, headers: &HeaderMap) -> Option<Response> {
    if !state.api.enable_ip_rate_limit {
        return None;
    }
    let ip = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok())?;
    if state.ip_limiter.allow(ip, &state.api.rate_limit_per_ip).await {
        None
    } else {
        Some(api_error_response(&error_json(
            ApiErrorCode::RateLimited,
            "rate limit exceeded",
            json!({"scope": "ip"}),
        )))
    }
}

fn acquire_class_permit(
    state: &AppState,
    class: QueryClass,
) -> Result<Option<OwnedSemaphorePermit>, ApiError> {
    let sem = match class {
        QueryClass::Medium => state.class_medium.clone(),
        QueryClass::Heavy => state.class_heavy.clone(),
        _ => return Ok(None),
    };
    sem.try_acquire_owned().map(Some).map_err(|_| {
        error_json(
            ApiErrorCode::QueryRejectedByPolicy,
            "concurrency limit reached",
            json!({"class": format!("{class:?}")}),
        )
    })
}

fn timeout_error(state: &AppState) -> ApiError {
    error_json(
        ApiErrorCode::QueryExecutionFailed,
        "warehouse query timed out",
        json!({"timeout_ms": state.api.sql_timeout.as_millis() as u64}),
    )
}

pub(crate) async fn search_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);

    if let Some(resp) = enforce_ip_rate_limit(&state, &headers).await {
        return with_request_id(resp, &request_id);
    }

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            let resp = api_error_response(&ApiError::invalid_body(&e.to_string()));
            return with_request_id(resp, &request_id);
        }
    };

    let query = match normalize_search_request(&payload) {
        Ok(q) => q,
        Err(err) => return with_request_id(api_error_response(&err), &request_id),
    };

    let class = classify_query(&query);
    let _permit = match acquire_class_permit(&state, class) {
        Ok(p) => p,
        Err(err) => return with_request_id(api_error_response(&err), &request_id),
    };

    let fingerprint =
        normalized_query_hash(&query).unwrap_or_else(|_| "unavailable".to_string());
    info!(request_id = %request_id, class = ?class, query_hash = %fingerprint, "search start");

    let outcome = tokio::time::timeout(
        state.api.sql_timeout,
        search_companies(
            state.warehouse.as_ref(),
            &query,
            &state.limits,
            dates::today_utc(),
        ),
    )
    .await;

    let response = match outcome {
        Err(_) => {
            warn!(request_id = %request_id, "warehouse query timed out");
            api_error_response(&timeout_error(&state))
        }
        Ok(Err(err)) => {
            warn!(request_id = %request_id, code = ?err.code, cause = %err.message, "search failed");
            api_error_response(&ApiError::from(err))
        }
        Ok(Ok(page)) => match search_response_dto(&page) {
            Ok(dto) => (StatusCode::OK, Json(dto)).into_response(),
            Err(err) => api_error_response(&err),
        },
    };

    let elapsed = started.elapsed();
    if elapsed > state.api.slow_query_threshold {
        warn!(request_id = %request_id, elapsed_ms = elapsed.as_millis() as u64, "slow search");
    }
    info!(
        request_id = %request_id,
        status = response.status().as_u16(),
        elapsed_ms = elapsed.as_millis() as u64,
        "search finish"
    );
    with_request_id(response, &request_id)
}

pub(crate) async fn shipments_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);

    if let Some(resp) = enforce_ip_rate_limit(&state, &headers).await {
        return with_request_id(resp, &request_id);
    }

    let parse_map: BTreeMap<String, String> =
        params.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    let parsed = match parse_shipment_params(&parse_map) {
        Ok(v) => v,
        Err(err) => return with_request_id(api_error_response(&err), &request_id),
    };
    let req = ShipmentQuery::from(parsed);
    info!(request_id = %request_id, company_id = %req.company_id, "shipments start");

    let outcome = tokio::time::timeout(
        state.api.sql_timeout,
        company_shipments(state.warehouse.as_ref(), &req, &state.limits),
    )
    .await;

    let response = match outcome {
        Err(_) => {
            warn!(request_id = %request_id, "warehouse query timed out");
            api_error_response(&timeout_error(&state))
        }
        Ok(Err(err)) => {
            warn!(request_id = %request_id, code = ?err.code, cause = %err.message, "shipments failed");
            api_error_response(&ApiError::from(err))
        }
        Ok(Ok(rows)) => (StatusCode::OK, Json(shipments_response_dto(&rows))).into_response(),
    };

    info!(
        request_id = %request_id,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "shipments finish"
    );
    with_request_id(response, &request_id)
}

pub(crate) async fn healthz_handler() -> Response {
    (StatusCode::OK, "ok").into_response()
}

pub(crate) async fn readyz_handler(State(state): State<AppState>) -> Response {
    match state.warehouse.run_query("SELECT 1", &[]).await {
        Ok(_) => (StatusCode::OK, Json(json!({"status": "ready"}))).into_response(),
        Err(e) => {
            warn!(cause = %e, "readiness probe failed");
            api_error_response(&error_json(
                ApiErrorCode::NotReady,
                "warehouse unavailable",
                json!({}),
            ))
        }
    }
}
