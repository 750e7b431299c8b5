#![forbid(unsafe_code)]

pub const CRATE_NAME: &str = "freightlens-server";

pub mod api_config;
mod http;
mod rate_limiter;

pub use api_config::{ApiConfig, RateLimitConfig};

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use freightlens_core::warehouse::WarehousePort;
use freightlens_query::QueryLimits;
use rate_limiter::RateLimiter;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tokio::sync::Semaphore;

#[derive(Clone)]
pub struct AppState {
    pub api: ApiConfig,
    pub limits: QueryLimits,
    pub warehouse: Arc<dyn WarehousePort>,
    pub(crate) ip_limiter: Arc<RateLimiter>,
    pub(crate) class_medium: Arc<Semaphore>,
    pub(crate) class_heavy: Arc<Semaphore>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    #[must_use]
    pub fn new(api: ApiConfig, limits: QueryLimits, warehouse: Arc<dyn WarehousePort>) -> Self {
        let class_medium = Arc::new(Semaphore::new(api.concurrency_medium));
        let class_heavy = Arc::new(Semaphore::new(api.concurrency_heavy));
        Self {
            api,
            limits,
            warehouse,
            ip_limiter: Arc::new(RateLimiter::default()),
            class_medium,
            class_heavy,
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }
}

#[must_use]
pub fn build_router(state: AppState) -> Router {
    let max_body_bytes = state.api.max_body_bytes;
    Router::new()
        .route("/v1/companies/search", post(http::search_handler))
        .route("/v1/companies/shipments", get(http::shipments_handler))
        .route("/healthz", get(http::healthz_handler))
        .route("/readyz", get(http::readyz_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}
