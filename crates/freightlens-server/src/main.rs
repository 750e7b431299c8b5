#![forbid(unsafe_code)]

use freightlens_core::{ENV_FREIGHTLENS_LOG, ENV_FREIGHTLENS_WAREHOUSE_PATH};
use freightlens_query::{QueryLimits, SqliteWarehouse};
use freightlens_server::{build_router, ApiConfig, AppState, RateLimitConfig};
use std::env;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_f64(name: &str, default: f64) -> f64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(default)
}

fn env_duration_ms(name: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_u64(name, default_ms))
}

fn api_config_from_env() -> ApiConfig {
    let defaults = ApiConfig::default();
    ApiConfig {
        max_body_bytes: env_usize("FREIGHTLENS_MAX_BODY_BYTES", defaults.max_body_bytes),
        sql_timeout: env_duration_ms("FREIGHTLENS_SQL_TIMEOUT_MS", 800),
        slow_query_threshold: env_duration_ms("FREIGHTLENS_SLOW_QUERY_MS", 200),
        enable_ip_rate_limit: env_bool(
            "FREIGHTLENS_ENABLE_IP_RATE_LIMIT",
            defaults.enable_ip_rate_limit,
        ),
        rate_limit_per_ip: RateLimitConfig {
            capacity: env_f64("FREIGHTLENS_RATE_LIMIT_CAPACITY", 30.0),
            refill_per_sec: env_f64("FREIGHTLENS_RATE_LIMIT_REFILL", 10.0),
        },
        concurrency_medium: env_usize(
            "FREIGHTLENS_CONCURRENCY_MEDIUM",
            defaults.concurrency_medium,
        ),
        concurrency_heavy: env_usize("FREIGHTLENS_CONCURRENCY_HEAVY", defaults.concurrency_heavy),
    }
}

fn limits_from_env() -> QueryLimits {
    let defaults = QueryLimits::default();
    QueryLimits {
        max_limit: env_usize("FREIGHTLENS_MAX_LIMIT", defaults.max_limit),
        max_keyword_len: env_usize("FREIGHTLENS_MAX_KEYWORD_LEN", defaults.max_keyword_len),
        max_filter_values: env_usize(
            "FREIGHTLENS_MAX_FILTER_VALUES",
            defaults.max_filter_values,
        ),
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(ENV_FREIGHTLENS_LOG).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let api = api_config_from_env();
    let limits = limits_from_env();

    let warehouse_path = env::var(ENV_FREIGHTLENS_WAREHOUSE_PATH)
        .unwrap_or_else(|_| "freightlens.sqlite".to_string());
    let warehouse = match SqliteWarehouse::open(Path::new(&warehouse_path)) {
        Ok(w) => w,
        Err(e) => {
            error!(error = %e, path = %warehouse_path, "failed to open warehouse");
            std::process::exit(1);
        }
    };

    let state = AppState::new(api, limits, Arc::new(warehouse));
    let bind = env::var("FREIGHTLENS_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = match TcpListener::bind(&bind).await {
        Ok(l) => l,
        Err(e) => {
            error!(error = %e, bind = %bind, "failed to bind listener");
            std::process::exit(1);
        }
    };
    info!(bind = %bind, warehouse = %warehouse_path, "freightlens server listening");

    if let Err(e) = axum::serve(listener, build_router(state)).await {
        error!(error = %e, "server terminated");
        std::process::exit(1);
    }
}
