use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub capacity: f64,
    pub refill_per_sec: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 30.0,
            refill_per_sec: 10.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub max_body_bytes: usize,
    pub sql_timeout: Duration,
    pub slow_query_threshold: Duration,
    pub enable_ip_rate_limit: bool,
    pub rate_limit_per_ip: RateLimitConfig,
    pub concurrency_medium: usize,
    pub concurrency_heavy: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 16 * 1024,
            sql_timeout: Duration::from_millis(800),
            slow_query_threshold: Duration::from_millis(200),
            enable_ip_rate_limit: true,
            rate_limit_per_ip: RateLimitConfig::default(),
            concurrency_medium: 64,
            concurrency_heavy: 16,
        }
    }
}
