//! Rate limiting middleware.
//!
//! In-memory fixed-window limiting per client IP, used on the credential
//! endpoints.

use crate::config::RateLimitSettings;
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Configuration for rate limiting.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
    /// Extra requests tolerated above the limit before hard reject.
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::from(&RateLimitSettings::default())
    }
}

impl From<&RateLimitSettings> for RateLimitConfig {
    fn from(settings: &RateLimitSettings) -> Self {
        Self {
            max_requests: settings.max_requests,
            window: settings.window(),
            burst: settings.burst,
        }
    }
}

/// Rate limiter state tracking requests per IP.
#[derive(Clone)]
pub struct RateLimitLayer {
    config: RateLimitConfig,
    state: Arc<Mutex<HashMap<IpAddr, RateLimitEntry>>>,
}

struct RateLimitEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Debug, PartialEq, Eq)]
enum RateLimitResult {
    Allowed,
    BurstUsed,
    Exceeded { retry_after: Duration },
}

impl RateLimitLayer {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn check(&self, ip: IpAddr) -> RateLimitResult {
        self.check_at(ip, Instant::now())
    }

    fn check_at(&self, ip: IpAddr, now: Instant) -> RateLimitResult {
        let mut state = self.state.lock();

        let entry = state.entry(ip).or_insert(RateLimitEntry {
            count: 0,
            window_start: now,
        });

        // Reset window if expired
        if now.duration_since(entry.window_start) >= self.config.window {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;

        let limit = self.config.max_requests + self.config.burst;
        if entry.count > limit {
            let reset_at = entry.window_start + self.config.window;
            RateLimitResult::Exceeded {
                retry_after: reset_at.saturating_duration_since(now),
            }
        } else if entry.count > self.config.max_requests {
            RateLimitResult::BurstUsed
        } else {
            RateLimitResult::Allowed
        }
    }

    /// Drop entries whose window ended long ago.
    pub fn cleanup(&self) {
        let mut state = self.state.lock();
        let now = Instant::now();
        let window = self.config.window;

        let before = state.len();
        state.retain(|_, entry| now.duration_since(entry.window_start) < window * 2);
        let pruned = before - state.len();
        if pruned > 0 {
            debug!(pruned, "Pruned rate limit entries");
        }
    }

    /// Prune stale entries once per window for the life of the process.
    pub fn spawn_cleanup(&self) -> JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(limiter.config.window);
            loop {
                interval.tick().await;
                limiter.cleanup();
            }
        })
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.state.lock().len()
    }
}

/// Rate limiting middleware function.
///
/// Requests arriving without connection info (in-process tests) share one
/// bucket.
pub async fn rate_limit_middleware(
    connect_info: Option<ConnectInfo<SocketAddr>>,
    State(limiter): State<RateLimitLayer>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ip = connect_info
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    match limiter.check(ip) {
        RateLimitResult::Allowed => next.run(request).await,
        RateLimitResult::BurstUsed => {
            debug!(ip = %ip, "Rate limit burst in use");
            next.run(request).await
        }
        RateLimitResult::Exceeded { retry_after } => {
            // Round up so clients never retry early
            let retry_secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            warn!(
                ip = %ip,
                path = %request.uri().path(),
                retry_after_secs = retry_secs,
                "Rate limit exceeded"
            );

            let body = serde_json::json!({
                "detail": format!(
                    "Request was throttled. Expected available in {} seconds.",
                    retry_secs
                ),
                "code": "rate_limited",
            });

            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_secs.to_string())],
                Json(body),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, burst: u32) -> RateLimitLayer {
        RateLimitLayer::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(60),
            burst,
        })
    }

    #[test]
    fn test_rate_limit_allows_under_limit() {
        let limiter = limiter(10, 5);
        let ip: IpAddr = "127.0.0.1".parse().unwrap();

        for _ in 0..10 {
            assert_eq!(limiter.check(ip), RateLimitResult::Allowed);
        }
    }

    #[test]
    fn test_rate_limit_allows_burst_then_rejects() {
        let limiter = limiter(5, 3);
        let ip: IpAddr = "127.0.0.1".parse().unwrap();

        for _ in 0..5 {
            assert_eq!(limiter.check(ip), RateLimitResult::Allowed);
        }
        for _ in 0..3 {
            assert_eq!(limiter.check(ip), RateLimitResult::BurstUsed);
        }
        assert!(matches!(
            limiter.check(ip),
            RateLimitResult::Exceeded { .. }
        ));

        // Other clients are unaffected
        let other: IpAddr = "10.0.0.7".parse().unwrap();
        assert_eq!(limiter.check(other), RateLimitResult::Allowed);
    }

    #[test]
    fn test_window_resets() {
        let limiter = limiter(1, 0);
        let ip: IpAddr = "127.0.0.1".parse().unwrap();
        let start = Instant::now();

        assert_eq!(limiter.check_at(ip, start), RateLimitResult::Allowed);
        assert!(matches!(
            limiter.check_at(ip, start + Duration::from_secs(1)),
            RateLimitResult::Exceeded { .. }
        ));
        assert_eq!(
            limiter.check_at(ip, start + Duration::from_secs(61)),
            RateLimitResult::Allowed
        );
    }

    #[test]
    fn test_cleanup_keeps_fresh_entries() {
        let limiter = limiter(10, 0);
        limiter.check("127.0.0.1".parse().unwrap());
        limiter.cleanup();
        assert_eq!(limiter.tracked(), 1);
    }
}
