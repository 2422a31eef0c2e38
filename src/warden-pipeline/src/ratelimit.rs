//! Per-user command throttling applied before the gates.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use warden_policy::{CommandName, ExternalId};

use crate::config::RateLimitConfig;

/// Decides whether a user may issue a command right now.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Consumes one request; `false` means the request is throttled.
    async fn check(&self, external_id: ExternalId, command: &CommandName) -> bool;
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_update: Instant,
}

/// Token bucket keyed by user and command.
#[derive(Debug)]
pub struct TokenBucketLimiter {
    burst: f64,
    tokens_per_second: f64,
    buckets: RwLock<HashMap<(ExternalId, CommandName), Bucket>>,
}

impl TokenBucketLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let per = Duration::from_secs(config.per_seconds.max(1)).as_secs_f64();
        Self {
            burst: f64::from(config.burst),
            tokens_per_second: f64::from(config.burst) / per,
            buckets: RwLock::new(HashMap::new()),
        }
    }

    /// Drop buckets idle for longer than `ttl`.
    pub async fn cleanup(&self, ttl: Duration) {
        let now = Instant::now();
        let mut buckets = self.buckets.write().await;
        let before = buckets.len();
        buckets.retain(|_, bucket| now.duration_since(bucket.last_update) < ttl);

        let removed = before - buckets.len();
        if removed > 0 {
            debug!("Evicted {} idle rate limiter buckets", removed);
        }
    }
}

#[async_trait]
impl RateLimiter for TokenBucketLimiter {
    async fn check(&self, external_id: ExternalId, command: &CommandName) -> bool {
        let mut buckets = self.buckets.write().await;
        let now = Instant::now();
        let bucket = buckets
            .entry((external_id, command.clone()))
            .or_insert_with(|| Bucket {
                tokens: self.burst,
                last_update: now,
            });

        let elapsed = now.duration_since(bucket.last_update).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.tokens_per_second).min(self.burst);
        bucket.last_update = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}
