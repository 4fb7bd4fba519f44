use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::metrics::RATE_ENTRIES;

// Rate limit entry - tracks requests per client key within the current window
#[derive(Debug)]
pub struct RateLimitEntry {
    pub count: u32,
    pub window_start: Instant,
}

/// Admission decision together with the numbers the 429 headers report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub remaining: u32,
}

/// Fixed-window request counter keyed by client identity.
///
/// Windows reset hard at their boundary; a burst straddling the edge can
/// see up to twice the limit. Known characteristic of fixed windows.
pub struct RateLimitStore {
    entries: DashMap<String, RateLimitEntry>,
    limit: u32,
    window: Duration,
}

impl RateLimitStore {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            limit,
            window,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Count a request from `key` and decide whether to admit it.
    pub fn check(&self, key: &str) -> Decision {
        self.check_at(key, Instant::now())
    }

    // Window accounting with an explicit clock so tests can step time.
    pub fn check_at(&self, key: &str, now: Instant) -> Decision {
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert(RateLimitEntry {
                count: 0,
                window_start: now,
            });

        if now.duration_since(entry.window_start) > self.window {
            // window expired, start a fresh one
            entry.count = 1;
            entry.window_start = now;
        } else {
            entry.count += 1;
        }

        Decision {
            allowed: entry.count <= self.limit,
            remaining: self.limit.saturating_sub(entry.count),
        }
    }

    /// Drop entries whose window started more than two windows ago.
    pub fn sweep(&self) {
        self.sweep_at(Instant::now());
    }

    pub fn sweep_at(&self, now: Instant) {
        self.entries
            .retain(|_, entry| now.duration_since(entry.window_start) <= self.window * 2);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Spawn the periodic sweep that bounds memory growth from key churn.
///
/// Returns the task handle so shutdown can abort it.
pub fn spawn_sweeper(store: Arc<RateLimitStore>) -> JoinHandle<()> {
    let period = store.window() * 10;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // the first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            store.sweep();
            RATE_ENTRIES.set(store.len() as f64);
            debug!(entries = store.len(), "rate limit sweep complete");
        }
    })
}
