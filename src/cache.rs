use dashmap::DashMap;
use std::time::{Duration, Instant};

use crate::models::OneCallResponse;

// Cached forecast with its storage time
#[derive(Clone)]
pub struct CachedForecast {
    pub payload: OneCallResponse,
    pub stored_at: Instant,
}

/// Time-boxed forecast cache keyed by coordinate pair.
///
/// Purely an optimization: a stale or absent entry just means a live fetch.
/// Stale entries are not deleted, they sit unusable until overwritten.
pub struct ForecastCache {
    entries: DashMap<String, CachedForecast>,
    ttl: Duration,
}

impl ForecastCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    // Key uses the raw coordinates as given. This cache dedups repeat
    // lookups for one location, it does not meter quota, so it skips the
    // rate limiter's precision clamping.
    pub fn key(lat: f64, lng: f64) -> String {
        format!("weather-{lat}-{lng}")
    }

    pub fn get(&self, lat: f64, lng: f64) -> Option<OneCallResponse> {
        self.get_at(lat, lng, Instant::now())
    }

    pub fn get_at(&self, lat: f64, lng: f64, now: Instant) -> Option<OneCallResponse> {
        let entry = self.entries.get(&Self::key(lat, lng))?;
        if now.duration_since(entry.stored_at) < self.ttl {
            Some(entry.payload.clone())
        } else {
            None
        }
    }

    pub fn put(&self, lat: f64, lng: f64, payload: OneCallResponse) {
        self.put_at(lat, lng, payload, Instant::now());
    }

    pub fn put_at(&self, lat: f64, lng: f64, payload: OneCallResponse, now: Instant) {
        self.entries.insert(
            Self::key(lat, lng),
            CachedForecast {
                payload,
                stored_at: now,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
