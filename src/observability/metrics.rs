//! Per-route request metrics.
//!
//! # Responsibilities
//! - Aggregate request count, cumulative latency and status-code distribution
//!   per route key
//! - Produce a consistent point-in-time snapshot for the metrics endpoint
//!
//! # Design Decisions
//! - The store is an injectable handle, not a global
//! - Locking is sharded per route key (DashMap); a route's count, duration
//!   and histogram are always updated and read together under one shard lock
//! - Average latency is derived on read, never stored

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{Method, StatusCode};
use dashmap::DashMap;
use serde::Serialize;

/// Pattern used when no route matched the request.
pub const UNMATCHED_ROUTE: &str = "unknown";

/// Aggregation identity: HTTP method followed by the matched route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey(String);

impl RouteKey {
    /// `pattern` is the route template (e.g. `/users/{id}`), not the concrete path.
    pub fn new(method: &Method, pattern: Option<&str>) -> Self {
        let pattern = pattern.filter(|p| !p.is_empty()).unwrap_or(UNMATCHED_ROUTE);
        Self(format!("{}{}", method.as_str(), pattern))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cumulative counters for one route.
#[derive(Debug, Clone, Default)]
pub struct RouteRecord {
    count: u64,
    total_duration: Duration,
    status_codes: BTreeMap<u16, u64>,
}

impl RouteRecord {
    fn record(&mut self, duration: Duration, status: StatusCode) {
        self.count += 1;
        self.total_duration += duration;
        *self.status_codes.entry(status.as_u16()).or_insert(0) += 1;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn total_duration(&self) -> Duration {
        self.total_duration
    }

    pub fn status_codes(&self) -> &BTreeMap<u16, u64> {
        &self.status_codes
    }

    /// Mean latency in milliseconds. A record only exists after its first event.
    pub fn avg_duration_ms(&self) -> f64 {
        self.total_duration.as_nanos() as f64 / 1_000_000.0 / self.count.max(1) as f64
    }

    fn to_snapshot(&self) -> RouteSnapshot {
        RouteSnapshot {
            count: self.count,
            avg_duration: self.avg_duration_ms(),
            status_codes: self.status_codes.clone(),
        }
    }
}

/// One route as reported by the metrics endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSnapshot {
    pub count: u64,
    /// Milliseconds.
    pub avg_duration: f64,
    pub status_codes: BTreeMap<u16, u64>,
}

/// Point-in-time copy of the whole store.
///
/// Serializes as a flat object keyed by route, plus `service_name` when configured.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(flatten)]
    pub routes: BTreeMap<String, RouteSnapshot>,
}

struct Inner {
    routes: DashMap<RouteKey, RouteRecord>,
    service_name: Option<String>,
}

/// Concurrency-safe in-memory metrics store.
///
/// Cloning yields another handle to the same store.
#[derive(Clone)]
pub struct MetricsStore {
    inner: Arc<Inner>,
}

impl MetricsStore {
    pub fn new(service_name: Option<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                routes: DashMap::new(),
                service_name,
            }),
        }
    }

    /// Record one completed request.
    pub fn record(&self, key: RouteKey, duration: Duration, status: StatusCode) {
        self.inner
            .routes
            .entry(key)
            .or_default()
            .record(duration, status);
    }

    /// Copy of a single route's counters.
    pub fn get(&self, key: &RouteKey) -> Option<RouteRecord> {
        self.inner.routes.get(key).map(|r| r.value().clone())
    }

    /// Consistent copy of every route seen so far.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let routes = self
            .inner
            .routes
            .iter()
            .map(|entry| (entry.key().to_string(), entry.value().to_snapshot()))
            .collect();

        MetricsSnapshot {
            service_name: self.inner.service_name.clone(),
            routes,
        }
    }

    pub fn service_name(&self) -> Option<&str> {
        self.inner.service_name.as_deref()
    }

    /// Number of distinct routes seen.
    pub fn len(&self) -> usize {
        self.inner.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.routes.is_empty()
    }
}

impl fmt::Debug for MetricsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsStore")
            .field("service_name", &self.inner.service_name)
            .field("routes", &self.inner.routes.len())
            .finish()
    }
}
