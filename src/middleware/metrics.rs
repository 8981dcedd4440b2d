use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use super::{Middleware, Reply};
use crate::context::Context;

/// Request counters shared across threads
///
/// Register through [`super::Layered::shared`] to keep a handle for reading
/// the numbers. All counters use relaxed atomics.
#[derive(Default)]
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    error_count: AtomicUsize,
    total_latency_ns: AtomicU64,
}

impl MetricsMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the total number of requests processed
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Requests that recorded a chain error or answered with a 5xx status
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Mean time spent downstream of this middleware; zero before any request
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }
}

impl Middleware for MetricsMiddleware {
    fn before(&self, _ctx: &mut Context) -> Option<Reply> {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn after(&self, ctx: &mut Context, latency: Duration) {
        let nanos = u64::try_from(latency.as_nanos()).unwrap_or(u64::MAX);
        self.total_latency_ns.fetch_add(nanos, Ordering::Relaxed);
        if ctx.error().is_some() || ctx.response().status().is_server_error() {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
    }
}
