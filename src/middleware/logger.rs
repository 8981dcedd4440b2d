use std::time::Instant;

use tracing::info;

use crate::context::Context;
use crate::handler::Handler;

/// Path excluded from request logging
///
/// A pattern without `*` matches the path exactly. Each `*` matches any run
/// of characters, slashes included, so `/api/*/health` matches
/// `/api/v1/health` and `/api/v1/internal/health` but not `/api/health`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipPath(String);

impl SkipPath {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let mut pieces = self.0.split('*');
        let Some(first) = pieces.next() else {
            return path.is_empty();
        };
        let Some(mut rest) = path.strip_prefix(first) else {
            return false;
        };
        let mut pieces: Vec<&str> = pieces.collect();
        let Some(last) = pieces.pop() else {
            // no `*` in the pattern
            return rest.is_empty();
        };
        for piece in pieces {
            match rest.find(piece) {
                Some(idx) => rest = &rest[idx + piece.len()..],
                None => return false,
            }
        }
        rest.ends_with(last)
    }
}

/// Logs one `info` event per request once the chain has unwound
#[derive(Debug, Clone, Default)]
pub struct RequestLogger {
    skip_paths: Vec<SkipPath>,
}

impl RequestLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude paths (exact or `*`-glob) from logging
    #[must_use]
    pub fn skip_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_paths.extend(paths.into_iter().map(SkipPath::new));
        self
    }

    fn is_skipped(&self, path: &str) -> bool {
        self.skip_paths.iter().any(|p| p.matches(path))
    }
}

impl Handler for RequestLogger {
    fn call(&self, ctx: &mut Context) {
        if self.is_skipped(ctx.path()) {
            ctx.next();
            return;
        }

        let start = Instant::now();
        ctx.next();
        let latency = start.elapsed();

        info!(
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            path = %ctx.path(),
            status = ctx.response().status().as_u16(),
            latency_us = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX),
            aborted = ctx.is_aborted(),
            error = ?ctx.error().map(ToString::to_string),
            "Request completed"
        );
    }
}
