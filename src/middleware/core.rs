use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::context::Context;
use crate::handler::Handler;

/// Response produced by a middleware that short-circuits the chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Reply {
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// JSON reply with `content-type: application/json`
    #[must_use]
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self {
            status,
            headers: vec![("content-type".into(), "application/json".into())],
            body: value.to_string().into_bytes(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    fn write_to(&self, ctx: &mut Context) {
        for (name, value) in &self.headers {
            ctx.set_header(name, value);
        }
        ctx.status(self.status);
        if !self.body.is_empty() {
            ctx.response_mut().write(&self.body);
        }
    }
}

/// Before/after hooks around the rest of the chain
///
/// `before` runs on the way in. Returning a [`Reply`] writes it, aborts the
/// chain and skips everything downstream. `after` always runs on the way
/// out with the time spent since `before`.
pub trait Middleware: Send + Sync + 'static {
    fn before(&self, _ctx: &mut Context) -> Option<Reply> {
        None
    }

    fn after(&self, _ctx: &mut Context, _latency: Duration) {}
}

/// Adapter registering a [`Middleware`] as a chain handler
pub struct Layered<M> {
    inner: Arc<M>,
}

impl<M: Middleware> Layered<M> {
    pub fn new(middleware: M) -> Self {
        Self {
            inner: Arc::new(middleware),
        }
    }

    /// Wrap a middleware the caller keeps a handle to (e.g. for reading metrics)
    pub fn shared(middleware: Arc<M>) -> Self {
        Self { inner: middleware }
    }

    pub fn inner(&self) -> &Arc<M> {
        &self.inner
    }
}

impl<M: Middleware> Handler for Layered<M> {
    fn call(&self, ctx: &mut Context) {
        let start = Instant::now();
        match self.inner.before(ctx) {
            Some(reply) => {
                reply.write_to(ctx);
                ctx.abort();
            }
            None => ctx.next(),
        }
        self.inner.after(ctx, start.elapsed());
    }
}
