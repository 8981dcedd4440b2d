//! Dispatcher core - the per-request entry point.

use http::{Request, Response};
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

use crate::context::{Context, ContextPool};
use crate::error::RouteError;
use crate::handler::{handler, ErrorHandler, ErrorHandlerFn, Handler, HandlerFn};
use crate::router::{Params, RouteMatch, Router};
use crate::runtime_config::RuntimeConfig;

/// Status sent when no route matches
pub const NOT_FOUND_STATUS: u16 = 404;
/// Body sent when no route matches
pub const NOT_FOUND_BODY: &str = "404 page not found";

fn not_found(ctx: &mut Context) {
    ctx.string(NOT_FOUND_STATUS, NOT_FOUND_BODY);
}

fn not_found_handler() -> HandlerFn {
    static NOT_FOUND: OnceLock<HandlerFn> = OnceLock::new();
    Arc::clone(NOT_FOUND.get_or_init(|| handler(not_found)))
}

/// Top-level request entry
///
/// Owns the root [`Router`] (and through it the route forest), the global
/// middleware list, the error handlers and the context pool.
///
/// Global middleware is added to the chain at request time, so middleware
/// registered after the routes still runs for every request, including
/// requests that fall through to the not-found response.
pub struct Dispatcher {
    router: Router,
    middlewares: Vec<HandlerFn>,
    error_handlers: Vec<ErrorHandlerFn>,
    pool: ContextPool,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Dispatcher with configuration read from the environment
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::from_env())
    }

    /// Dispatcher with explicit runtime settings
    #[must_use]
    pub fn with_config(config: RuntimeConfig) -> Self {
        let pool = ContextPool::new(config.context_pool_capacity);
        debug!(context_pool_capacity = pool.capacity(), "Dispatcher created");
        Self {
            router: Router::new(),
            middlewares: Vec::new(),
            error_handlers: Vec::new(),
            pool,
        }
    }

    /// Append global middleware, run for every request before route handlers
    pub fn use_middleware<H: Handler>(&mut self, middleware: H) -> &mut Self {
        self.middlewares.push(handler(middleware));
        self
    }

    /// Append an error handler
    ///
    /// All error handlers run, in registration order, whenever a request
    /// finishes with an error recorded on its context.
    pub fn use_error<E: ErrorHandler>(&mut self, error_handler: E) -> &mut Self {
        self.error_handlers.push(Arc::new(error_handler));
        self
    }

    /// Create a route group under `prefix`
    pub fn route(&mut self, prefix: &str) -> Router {
        self.router.group(prefix)
    }

    /// Root router, for registering routes without a prefix
    ///
    /// Middleware added here is group middleware of the root: it is copied
    /// into routes and groups registered afterwards, unlike
    /// [`Dispatcher::use_middleware`] which applies to every request.
    pub fn router(&mut self) -> &mut Router {
        &mut self.router
    }

    /// Register `handlers` for `method` at `pattern` on the root router
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] when the pattern conflicts with an existing
    /// parameter or wildcard name, or names an empty parameter.
    pub fn handle(
        &mut self,
        method: &str,
        pattern: &str,
        handlers: Vec<HandlerFn>,
    ) -> Result<&mut Self, RouteError> {
        self.router.handle(method, pattern, handlers)?;
        Ok(self)
    }

    /// Register a single `GET` handler; see [`Dispatcher::handle`]
    pub fn get<H: Handler>(&mut self, pattern: &str, h: H) -> Result<&mut Self, RouteError> {
        self.handle("GET", pattern, vec![handler(h)])
    }

    /// Register a single `POST` handler; see [`Dispatcher::handle`]
    pub fn post<H: Handler>(&mut self, pattern: &str, h: H) -> Result<&mut Self, RouteError> {
        self.handle("POST", pattern, vec![handler(h)])
    }

    /// Register a single `PUT` handler; see [`Dispatcher::handle`]
    pub fn put<H: Handler>(&mut self, pattern: &str, h: H) -> Result<&mut Self, RouteError> {
        self.handle("PUT", pattern, vec![handler(h)])
    }

    /// Register a single `DELETE` handler; see [`Dispatcher::handle`]
    pub fn delete<H: Handler>(&mut self, pattern: &str, h: H) -> Result<&mut Self, RouteError> {
        self.handle("DELETE", pattern, vec![handler(h)])
    }

    /// Register a single `PATCH` handler; see [`Dispatcher::handle`]
    pub fn patch<H: Handler>(&mut self, pattern: &str, h: H) -> Result<&mut Self, RouteError> {
        self.handle("PATCH", pattern, vec![handler(h)])
    }

    /// Register a single `HEAD` handler; see [`Dispatcher::handle`]
    pub fn head<H: Handler>(&mut self, pattern: &str, h: H) -> Result<&mut Self, RouteError> {
        self.handle("HEAD", pattern, vec![handler(h)])
    }

    /// Register a single `OPTIONS` handler; see [`Dispatcher::handle`]
    pub fn options<H: Handler>(&mut self, pattern: &str, h: H) -> Result<&mut Self, RouteError> {
        self.handle("OPTIONS", pattern, vec![handler(h)])
    }

    /// Resolve `method` and `path` without running anything
    #[must_use]
    pub fn lookup(&self, method: &str, path: &str) -> Option<RouteMatch> {
        self.router.lookup(method, path)
    }

    /// Every registered `(method, pattern)` pair
    #[must_use]
    pub fn routes(&self) -> Vec<(String, String)> {
        self.router.routes()
    }

    /// Idle contexts held by the pool
    #[must_use]
    pub fn pooled_contexts(&self) -> usize {
        self.pool.idle()
    }

    /// Run one request through the chain and return the response
    ///
    /// Panics raised by handlers are not caught here; register
    /// [`crate::middleware::recover`] to turn them into chain errors.
    pub fn dispatch(&self, request: Request<Vec<u8>>) -> Response<Vec<u8>> {
        let mut ctx = self.pool.acquire(request);

        let mut chain = Vec::with_capacity(self.middlewares.len() + 4);
        chain.extend(self.middlewares.iter().cloned());

        let params = match self.router.lookup(ctx.method(), ctx.path()) {
            Some(found) => {
                debug!(
                    request_id = %ctx.request_id(),
                    method = %ctx.method(),
                    path = %ctx.path(),
                    route_pattern = %found.pattern,
                    path_params = ?found.params,
                    "Route matched"
                );
                chain.extend(found.handlers);
                found.params
            }
            None => {
                debug!(
                    request_id = %ctx.request_id(),
                    method = %ctx.method(),
                    path = %ctx.path(),
                    "No route matched"
                );
                chain.push(not_found_handler());
                Params::new()
            }
        };

        ctx.set_chain(chain, params);
        ctx.next();

        if let Some(err) = ctx.take_error() {
            if self.error_handlers.is_empty() {
                warn!(
                    request_id = %ctx.request_id(),
                    error = %err,
                    "Request finished with an error and no error handler is registered"
                );
            } else {
                for error_handler in &self.error_handlers {
                    error_handler.handle(&err, &mut ctx);
                }
            }
        }

        let response = ctx.response_mut().take();
        self.pool.release(ctx);
        response
    }
}
