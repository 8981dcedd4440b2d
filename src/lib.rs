//! # switchyard
//!
//! **switchyard** is an HTTP request router built on one prefix tree per
//! method, with an onion-style middleware chain in front of every handler.
//!
//! ## Overview
//!
//! - **[`router`]** - Segment trees with literal, `:param` and `*wildcard`
//!   nodes; static segments win over parameters, parameters over wildcards,
//!   with backtracking. Groups compose prefixes and middleware.
//! - **[`context`]** - Per-request [`Context`]: the chain cursor
//!   (`next` / `abort` / `next_with_error`), path params, request-scoped
//!   store and the buffered response.
//! - **[`dispatcher`]** - [`Dispatcher`], the top-level entry: global
//!   middleware, not-found fallback, error handlers, pooled contexts.
//! - **[`middleware`]** - Request logging, panic recovery, CORS, token auth,
//!   metrics.
//! - **[`logging`]** / **[`runtime_config`]** - Environment-driven setup.
//!
//! ## Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Caller
//!     participant Dispatcher
//!     participant Forest as Route Forest
//!     participant Chain as Context::next
//!     participant ErrH as Error Handlers
//!
//!     Caller->>Dispatcher: dispatch(request)
//!     Dispatcher->>Forest: lookup(method, path)
//!     Forest-->>Dispatcher: handlers + params (or none)
//!     Dispatcher->>Chain: global middleware + route chain (or 404 handler)
//!     Chain->>Chain: onion: before ... handler ... after
//!     Chain-->>Dispatcher: error recorded?
//!     alt error recorded
//!         Dispatcher->>ErrH: every handler, in order
//!     end
//!     Dispatcher-->>Caller: response
//! ```
//!
//! ## Example
//!
//! ```rust
//! use switchyard::{middleware::recover, ChainError, Context, Dispatcher};
//!
//! # fn main() -> Result<(), switchyard::RouteError> {
//! let mut app = Dispatcher::new();
//! app.use_middleware(recover());
//! app.use_error(|err: &ChainError, ctx: &mut Context| ctx.string(500, err.to_string()));
//!
//! let mut api = app.route("/api");
//! api.use_middleware(|ctx: &mut Context| {
//!     ctx.set_header("x-api", "1");
//!     ctx.next();
//! });
//! api.get("/users/:id", |ctx: &mut Context| {
//!     let id = ctx.param("id").unwrap_or_default().to_string();
//!     ctx.string(200, id);
//! })?;
//!
//! let response = app.dispatch(http::Request::get("/api/users/7").body(Vec::new()).unwrap());
//! assert_eq!(response.status(), 200);
//! assert_eq!(response.body(), b"7");
//! assert_eq!(response.headers()["x-api"], "1");
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod runtime_config;

pub use context::{Context, ContextPool, ResponseWriter};
pub use dispatcher::Dispatcher;
pub use error::{ChainError, RouteError};
pub use handler::{handler, ErrorHandler, ErrorHandlerFn, Handler, HandlerFn};
pub use ids::RequestId;
pub use router::{Params, RouteMatch, Router};
pub use runtime_config::RuntimeConfig;
