//! # Dispatcher Module
//!
//! Per-request entry point tying the route forest, global middleware, error
//! handlers and the context pool together.
//!
//! ## Request Flow
//!
//! 1. A context is taken from the pool and bound to the request
//! 2. The method tree is searched for the request path
//! 3. The chain is built: global middleware, then the matched route's group
//!    middleware and handlers (or the not-found handler)
//! 4. The chain runs through [`crate::Context::next`]
//! 5. If an error was recorded, every error handler runs in order
//! 6. The buffered response is taken and the context goes back to the pool
//!
//! ## Example
//!
//! ```rust
//! use switchyard::{ChainError, Context, Dispatcher};
//!
//! # fn main() -> Result<(), switchyard::RouteError> {
//! let mut app = Dispatcher::new();
//! app.use_error(|err: &ChainError, ctx: &mut Context| {
//!     ctx.string(500, err.to_string());
//! });
//! app.get("/ping", |ctx: &mut Context| ctx.string(200, "pong"))?;
//!
//! let request = http::Request::get("/ping").body(Vec::new()).unwrap();
//! let response = app.dispatch(request);
//! assert_eq!(response.body(), b"pong");
//! # Ok(())
//! # }
//! ```

mod core;

pub use core::{Dispatcher, NOT_FOUND_BODY, NOT_FOUND_STATUS};
