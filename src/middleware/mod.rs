//! # Middleware Module
//!
//! Ready-made chain handlers. Each is registered with
//! [`crate::Dispatcher::use_middleware`] or [`crate::Router::use_middleware`].
//!
//! - [`RequestLogger`]: one `info` event per request, with skip paths
//! - [`recover`]: converts panics into [`crate::ChainError::Panic`]
//! - [`Middleware`] + [`Layered`]: before/after hooks with short-circuit
//! - [`CorsMiddleware`], [`AuthMiddleware`], [`MetricsMiddleware`]: built on
//!   the [`Middleware`] trait
//!
//! ```rust
//! use std::sync::Arc;
//! use switchyard::middleware::{recover, Layered, MetricsMiddleware, RequestLogger};
//! use switchyard::Dispatcher;
//!
//! let metrics = Arc::new(MetricsMiddleware::new());
//! let mut app = Dispatcher::new();
//! app.use_middleware(recover())
//!     .use_middleware(RequestLogger::new().skip_paths(["/health"]))
//!     .use_middleware(Layered::shared(Arc::clone(&metrics)));
//! ```

mod auth;
mod core;
mod cors;
mod logger;
mod metrics;
mod recover;

pub use auth::AuthMiddleware;
pub use core::{Layered, Middleware, Reply};
pub use cors::CorsMiddleware;
pub use logger::{RequestLogger, SkipPath};
pub use metrics::MetricsMiddleware;
pub use recover::recover;
