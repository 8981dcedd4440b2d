//! # Context Module
//!
//! Per-request state: captured parameters, the resolved handler chain with
//! its cursor, the abort flag, the recorded error, a typed key/value store
//! and the buffered response.
//!
//! Contexts are drawn from a [`ContextPool`] by the dispatcher and reset
//! before they are reused.

mod core;
mod pool;
mod response;

pub use core::Context;
pub use pool::ContextPool;
pub use response::ResponseWriter;
