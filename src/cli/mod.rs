//! # CLI Module
//!
//! Inspection commands over a small demo application, useful for checking
//! how patterns resolve and how the chain behaves without a server.
//!
//! ## Commands
//!
//! ```bash
//! # List the demo route table
//! switchyard routes
//!
//! # Resolve a path against the route trees
//! switchyard match GET /api/v1/users/42
//!
//! # Run a request through the full chain
//! switchyard dispatch GET /admin/stats -H "authorization: secret"
//! ```
//!
//! Logging is configured through the `SWITCHYARD_LOG_*` variables described
//! in [`crate::logging`].

mod commands;
mod demo;


pub use commands::{run, run_cli, Cli, Commands};
pub use demo::{demo_app, DEMO_TOKEN};
