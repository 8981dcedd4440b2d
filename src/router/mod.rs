//! # Router Module
//!
//! Path matching and route registration.
//!
//! ## Overview
//!
//! - [`RouteTree`] holds the routes of one HTTP method as a segment tree with
//!   literal, `:param` and `*wildcard` nodes.
//! - [`Forest`] maps each method string to its tree.
//! - [`Router`] is a registration handle: it carries a path prefix and a list
//!   of group middleware, and writes into a forest shared with every group
//!   created from it.
//!
//! ## Example
//!
//! ```rust
//! use switchyard::router::Router;
//! use switchyard::Context;
//!
//! fn show_user(ctx: &mut Context) {
//!     let id = ctx.param("id").unwrap_or_default().to_string();
//!     ctx.string(200, &id);
//! }
//!
//! # fn main() -> Result<(), switchyard::RouteError> {
//! let mut root = Router::new();
//! let mut api = root.group("/api");
//! api.get("/users/:id", show_user)?;
//!
//! let found = root.lookup("GET", "/api/users/42").unwrap();
//! assert_eq!(found.pattern, "/api/users/:id");
//! assert_eq!(found.params.get("id"), Some("42"));
//! # Ok(())
//! # }
//! ```

mod core;
mod radix;

pub use core::{Forest, RouteMatch, Router, SharedForest, SUPPORTED_METHODS};
pub use radix::{
    split_request_path, split_segments, ParamVec, Params, RouteNode, RouteTree, MAX_INLINE_PARAMS,
};
