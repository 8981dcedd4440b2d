//! Router groups over a shared, per-method route forest.
//!
//! Every [`Router`] created from the same root (directly or through
//! [`Router::group`]) registers into one [`Forest`]. What a group owns by
//! value is its accumulated prefix and its middleware list, copied from the
//! parent when the group is created.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use super::radix::{Params, RouteTree};
use crate::error::RouteError;
use crate::handler::{handler, Handler, HandlerFn};

/// Method keys accepted by the registration helpers
pub const SUPPORTED_METHODS: [&str; 7] = ["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

/// One route tree per HTTP method, keyed by the exact method string
#[derive(Default, Debug)]
pub struct Forest {
    trees: BTreeMap<String, RouteTree>,
}

impl Forest {
    /// Insert into the tree for `method`, creating it on first use
    fn insert(&mut self, method: &str, pattern: &str, handlers: Vec<HandlerFn>) -> Result<(), RouteError> {
        self.trees
            .entry(method.to_string())
            .or_default()
            .insert(pattern, handlers)
    }

    /// Resolve `(method, path)`; method keys are case-sensitive
    #[must_use]
    pub fn lookup(&self, method: &str, path: &str) -> Option<RouteMatch> {
        let (node, params) = self.trees.get(method)?.search(path)?;
        Some(RouteMatch {
            pattern: node.pattern().to_string(),
            handlers: node.handlers().to_vec(),
            params,
        })
    }

    /// Every `(method, pattern)` pair, sorted
    #[must_use]
    pub fn routes(&self) -> Vec<(String, String)> {
        let mut routes: Vec<(String, String)> = self
            .trees
            .iter()
            .flat_map(|(method, tree)| {
                tree.patterns()
                    .into_iter()
                    .map(move |p| (method.clone(), p.to_string()))
            })
            .collect();
        routes.sort();
        routes
    }
}

/// Forest handle shared by a router and all of its groups
pub type SharedForest = Arc<RwLock<Forest>>;

/// Result of resolving a request against the forest
#[derive(Clone)]
pub struct RouteMatch {
    /// Pattern the route was registered under (prefix included)
    pub pattern: String,
    /// Group middleware followed by route handlers
    pub handlers: Vec<HandlerFn>,
    /// Parameters bound during the lookup
    pub params: Params,
}

impl std::fmt::Debug for RouteMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteMatch")
            .field("pattern", &self.pattern)
            .field("handlers", &self.handlers.len())
            .field("params", &self.params)
            .finish()
    }
}

/// Route registry for one group
///
/// Registration is expected to finish before requests are served. Adding
/// routes while other threads are dispatching is not supported; the lock
/// only keeps it memory-safe.
#[derive(Clone)]
pub struct Router {
    prefix: String,
    middlewares: Vec<HandlerFn>,
    routes: SharedForest,
    sub_routers: Vec<String>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create a root router with an empty forest
    #[must_use]
    pub fn new() -> Self {
        Self {
            prefix: String::new(),
            middlewares: Vec::new(),
            routes: SharedForest::default(),
            sub_routers: Vec::new(),
        }
    }

    /// Append group middleware
    ///
    /// Applies to routes registered on this router afterwards and to groups
    /// created from it afterwards. Existing groups are unaffected.
    pub fn use_middleware<H: Handler>(&mut self, middleware: H) -> &mut Self {
        self.middlewares.push(handler(middleware));
        self
    }

    /// Append already-erased middleware, in order
    pub fn use_all(&mut self, middlewares: impl IntoIterator<Item = HandlerFn>) -> &mut Self {
        self.middlewares.extend(middlewares);
        self
    }

    /// Create a child group under `prefix`
    ///
    /// The child gets a snapshot of this router's middleware and the same
    /// forest.
    pub fn group(&mut self, prefix: &str) -> Router {
        let child = Router {
            prefix: format!("{}{}", self.prefix, prefix),
            middlewares: self.middlewares.clone(),
            routes: Arc::clone(&self.routes),
            sub_routers: Vec::new(),
        };
        self.sub_routers.push(child.prefix.clone());
        child
    }

    /// Register `handlers` for `method` at `prefix + pattern`
    ///
    /// The stored chain is this group's middleware followed by `handlers`.
    /// Registering `/` on a prefixed group stores the bare prefix, and
    /// registering an identical pattern twice replaces the earlier chain
    /// with a warning.
    ///
    /// # Errors
    ///
    /// [`RouteError::ConflictingParam`] or [`RouteError::ConflictingWildcard`]
    /// when another route already names that position differently, and
    /// [`RouteError::EmptyParamName`] for a bare `:` or `*` segment.
    pub fn handle(
        &mut self,
        method: &str,
        pattern: &str,
        handlers: Vec<HandlerFn>,
    ) -> Result<&mut Self, RouteError> {
        let full_pattern = if !self.prefix.is_empty() && pattern == "/" {
            self.prefix.clone()
        } else {
            format!("{}{}", self.prefix, pattern)
        };

        let mut chain = Vec::with_capacity(self.middlewares.len() + handlers.len());
        chain.extend(self.middlewares.iter().cloned());
        chain.extend(handlers);

        let chain_len = chain.len();
        self.routes.write().insert(method, &full_pattern, chain)?;
        debug!(
            method = %method,
            pattern = %full_pattern,
            chain_len,
            "Route registered"
        );
        Ok(self)
    }

    /// Register a `GET` route
    ///
    /// Shorthand for [`Router::handle`] with a single handler; the group's
    /// middleware still runs first.
    pub fn get<H: Handler>(&mut self, pattern: &str, h: H) -> Result<&mut Self, RouteError> {
        self.handle("GET", pattern, vec![handler(h)])
    }

    /// Register a `POST` route
    pub fn post<H: Handler>(&mut self, pattern: &str, h: H) -> Result<&mut Self, RouteError> {
        self.handle("POST", pattern, vec![handler(h)])
    }

    /// Register a `PUT` route
    pub fn put<H: Handler>(&mut self, pattern: &str, h: H) -> Result<&mut Self, RouteError> {
        self.handle("PUT", pattern, vec![handler(h)])
    }

    /// Register a `DELETE` route
    pub fn delete<H: Handler>(&mut self, pattern: &str, h: H) -> Result<&mut Self, RouteError> {
        self.handle("DELETE", pattern, vec![handler(h)])
    }

    /// Register a `PATCH` route
    pub fn patch<H: Handler>(&mut self, pattern: &str, h: H) -> Result<&mut Self, RouteError> {
        self.handle("PATCH", pattern, vec![handler(h)])
    }

    /// Register a `HEAD` route
    pub fn head<H: Handler>(&mut self, pattern: &str, h: H) -> Result<&mut Self, RouteError> {
        self.handle("HEAD", pattern, vec![handler(h)])
    }

    /// Register an `OPTIONS` route
    pub fn options<H: Handler>(&mut self, pattern: &str, h: H) -> Result<&mut Self, RouteError> {
        self.handle("OPTIONS", pattern, vec![handler(h)])
    }

    /// Resolve a request against the shared forest
    #[must_use]
    pub fn lookup(&self, method: &str, path: &str) -> Option<RouteMatch> {
        self.routes.read().lookup(method, path)
    }

    /// All registered routes across the forest
    #[must_use]
    pub fn routes(&self) -> Vec<(String, String)> {
        self.routes.read().routes()
    }

    /// Accumulated path prefix of this group, `""` for the root
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Middleware prepended to every route registered on this group
    #[must_use]
    pub fn middlewares(&self) -> &[HandlerFn] {
        &self.middlewares
    }

    /// Full prefixes of the groups created from this router
    #[must_use]
    pub fn groups(&self) -> &[String] {
        &self.sub_routers
    }

    /// `true` when both routers register into the same forest
    #[must_use]
    pub fn shares_forest_with(&self, other: &Router) -> bool {
        Arc::ptr_eq(&self.routes, &other.routes)
    }
}
