//! Segment tree used to match request paths, one tree per HTTP method.
//!
//! Patterns are split on `/` with empty segments discarded, so `/users/:id`,
//! `users/:id/` and `//users//:id` all describe the same route. Three kinds
//! of segment are understood:
//!
//! - literal (`users`) - must match exactly
//! - named parameter (`:id`) - binds exactly one segment
//! - wildcard (`*path`) - binds every remaining segment joined with `/`;
//!   anything written after it in a pattern is ignored
//!
//! ## Precedence
//!
//! Each node keeps its children in three buckets: literal children keyed by
//! segment, at most one parameter child and at most one wildcard child. A
//! lookup always tries them in that order and backtracks to the next bucket
//! when a branch fails to reach a terminal node, so `/users/new` beats
//! `/users/:id` no matter which was registered first.
//!
//! ```text
//! GET root ─┬─ "users" ─┬─ "new"         (/users/new)
//!           │           └─ :id ── "posts" (/users/:id/posts)
//!           └─ "files" ─── *path          (/files/*path)
//! ```

use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

use crate::error::RouteError;
use crate::handler::HandlerFn;

/// Number of captured parameters kept inline before spilling to the heap.
/// Most routes bind well under eight segments.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Captured `(name, value)` pairs in binding order.
///
/// Names are `Arc<str>` handed out by the tree, so binding a parameter never
/// copies the name.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Path parameters captured during a lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    inner: ParamVec,
}

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value bound to `name`
    ///
    /// If the same name was bound twice along a path the later binding wins.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    fn push(&mut self, name: &Arc<str>, value: String) {
        self.inner.push((Arc::clone(name), value));
    }

    fn truncate(&mut self, len: usize) {
        self.inner.truncate(len);
    }
}

/// Split a route pattern into significant segments.
///
/// Empty segments are dropped. A segment starting with `*` ends the split:
/// it stands for the rest of the path.
pub fn split_segments(path: &str) -> SmallVec<[&str; 16]> {
    let mut parts = SmallVec::new();
    for segment in path.split('/') {
        if segment.is_empty() {
            continue;
        }
        parts.push(segment);
        if segment.starts_with('*') {
            break;
        }
    }
    parts
}

/// Split a request path into its non-empty segments.
///
/// `*` carries no meaning in a request path, so every segment is kept.
pub fn split_request_path(path: &str) -> SmallVec<[&str; 16]> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

/// Node in a route tree
///
/// A node is terminal iff `pattern` is non-empty; only terminal nodes carry
/// handlers.
#[derive(Clone, Default)]
pub struct RouteNode {
    /// Segment this node represents, `""` for the root
    part: String,
    /// Full registered pattern, set on terminal nodes only
    pattern: String,
    /// True when `part` starts with `:` or `*`
    is_wild: bool,
    /// Parameter or wildcard name without its sigil
    name: Option<Arc<str>>,
    /// Chain stored for this route (group middleware followed by handlers)
    handlers: Vec<HandlerFn>,
    static_children: BTreeMap<String, RouteNode>,
    param_child: Option<Box<RouteNode>>,
    wildcard_child: Option<Box<RouteNode>>,
}

impl std::fmt::Debug for RouteNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteNode")
            .field("part", &self.part)
            .field("pattern", &self.pattern)
            .field("is_wild", &self.is_wild)
            .field("handlers", &self.handlers.len())
            .field("static_children", &self.static_children.keys().collect::<Vec<_>>())
            .field("param_child", &self.param_child.as_ref().map(|c| &c.part))
            .field("wildcard_child", &self.wildcard_child.as_ref().map(|c| &c.part))
            .finish()
    }
}

impl RouteNode {
    fn new(part: &str) -> Self {
        let is_wild = part.starts_with(':') || part.starts_with('*');
        let name = is_wild.then(|| Arc::<str>::from(&part[1..]));
        Self {
            part: part.to_string(),
            is_wild,
            name,
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn part(&self) -> &str {
        &self.part
    }

    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[inline]
    #[must_use]
    pub fn is_wild(&self) -> bool {
        self.is_wild
    }

    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !self.pattern.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn handlers(&self) -> &[HandlerFn] {
        &self.handlers
    }

    fn child_for_insert(&mut self, part: &str, pattern: &str) -> Result<&mut RouteNode, RouteError> {
        let (slot, sigil) = match part.as_bytes().first() {
            Some(b':') => (&mut self.param_child, ':'),
            Some(b'*') => (&mut self.wildcard_child, '*'),
            _ => {
                return Ok(self
                    .static_children
                    .entry(part.to_string())
                    .or_insert_with(|| RouteNode::new(part)));
            }
        };

        if part.len() == 1 {
            return Err(RouteError::EmptyParamName {
                pattern: pattern.to_string(),
            });
        }

        if let Some(existing) = slot.as_deref() {
            if existing.part != part {
                let existing = existing.part[1..].to_string();
                let requested = part[1..].to_string();
                let pattern = pattern.to_string();
                return Err(if sigil == ':' {
                    RouteError::ConflictingParam {
                        existing,
                        requested,
                        pattern,
                    }
                } else {
                    RouteError::ConflictingWildcard {
                        existing,
                        requested,
                        pattern,
                    }
                });
            }
        }

        Ok(&mut **slot.get_or_insert_with(|| Box::new(RouteNode::new(part))))
    }

    fn search<'a>(&'a self, parts: &[&str], params: &mut Params) -> Option<&'a RouteNode> {
        let Some((&segment, rest)) = parts.split_first() else {
            return self.is_terminal().then_some(self);
        };

        if let Some(child) = self.static_children.get(segment) {
            if let Some(found) = child.search(rest, params) {
                return Some(found);
            }
        }

        if let Some(child) = self.param_child.as_deref() {
            if let Some(name) = &child.name {
                let mark = params.len();
                params.push(name, segment.to_string());
                if let Some(found) = child.search(rest, params) {
                    return Some(found);
                }
                // Unbind before trying the wildcard bucket
                params.truncate(mark);
            }
        }

        if let Some(child) = self.wildcard_child.as_deref() {
            if let (Some(name), true) = (&child.name, child.is_terminal()) {
                params.push(name, parts.join("/"));
                return Some(child);
            }
        }

        None
    }

    fn collect_patterns<'a>(&'a self, out: &mut Vec<&'a str>) {
        if self.is_terminal() {
            out.push(&self.pattern);
        }
        for child in self.static_children.values() {
            child.collect_patterns(out);
        }
        if let Some(child) = &self.param_child {
            child.collect_patterns(out);
        }
        if let Some(child) = &self.wildcard_child {
            child.collect_patterns(out);
        }
    }
}

/// Route tree for a single HTTP method
#[derive(Clone, Default, Debug)]
pub struct RouteTree {
    root: RouteNode,
}

impl RouteTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `handlers` under `pattern`, replacing any previous registration
    /// of the identical pattern.
    pub fn insert(&mut self, pattern: &str, handlers: Vec<HandlerFn>) -> Result<(), RouteError> {
        let mut node = &mut self.root;
        for part in split_segments(pattern) {
            node = node.child_for_insert(part, pattern)?;
        }

        if node.is_terminal() {
            warn!(
                pattern = %pattern,
                previous = %node.pattern,
                "Route registered twice, replacing previous handlers"
            );
        }
        node.pattern = pattern.to_string();
        node.handlers = handlers;
        Ok(())
    }

    /// Find the terminal node for `path`, with the parameters bound on the way.
    #[must_use]
    pub fn search(&self, path: &str) -> Option<(&RouteNode, Params)> {
        let parts = split_request_path(path);
        let mut params = Params::new();
        let node = self.root.search(&parts, &mut params)?;
        Some((node, params))
    }

    /// Every registered pattern, in tree order
    #[must_use]
    pub fn patterns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.root.collect_patterns(&mut out);
        out
    }
}
