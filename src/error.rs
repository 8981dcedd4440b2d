//! Error types for route registration and the dispatch chain.
//!
//! [`RouteError`] is returned while building the route forest. [`ChainError`]
//! is the value carried by [`Context::next_with_error`] and handed to every
//! registered error handler once the chain has finished.
//!
//! [`Context::next_with_error`]: crate::context::Context::next_with_error

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Boxed error accepted from handlers.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Route registration error
///
/// Each tree position owns at most one named-parameter slot and one wildcard
/// slot, so two patterns that disagree on the name of a dynamic segment at
/// the same depth cannot both be registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// A `:` or `*` segment without a name (e.g. `/users/:`)
    EmptyParamName {
        /// The full pattern being registered
        pattern: String,
    },
    /// A `:param` slot already exists at this position under another name
    ConflictingParam {
        /// Name already stored in the tree
        existing: String,
        /// Name the new pattern tried to use
        requested: String,
        /// The full pattern being registered
        pattern: String,
    },
    /// A `*rest` slot already exists at this position under another name
    ConflictingWildcard {
        /// Name already stored in the tree
        existing: String,
        /// Name the new pattern tried to use
        requested: String,
        /// The full pattern being registered
        pattern: String,
    },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::EmptyParamName { pattern } => {
                write!(f, "route '{}' has a parameter segment without a name", pattern)
            }
            RouteError::ConflictingParam {
                existing,
                requested,
                pattern,
            } => write!(
                f,
                "route '{}' declares ':{}' where ':{}' is already registered",
                pattern, requested, existing
            ),
            RouteError::ConflictingWildcard {
                existing,
                requested,
                pattern,
            } => write!(
                f,
                "route '{}' declares '*{}' where '*{}' is already registered",
                pattern, requested, existing
            ),
        }
    }
}

impl StdError for RouteError {}

/// Error recorded on a request context
///
/// Cloning is cheap: handler errors are held behind an `Arc` so every error
/// handler can observe the same value while the context still owns it.
#[derive(Debug, Clone)]
pub enum ChainError {
    /// A handler reported a failure through `next_with_error`
    Handler(Arc<dyn StdError + Send + Sync + 'static>),
    /// A panic caught by the recovery middleware, with its rendered payload
    Panic(String),
}

impl ChainError {
    /// Wrap any error value
    pub fn handler<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        ChainError::Handler(Arc::from(err.into()))
    }

    /// Build a handler error from a plain message
    pub fn msg(message: impl Into<String>) -> Self {
        let message: String = message.into();
        ChainError::handler(message)
    }

    /// Build the error produced when a panic is recovered
    pub fn panic(message: impl Into<String>) -> Self {
        ChainError::Panic(message.into())
    }

    /// `true` if this error came from a recovered panic
    #[must_use]
    pub fn is_panic(&self) -> bool {
        matches!(self, ChainError::Panic(_))
    }
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::Handler(err) => write!(f, "{}", err),
            ChainError::Panic(message) => write!(f, "{}", message),
        }
    }
}

impl StdError for ChainError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ChainError::Handler(err) => Some(err.as_ref()),
            ChainError::Panic(_) => None,
        }
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        ChainError::handler(err)
    }
}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::handler(err)
    }
}
