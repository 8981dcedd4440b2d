//! Handler signatures for the dispatch chain.
//!
//! Every participant in a chain (global middleware, group middleware, route
//! handlers, logging, recovery) has the same shape: it receives the request
//! [`Context`] and decides whether to call [`Context::next`]. Error handlers
//! additionally receive the [`ChainError`] recorded during the chain.

use std::sync::Arc;

use crate::context::Context;
use crate::error::ChainError;

/// A link in the dispatch chain
///
/// Implemented for every `Fn(&mut Context) + Send + Sync + 'static`, so plain
/// functions and closures can be registered directly.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, ctx: &mut Context);
}

impl<F> Handler for F
where
    F: Fn(&mut Context) + Send + Sync + 'static,
{
    #[inline]
    fn call(&self, ctx: &mut Context) {
        self(ctx)
    }
}

/// Invoked after the chain finishes when the context carries an error
pub trait ErrorHandler: Send + Sync + 'static {
    fn handle(&self, err: &ChainError, ctx: &mut Context);
}

impl<F> ErrorHandler for F
where
    F: Fn(&ChainError, &mut Context) + Send + Sync + 'static,
{
    #[inline]
    fn handle(&self, err: &ChainError, ctx: &mut Context) {
        self(err, ctx)
    }
}

/// Shared handler pointer stored in the route tree and copied into contexts
pub type HandlerFn = Arc<dyn Handler>;

/// Shared error handler pointer
pub type ErrorHandlerFn = Arc<dyn ErrorHandler>;

/// Erase a handler into a [`HandlerFn`]
pub fn handler<H: Handler>(h: H) -> HandlerFn {
    Arc::new(h)
}

/// Build a `Vec<HandlerFn>` from a list of handlers
///
/// ```rust
/// use switchyard::{handlers, Context};
///
/// fn auth(ctx: &mut Context) { ctx.next(); }
/// fn show(ctx: &mut Context) { ctx.string(200, "ok"); }
///
/// let chain = handlers![auth, show];
/// assert_eq!(chain.len(), 2);
/// ```
#[macro_export]
macro_rules! handlers {
    ($($h:expr),* $(,)?) => {
        vec![$($crate::handler::handler($h)),*]
    };
}
