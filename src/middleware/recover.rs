use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::error;

use crate::context::Context;
use crate::error::ChainError;
use crate::handler::Handler;

/// Middleware turning a panic downstream into a [`ChainError::Panic`]
///
/// The chain is aborted and the error is recorded, so registered error
/// handlers decide what the client sees. Register it first so it encloses
/// every other handler.
pub fn recover() -> impl Handler {
    recover_panics
}

fn recover_panics(ctx: &mut Context) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| ctx.next()));
    if let Err(payload) = outcome {
        let message = panic_message(payload.as_ref());
        error!(
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            path = %ctx.path(),
            panic = %message,
            "Panic recovered"
        );
        ctx.abort();
        ctx.next_with_error(ChainError::panic(message));
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
