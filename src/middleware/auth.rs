use tracing::debug;

use super::{Middleware, Reply};
use crate::context::Context;

/// Static token check against the `authorization` header
pub struct AuthMiddleware {
    token: String,
}

impl AuthMiddleware {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl Middleware for AuthMiddleware {
    fn before(&self, ctx: &mut Context) -> Option<Reply> {
        match ctx.header("authorization") {
            Some(h) if h == self.token => None,
            presented => {
                debug!(
                    request_id = %ctx.request_id(),
                    path = %ctx.path(),
                    header_present = presented.is_some(),
                    "Authorization rejected"
                );
                Some(Reply::json(
                    401,
                    &serde_json::json!({ "error": "Unauthorized" }),
                ))
            }
        }
    }
}
