use std::time::Duration;

use http::Method;

use super::{Middleware, Reply};
use crate::context::Context;

/// CORS (Cross-Origin Resource Sharing) middleware
///
/// Answers preflight `OPTIONS` requests with `204` and stops the chain.
/// Every response, preflight included, gets the allow headers on the way
/// out.
pub struct CorsMiddleware {
    allowed_origins: Vec<String>,
    allowed_headers: Vec<String>,
    allowed_methods: Vec<Method>,
}

impl CorsMiddleware {
    /// # Example
    ///
    /// ```rust
    /// use switchyard::middleware::CorsMiddleware;
    /// use http::Method;
    ///
    /// let cors = CorsMiddleware::new(
    ///     vec!["https://example.com".to_string()],
    ///     vec!["Content-Type".to_string()],
    ///     vec![Method::GET, Method::POST],
    /// );
    /// ```
    pub fn new(
        allowed_origins: Vec<String>,
        allowed_headers: Vec<String>,
        allowed_methods: Vec<Method>,
    ) -> Self {
        Self {
            allowed_origins,
            allowed_headers,
            allowed_methods,
        }
    }

    /// Value for `Access-Control-Allow-Origin`, if the origin is allowed
    fn allow_origin(&self, origin: Option<&str>) -> Option<String> {
        if self.allowed_origins.iter().any(|o| o == "*") {
            return Some("*".into());
        }
        origin
            .filter(|o| self.allowed_origins.iter().any(|allowed| allowed == o))
            .map(str::to_string)
    }
}

/// Permissive policy: any origin, common methods
impl Default for CorsMiddleware {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".into()],
            allowed_headers: vec!["Content-Type".into(), "Authorization".into()],
            allowed_methods: vec![
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::PATCH,
                Method::OPTIONS,
            ],
        }
    }
}

impl Middleware for CorsMiddleware {
    fn before(&self, ctx: &mut Context) -> Option<Reply> {
        (ctx.method() == Method::OPTIONS.as_str()).then(|| Reply::new(204))
    }

    fn after(&self, ctx: &mut Context, _latency: Duration) {
        let Some(origin) = self.allow_origin(ctx.header("origin")) else {
            return;
        };
        ctx.set_header("access-control-allow-origin", &origin);

        let headers = self.allowed_headers.join(", ");
        ctx.set_header("access-control-allow-headers", &headers);

        let methods = self
            .allowed_methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        ctx.set_header("access-control-allow-methods", &methods);
    }
}
