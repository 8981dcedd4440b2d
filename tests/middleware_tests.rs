use http::{Method, Request, StatusCode};
use std::sync::Arc;
use std::time::Duration;

use switchyard::middleware::{
    AuthMiddleware, CorsMiddleware, Layered, MetricsMiddleware, Middleware, Reply, RequestLogger,
};
use switchyard::{ChainError, Context, Dispatcher, RuntimeConfig};

mod tracing_util;
use tracing_util::TestTracing;

fn app() -> Dispatcher {
    let mut app = Dispatcher::with_config(RuntimeConfig::default());
    app.get("/items", |ctx: &mut Context| ctx.string(200, "items"))
        .unwrap();
    app.get("/health", |ctx: &mut Context| ctx.string(200, "ok"))
        .unwrap();
    app
}

fn request(method: Method, path: &str) -> Request<Vec<u8>> {
    Request::builder()
        .method(method)
        .uri(path)
        .body(Vec::new())
        .unwrap()
}

#[test]
fn test_auth_rejects_missing_and_wrong_token() {
    let mut app = app();
    app.use_middleware(Layered::new(AuthMiddleware::new("secret")));

    let resp = app.dispatch(request(Method::GET, "/items"));
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers()["content-type"], "application/json");
    assert_eq!(resp.body(), br#"{"error":"Unauthorized"}"#);

    let wrong = Request::get("/items")
        .header("authorization", "guess")
        .body(Vec::new())
        .unwrap();
    assert_eq!(app.dispatch(wrong).status(), StatusCode::UNAUTHORIZED);

    let right = Request::get("/items")
        .header("authorization", "secret")
        .body(Vec::new())
        .unwrap();
    let resp = app.dispatch(right);
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.body(), b"items");
}

#[test]
fn test_cors_preflight_short_circuits() {
    let mut app = app();
    app.use_middleware(Layered::new(CorsMiddleware::default()));
    app.options("/items", |ctx: &mut Context| ctx.string(200, "handler ran"))
        .unwrap();

    let resp = app.dispatch(request(Method::OPTIONS, "/items"));
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(resp.body().is_empty());
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert!(resp.headers()["access-control-allow-methods"]
        .to_str()
        .unwrap()
        .contains("PATCH"));
}

#[test]
fn test_cors_headers_on_normal_response() {
    let mut app = app();
    app.use_middleware(Layered::new(CorsMiddleware::new(
        vec!["https://example.com".into()],
        vec!["Content-Type".into()],
        vec![Method::GET],
    )));

    let allowed = Request::get("/items")
        .header("origin", "https://example.com")
        .body(Vec::new())
        .unwrap();
    let resp = app.dispatch(allowed);
    assert_eq!(resp.body(), b"items");
    assert_eq!(
        resp.headers()["access-control-allow-origin"],
        "https://example.com"
    );
    assert_eq!(resp.headers()["access-control-allow-methods"], "GET");

    let foreign = Request::get("/items")
        .header("origin", "https://evil.test")
        .body(Vec::new())
        .unwrap();
    let resp = app.dispatch(foreign);
    assert!(!resp.headers().contains_key("access-control-allow-origin"));
}

#[test]
fn test_metrics_count_requests_and_errors() {
    let metrics = Arc::new(MetricsMiddleware::new());
    let mut app = app();
    app.use_middleware(Layered::shared(Arc::clone(&metrics)));
    app.use_error(|_err: &ChainError, ctx: &mut Context| ctx.string(500, "error"));
    app.get("/fail", |ctx: &mut Context| {
        ctx.next_with_error(ChainError::msg("nope"));
    })
    .unwrap();

    assert_eq!(metrics.average_latency(), Duration::from_nanos(0));
    app.dispatch(request(Method::GET, "/items"));
    app.dispatch(request(Method::GET, "/fail"));
    app.dispatch(request(Method::GET, "/missing"));

    assert_eq!(metrics.request_count(), 3);
    assert_eq!(metrics.error_count(), 1);
}

#[test]
fn test_request_logger_emits_one_event() {
    let tracing = TestTracing::init();
    let mut app = app();
    app.use_middleware(RequestLogger::new().skip_paths(["/health"]));

    app.dispatch(request(Method::GET, "/items"));
    app.dispatch(request(Method::GET, "/health"));
    app.dispatch(request(Method::GET, "/missing"));

    let events = tracing.with_message("Request completed");
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].field("path"), Some("/items"));
    assert_eq!(events[0].field("status"), Some("200"));
    assert_eq!(events[1].field("path"), Some("/missing"));
    assert_eq!(events[1].field("status"), Some("404"));
}

struct Maintenance;

impl Middleware for Maintenance {
    fn before(&self, ctx: &mut Context) -> Option<Reply> {
        ctx.path()
            .starts_with("/items")
            .then(|| Reply::new(503).with_header("retry-after", "30"))
    }

    fn after(&self, ctx: &mut Context, _latency: Duration) {
        ctx.set_header("x-maintenance-checked", "1");
    }
}

#[test]
fn test_custom_middleware_reply() {
    let mut app = app();
    app.use_middleware(Layered::new(Maintenance));

    let resp = app.dispatch(request(Method::GET, "/items"));
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(resp.headers()["retry-after"], "30");
    assert_eq!(resp.headers()["x-maintenance-checked"], "1");

    let resp = app.dispatch(request(Method::GET, "/health"));
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["x-maintenance-checked"], "1");
}
