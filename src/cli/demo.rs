use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::context::Context;
use crate::dispatcher::Dispatcher;
use crate::error::{ChainError, RouteError};
use crate::middleware::{recover, AuthMiddleware, CorsMiddleware, Layered, RequestLogger};
use crate::runtime_config::RuntimeConfig;

/// Token accepted by the demo's `/admin` group
pub const DEMO_TOKEN: &str = "secret";

#[derive(Debug, Serialize, Deserialize)]
struct NewUser {
    name: String,
}

fn index(ctx: &mut Context) {
    ctx.string(200, "switchyard demo");
}

fn health(ctx: &mut Context) {
    send_json(ctx, 200, &serde_json::json!({ "status": "ok" }));
}

fn list_users(ctx: &mut Context) {
    let limit = ctx.query("limit").unwrap_or_else(|| "10".into());
    send_json(ctx, 200, &serde_json::json!({ "users": [], "limit": limit }));
}

fn new_user_form(ctx: &mut Context) {
    ctx.string(200, "new user form");
}

fn show_user(ctx: &mut Context) {
    let id = ctx.param("id").unwrap_or_default().to_string();
    send_json(ctx, 200, &serde_json::json!({ "id": id }));
}

fn create_user(ctx: &mut Context) {
    match ctx.bind_json::<NewUser>() {
        Ok(user) => send_json(ctx, 201, &user),
        Err(err) => ctx.next_with_error(err),
    }
}

fn show_post(ctx: &mut Context) {
    let body = serde_json::json!({
        "user": ctx.param("id"),
        "post": ctx.param("post"),
    });
    send_json(ctx, 200, &body);
}

fn serve_file(ctx: &mut Context) {
    let path = ctx.param("path").unwrap_or_default().to_string();
    ctx.string(200, format!("file: {path}"));
}

fn fail(ctx: &mut Context) {
    ctx.next_with_error(ChainError::msg("demo failure"));
}

#[allow(clippy::panic)]
fn explode(_ctx: &mut Context) {
    panic!("demo panic");
}

fn admin_stats(ctx: &mut Context) {
    send_json(ctx, 200, &serde_json::json!({ "routes": "ok" }));
}

fn send_json<T: Serialize + ?Sized>(ctx: &mut Context, code: u16, value: &T) {
    if let Err(err) = ctx.json(code, value) {
        ctx.next_with_error(err);
    }
}

fn render_error(err: &ChainError, ctx: &mut Context) {
    let code = if err.is_panic() { 500 } else { 400 };
    if let Err(render_err) = ctx.json(code, &serde_json::json!({ "error": err.to_string() })) {
        warn!(error = %render_err, "Failed to render error body");
    }
}

/// Demo application used by the CLI commands
///
/// Routes cover literal, `:param` and `*wildcard` segments, a static route
/// that shadows a parameter, an authenticated group, and handlers that
/// record an error or panic.
pub fn demo_app() -> Result<Dispatcher, RouteError> {
    let mut app = Dispatcher::with_config(RuntimeConfig::from_env());
    app.use_middleware(recover())
        .use_middleware(RequestLogger::new().skip_paths(["/health"]))
        .use_middleware(Layered::new(CorsMiddleware::default()))
        .use_error(render_error);

    app.get("/", index)?.get("/health", health)?;

    let mut api = app.route("/api/v1");
    api.get("/users", list_users)?
        .post("/users", create_user)?
        .get("/users/new", new_user_form)?
        .get("/users/:id", show_user)?
        .get("/users/:id/posts/:post", show_post)?
        .get("/files/*path", serve_file)?
        .get("/fail", fail)?
        .get("/panic", explode)?;

    let mut admin = app.route("/admin");
    admin.use_middleware(Layered::new(AuthMiddleware::new(DEMO_TOKEN)));
    admin.get("/stats", admin_stats)?;

    Ok(app)
}
