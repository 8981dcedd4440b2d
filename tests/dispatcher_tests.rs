use http::{Request, StatusCode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use switchyard::middleware::recover;
use switchyard::{handler, ChainError, Context, Dispatcher, Handler, HandlerFn, RuntimeConfig};

mod tracing_util;
use tracing_util::TestTracing;

type Log = Arc<Mutex<Vec<String>>>;

fn app() -> Dispatcher {
    Dispatcher::with_config(RuntimeConfig::default())
}

fn get(path: &str) -> Request<Vec<u8>> {
    Request::get(path).body(Vec::new()).unwrap()
}

fn tag(log: &Log, name: &'static str) -> HandlerFn {
    let log = Arc::clone(log);
    handler(move |ctx: &mut Context| {
        log.lock().unwrap().push(name.to_string());
        ctx.next();
    })
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

#[test]
fn test_scenario_param_route_invoked_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(None));
    let mut app = app();
    app.get("/", |ctx: &mut Context| ctx.string(200, "root")).unwrap();
    {
        let calls = Arc::clone(&calls);
        let seen = Arc::clone(&seen);
        app.get("/users/:id", move |ctx: &mut Context| {
            calls.fetch_add(1, Ordering::SeqCst);
            let params: Vec<(String, String)> = ctx
                .params()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            *seen.lock().unwrap() = Some(params);
        })
        .unwrap();
    }
    app.get("/files/*path", |ctx: &mut Context| ctx.string(200, "file"))
        .unwrap();

    let resp = app.dispatch(get("/users/42"));
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        seen.lock().unwrap().clone(),
        Some(vec![("id".to_string(), "42".to_string())])
    );
}

#[test]
fn test_scenario_literal_beats_param() {
    let mut app = app();
    app.get("/a/:x", |ctx: &mut Context| ctx.string(200, "param"))
        .unwrap();
    app.get("/a/b", |ctx: &mut Context| ctx.string(200, "literal"))
        .unwrap();
    for _ in 0..3 {
        assert_eq!(app.dispatch(get("/a/b")).body(), b"literal");
    }
    assert_eq!(app.dispatch(get("/a/c")).body(), b"param");
}

#[test]
fn test_scenario_abort_without_next() {
    let log: Log = Arc::default();
    let mut app = app();
    let mw1 = {
        let log = Arc::clone(&log);
        move |ctx: &mut Context| {
            log.lock().unwrap().push("mw1-before".into());
            ctx.next();
            log.lock().unwrap().push("mw1-after".into());
        }
    };
    let mw2 = {
        let log = Arc::clone(&log);
        handler(move |ctx: &mut Context| {
            log.lock().unwrap().push("mw2-abort".into());
            ctx.string(403, "stopped");
            ctx.abort();
        })
    };
    let terminal = {
        let log = Arc::clone(&log);
        handler(move |_ctx: &mut Context| log.lock().unwrap().push("handler".into()))
    };
    app.use_middleware(mw1);
    app.handle("GET", "/x", vec![mw2, terminal]).unwrap();

    let resp = app.dispatch(get("/x"));
    assert_eq!(entries(&log), ["mw1-before", "mw2-abort", "mw1-after"]);
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(resp.body(), b"stopped");
}

#[test]
fn test_scenario_nested_group_middleware() {
    let log: Log = Arc::default();
    let mut app = app();
    let mut api = app.route("/api");
    api.use_all([tag(&log, "A")]);
    let mut v1 = api.group("/v1");
    v1.use_all([tag(&log, "B")]);

    let handler_tag = |name: &'static str| {
        let log = Arc::clone(&log);
        move |_ctx: &mut Context| log.lock().unwrap().push(name.to_string())
    };
    v1.get("/x", handler_tag("v1-x")).unwrap();
    api.get("/other", handler_tag("other")).unwrap();

    app.dispatch(get("/api/v1/x"));
    assert_eq!(entries(&log), ["A", "B", "v1-x"]);

    log.lock().unwrap().clear();
    app.dispatch(get("/api/other"));
    assert_eq!(entries(&log), ["A", "other"]);
}

#[test]
fn test_parent_middleware_added_later_does_not_leak_into_group() {
    let log: Log = Arc::default();
    let mut app = app();
    let mut api = app.route("/api");
    let mut v1 = api.group("/v1");
    api.use_all([tag(&log, "late")]);
    v1.get("/x", |_ctx: &mut Context| {}).unwrap();
    api.get("/y", |_ctx: &mut Context| {}).unwrap();

    app.dispatch(get("/api/v1/x"));
    assert!(entries(&log).is_empty());
    app.dispatch(get("/api/y"));
    assert_eq!(entries(&log), ["late"]);
}

#[test]
fn test_global_middleware_registered_after_routes_applies() {
    let log: Log = Arc::default();
    let mut app = app();
    app.get("/x", |ctx: &mut Context| ctx.string(200, "x")).unwrap();
    let global = tag(&log, "global");
    app.use_middleware(move |ctx: &mut Context| global.call(ctx));

    app.dispatch(get("/x"));
    app.dispatch(get("/missing"));
    assert_eq!(entries(&log), ["global", "global"]);
}

#[test]
fn test_error_handlers_each_see_error_once() {
    let seen: Log = Arc::default();
    let mut app = app();
    for name in ["first", "second"] {
        let seen = Arc::clone(&seen);
        app.use_error(move |err: &ChainError, ctx: &mut Context| {
            seen.lock().unwrap().push(format!("{name}:{err}"));
            ctx.string(500 + seen.lock().unwrap().len() as u16, name);
        });
    }
    app.get("/fail", |ctx: &mut Context| {
        ctx.next_with_error(ChainError::msg("boom"));
    })
    .unwrap();

    let resp = app.dispatch(get("/fail"));
    assert_eq!(entries(&seen), ["first:boom", "second:boom"]);
    // First status write wins, later bodies append
    assert_eq!(resp.status(), StatusCode::from_u16(501).unwrap());
    assert_eq!(resp.body(), b"firstsecond");
}

#[test]
fn test_recorded_error_does_not_stop_chain() {
    let log: Log = Arc::default();
    let mut app = app();
    app.use_error(|_err: &ChainError, _ctx: &mut Context| {});
    app.use_middleware(|ctx: &mut Context| ctx.next_with_error(ChainError::msg("early")));
    let log_handler = Arc::clone(&log);
    app.get("/x", move |ctx: &mut Context| {
        log_handler.lock().unwrap().push("handler".into());
        ctx.string(200, "still ran");
    })
    .unwrap();

    let resp = app.dispatch(get("/x"));
    assert_eq!(entries(&log), ["handler"]);
    assert_eq!(resp.body(), b"still ran");
}

#[test]
fn test_not_found_skips_error_handlers() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut app = app();
    {
        let calls = Arc::clone(&calls);
        app.use_error(move |_err: &ChainError, _ctx: &mut Context| {
            calls.fetch_add(1, Ordering::SeqCst);
        });
    }
    let resp = app.dispatch(get("/nowhere"));
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.body(), b"404 page not found");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_method_mismatch_is_not_found() {
    let mut app = app();
    app.post("/items", |ctx: &mut Context| ctx.string(201, "created"))
        .unwrap();
    assert_eq!(app.dispatch(get("/items")).status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_unhandled_error_is_logged() {
    let tracing = TestTracing::init();
    let mut app = app();
    app.get("/fail", |ctx: &mut Context| {
        ctx.string(200, "partial");
        ctx.next_with_error(ChainError::msg("nobody listens"));
    })
    .unwrap();

    let resp = app.dispatch(get("/fail"));
    assert_eq!(resp.body(), b"partial");
    let warnings =
        tracing.with_message("Request finished with an error and no error handler is registered");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].level, tracing::Level::WARN);
    assert_eq!(warnings[0].field("error"), Some("nobody listens"));
}

#[test]
fn test_recover_routes_panic_to_error_handlers() {
    let tracing = TestTracing::init();
    let mut app = app();
    app.use_middleware(recover());
    app.use_error(|err: &ChainError, ctx: &mut Context| {
        assert!(err.is_panic());
        ctx.string(500, format!("recovered: {err}"));
    });
    app.get("/panic", |_ctx: &mut Context| {
        panic!("kaboom");
    })
    .unwrap();

    let resp = app.dispatch(get("/panic"));
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.body(), b"recovered: kaboom");
    let recovered = tracing.with_message("Panic recovered");
    assert_eq!(recovered.len(), 1);
    assert_eq!(recovered[0].level, tracing::Level::ERROR);
    assert_eq!(recovered[0].field("panic"), Some("kaboom"));

    // The pooled context was reset and the dispatcher keeps serving
    app.get("/ok", |ctx: &mut Context| ctx.string(200, "fine")).unwrap();
    assert_eq!(app.dispatch(get("/ok")).body(), b"fine");
}

#[test]
fn test_store_is_request_scoped() {
    let mut app = Dispatcher::with_config(RuntimeConfig {
        context_pool_capacity: 1,
    });
    app.use_middleware(|ctx: &mut Context| {
        if let Some(user) = ctx.header("x-user") {
            let user = user.to_string();
            ctx.set("user", user);
        }
        ctx.next();
    });
    app.get("/me", |ctx: &mut Context| {
        let user = ctx.get_string("user").unwrap_or("anonymous").to_string();
        ctx.string(200, user);
    })
    .unwrap();

    let with_user = Request::get("/me").header("x-user", "ada").body(Vec::new()).unwrap();
    assert_eq!(app.dispatch(with_user).body(), b"ada");
    assert_eq!(app.dispatch(get("/me")).body(), b"anonymous");
}

#[test]
fn test_concurrent_dispatch_has_no_param_crosstalk() {
    let mut app = app();
    app.get("/users/:id/posts/:post", |ctx: &mut Context| {
        let body = format!(
            "{}:{}",
            ctx.param("id").unwrap_or_default(),
            ctx.param("post").unwrap_or_default()
        );
        ctx.string(200, body);
    })
    .unwrap();
    let app = Arc::new(app);

    let workers: Vec<_> = (0..8)
        .map(|t| {
            let app = Arc::clone(&app);
            thread::spawn(move || {
                for i in 0..200 {
                    let path = format!("/users/{t}/posts/{i}");
                    let resp = app.dispatch(get(&path));
                    assert_eq!(resp.body(), format!("{t}:{i}").as_bytes());
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }
    assert!(app.pooled_contexts() <= 8);
}
