mod common;

use common::{page_json, page_response, url, Harness};
use pageswap::browser::Navigation;
use pageswap::events::{Event, EventKind};
use pageswap::page::Page;
use pageswap::transport::HttpResponse;
use pageswap::visit::Preserve;
use pageswap::{Response, VisitParams};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn home() -> Page {
    Page::new("Home", url("/"))
}

fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let bump = count.clone();
    (count, move || {
        bump.fetch_add(1, Ordering::SeqCst);
    })
}

#[tokio::test]
async fn test_sync_visit_commits_page() {
    let h = Harness::new(home());
    h.transport.route(
        "/users",
        page_response(page_json("Users/Index", "/users", json!({"users": [1, 2]}))),
    );
    let successes = h.capture(EventKind::Success);
    let navigations = h.capture(EventKind::Navigate);
    let (count, bump) = counter();

    h.router
        .visit(VisitParams::get("/users").on_success(move |_| bump()))
        .await
        .unwrap();

    let page = h.router.page();
    assert_eq!(page.component, "Users/Index");
    assert_eq!(page.url, url("/users"));
    assert_eq!(page.props["users"], json!([1, 2]));
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(successes.lock().len(), 1);
    assert_eq!(navigations.lock().len(), 1);
    assert_eq!(h.browser.history_len(), 2);
    assert_eq!(h.browser.scroll_resets(), 1);
}

#[tokio::test]
async fn test_prefetch_leaves_page_untouched() {
    let h = Harness::new(home());
    h.transport.route(
        "/users",
        page_response(page_json("Users/Index", "/users", json!({}))),
    );
    let prefetched = h.capture(EventKind::Prefetched);
    let navigations = h.capture(EventKind::Navigate);
    let (hook_calls, bump) = counter();
    let (finished, finish) = counter();

    h.router
        .visit(
            VisitParams::get("/users")
                .prefetch()
                .on_prefetched(move |_| bump())
                .on_finish(move |_| finish()),
        )
        .await
        .unwrap();

    assert_eq!(h.router.page(), home());
    assert_eq!(hook_calls.load(Ordering::SeqCst), 1);
    assert_eq!(finished.load(Ordering::SeqCst), 0);
    assert!(navigations.lock().is_empty());
    assert!(h.renderer.swaps().is_empty());
    assert_eq!(h.browser.history_len(), 1);

    let events = prefetched.lock();
    assert_eq!(events.len(), 1);
    match &events[0] {
        Event::Prefetched { url, body } => {
            assert_eq!(url, "/users");
            assert_eq!(body["component"], "Users/Index");
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_prefetched_response_applied_with_live_params() {
    let h = Harness::new(home());
    h.transport.route(
        "/users",
        page_response(page_json("Users/Index", "/users", json!({}))),
    );
    let stash: Arc<Mutex<Option<Response>>> = Arc::new(Mutex::new(None));
    let sink = stash.clone();

    h.router
        .visit(
            VisitParams::get("/users")
                .prefetch()
                .on_prefetch_response(move |response| *sink.lock() = Some(response.clone())),
        )
        .await
        .unwrap();
    assert_eq!(h.router.page().component, "Home");

    let (count, bump) = counter();
    let mut response = stash.lock().take().expect("prefetched response");
    response.merge_params(&VisitParams::get("/users").on_success(move |_| bump()));
    h.router.enqueue(response).await;

    assert_eq!(h.router.page().component, "Users/Index");
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(h.transport.sent(), vec!["/users".to_string()]);
}

#[tokio::test]
async fn test_finish_callbacks_run_once_per_visit() {
    let h = Harness::new(home());
    h.transport.route(
        "/users",
        page_response(page_json("Users/Index", "/users", json!({}))),
    );
    let (finished, finish) = counter();

    h.router
        .visit(VisitParams::get("/users").on_finish(move |_| finish()))
        .await
        .unwrap();

    assert_eq!(finished.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_validation_errors_scoped_to_error_bag() {
    let h = Harness::new(Page::new("Users/Create", url("/users/create")));
    h.transport.route(
        "/users",
        page_response(page_json(
            "Users/Create",
            "/users/create",
            json!({"errors": {"createUser": {"name": "The name field is required."}}}),
        )),
    );
    let order = Arc::new(Mutex::new(Vec::<String>::new()));
    let from_event = order.clone();
    h.router.events().on(EventKind::Error, move |event| {
        if let Event::Error { errors } = event {
            from_event.lock().push(format!("event:{}", Value::Object(errors.clone())));
        }
        false
    });
    let from_hook = order.clone();
    let successes = h.capture(EventKind::Success);

    h.router
        .visit(
            VisitParams::post("/users")
                .error_bag("createUser")
                .on_error(move |errors| {
                    from_hook.lock().push(format!("hook:{}", Value::Object(errors.clone())));
                })
                .on_success(|_| panic!("success hook must not run")),
        )
        .await
        .unwrap();

    let scoped = r#"{"name":"The name field is required."}"#;
    assert_eq!(
        *order.lock(),
        vec![format!("event:{}", scoped), format!("hook:{}", scoped)]
    );
    assert!(successes.lock().is_empty());
    assert!(h.router.page().has_errors());
}

#[tokio::test]
async fn test_preserve_scroll_on_errors_only() {
    let h = Harness::new(Page::new("Form", url("/form")));
    h.transport.route(
        "/invalid",
        page_response(page_json("Form", "/form", json!({"errors": {"email": "taken"}}))),
    );
    h.transport.route(
        "/valid",
        page_response(page_json("Done", "/done", json!({}))),
    );

    h.router
        .visit(VisitParams::post("/invalid").preserve_scroll(Preserve::Errors))
        .await
        .unwrap();
    assert_eq!(h.browser.scroll_resets(), 0);

    h.router
        .visit(VisitParams::post("/valid").preserve_scroll(Preserve::Errors))
        .await
        .unwrap();
    assert_eq!(h.browser.scroll_resets(), 1);
}

#[tokio::test]
async fn test_location_visit_assigns_external_url() {
    let h = Harness::new(home());
    h.transport.route(
        "/login",
        HttpResponse::new(409, Value::Null).with_header("X-Inertia-Location", "https://sso.test/auth"),
    );

    h.router.visit(VisitParams::get("/login")).await.unwrap();

    assert_eq!(
        h.browser.navigations(),
        vec![Navigation::Assign("https://sso.test/auth".to_string())]
    );
    let marker = pageswap::session::SessionStore::get(h.browser.as_ref(), "inertiaLocationVisit")
        .unwrap()
        .expect("marker stored");
    assert_eq!(marker, r#"{"preserveScroll":false}"#);
    assert_eq!(h.router.page().component, "Home");
}

#[tokio::test]
async fn test_location_visit_to_same_document_reloads() {
    let h = Harness::new(Page::new("Settings", url("/settings")));
    h.transport.route(
        "/settings",
        HttpResponse::new(409, Value::Null).with_header("X-Inertia-Location", &url("/settings#billing")),
    );

    h.router
        .visit(VisitParams::get("/settings").preserve_scroll(Preserve::Yes))
        .await
        .unwrap();

    assert_eq!(h.browser.navigations(), vec![Navigation::Reload]);
    let marker = pageswap::session::SessionStore::get(h.browser.as_ref(), "inertiaLocationVisit")
        .unwrap()
        .expect("marker stored");
    assert_eq!(marker, r#"{"preserveScroll":true}"#);
}

#[tokio::test]
async fn test_location_visit_skipped_without_session_storage() {
    let h = Harness::new(home());
    h.browser.set_session_available(false);
    h.transport.route(
        "/login",
        HttpResponse::new(409, Value::Null).with_header("X-Inertia-Location", "https://sso.test/auth"),
    );

    h.router.visit(VisitParams::get("/login")).await.unwrap();

    assert!(h.browser.navigations().is_empty());
    assert_eq!(h.router.page(), home());
}

#[tokio::test]
async fn test_invalid_response_shows_modal() {
    let h = Harness::new(home());
    h.transport.route(
        "/broken",
        HttpResponse::new(500, Value::String("<h1>Server Error</h1>".to_string())),
    );
    let invalid = h.capture(EventKind::Invalid);

    h.router.visit(VisitParams::get("/broken")).await.unwrap();

    assert_eq!(h.browser.modal_contents(), vec!["<h1>Server Error</h1>".to_string()]);
    assert_eq!(invalid.lock().len(), 1);
    assert_eq!(h.router.page(), home());
}

#[tokio::test]
async fn test_intercepted_invalid_response_skips_modal() {
    let h = Harness::new(home());
    h.transport.route(
        "/broken",
        HttpResponse::new(500, Value::String("<h1>Server Error</h1>".to_string())),
    );
    h.router.events().on(EventKind::Invalid, |_| true);

    h.router.visit(VisitParams::get("/broken")).await.unwrap();

    assert!(h.browser.modal_contents().is_empty());
}

#[tokio::test]
async fn test_preserve_url_keeps_current_url() {
    let h = Harness::new(Page::new("Feed", url("/feed")));
    h.transport.route(
        "/feed?page=2",
        page_response(page_json("Feed", "/feed?page=2", json!({"posts": [3, 4]}))),
    );

    h.router
        .visit(VisitParams::get("/feed?page=2").preserve_url(true))
        .await
        .unwrap();

    let page = h.router.page();
    assert_eq!(page.url, url("/feed"));
    assert_eq!(page.props["posts"], json!([3, 4]));
    assert!(!h.router.context().history.preserve_url());
}

#[tokio::test]
async fn test_request_hash_carried_onto_response_url() {
    let h = Harness::new(home());
    h.transport.route(
        "/docs#install",
        page_response(page_json("Docs", "/docs", json!({}))),
    );

    h.router.visit(VisitParams::get("/docs#install")).await.unwrap();

    assert_eq!(h.router.page().url, url("/docs#install"));
}

#[tokio::test]
async fn test_partial_reload_merges_props() {
    let mut feed = Page::new("Feed", url("/feed"))
        .with_prop("posts", json!([1, 2]))
        .with_prop("user", json!("ann"));
    feed.version = Some("v1".to_string());
    let h = Harness::new(feed);
    let mut body = page_json("Feed", "/feed", json!({"posts": [3]}));
    body["mergeProps"] = json!(["posts"]);
    h.transport.route("/feed", page_response(body));

    h.router
        .visit(VisitParams::partial_reload("/feed", &["posts"]))
        .await
        .unwrap();

    let page = h.router.page();
    assert_eq!(page.props["posts"], json!([1, 2, 3]));
    assert_eq!(page.props["user"], json!("ann"));
    assert_eq!(h.browser.history_len(), 1);
}

#[tokio::test]
async fn test_remembered_state_carried_for_same_component() {
    let h = Harness::new(Page::new("Form", url("/form")));
    let mut draft = serde_json::Map::new();
    draft.insert("draft".to_string(), json!("hello"));
    h.router.remember(draft.clone()).unwrap();
    h.transport.route("/form", page_response(page_json("Form", "/form", json!({}))));

    h.router
        .visit(VisitParams::get("/form").preserve_state(Preserve::Yes))
        .await
        .unwrap();

    assert_eq!(h.router.restore(), draft);
}

#[tokio::test]
async fn test_remembered_state_dropped_for_other_component() {
    let h = Harness::new(Page::new("Form", url("/form")));
    let mut draft = serde_json::Map::new();
    draft.insert("draft".to_string(), json!("hello"));
    h.router.remember(draft).unwrap();
    h.transport.route("/done", page_response(page_json("Done", "/done", json!({}))));

    h.router
        .visit(VisitParams::get("/done").preserve_state(Preserve::Yes))
        .await
        .unwrap();

    assert_eq!(h.router.page().component, "Done");
    assert!(h.router.restore().is_empty());
}

#[tokio::test]
async fn test_unknown_component_leaves_page_untouched() {
    let renderer = pageswap::render::StaticRenderer::new().with_components(["Home"]);
    let h = Harness::with_renderer(renderer, home());
    h.transport.route("/ghost", page_response(page_json("Ghost", "/ghost", json!({}))));
    let navigations = h.capture(EventKind::Navigate);

    h.router.visit(VisitParams::get("/ghost")).await.unwrap();

    assert_eq!(h.router.page(), home());
    assert!(navigations.lock().is_empty());
    assert_eq!(h.browser.history_len(), 1);
}
