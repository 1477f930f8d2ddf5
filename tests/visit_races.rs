mod common;

use common::{page_json, page_response, url, Harness};
use pageswap::events::{Event, EventKind};
use pageswap::page::Page;
use pageswap::render::StaticRenderer;
use pageswap::VisitParams;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn components(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Success { page } | Event::Navigate { page } => Some(page.component.clone()),
            _ => None,
        })
        .collect()
}

/// Two async visits from the same page resolve out of order: the later
/// navigation lands first and the stale reload of the old page is dropped.
#[tokio::test]
async fn test_stale_async_response_discarded() {
    let h = Harness::new(Page::new("Users/Index", url("/users")));
    h.transport.route_delayed(
        "/a",
        Duration::from_millis(60),
        page_response(page_json("Users/Index", "/users", json!({"users": [1]}))),
    );
    h.transport.route_delayed(
        "/b",
        Duration::from_millis(5),
        page_response(page_json("Users/Show", "/users/7", json!({"user": 7}))),
    );
    let successes = h.capture(EventKind::Success);
    let stale_success = Arc::new(AtomicBool::new(false));
    let flag = stale_success.clone();

    let (a, b) = tokio::join!(
        h.router.visit(
            VisitParams::get("/a")
                .asynchronous()
                .on_success(move |_| flag.store(true, Ordering::SeqCst)),
        ),
        h.router.visit(VisitParams::get("/b").asynchronous()),
    );
    a.unwrap();
    b.unwrap();

    let page = h.router.page();
    assert_eq!(page.component, "Users/Show");
    assert_eq!(page.url, url("/users/7"));
    assert!(!stale_success.load(Ordering::SeqCst));
    assert_eq!(components(&successes.lock()), vec!["Users/Show".to_string()]);
    assert_eq!(h.renderer.swaps().len(), 1);
}

/// An async reload still applies when nothing navigated in between.
#[tokio::test]
async fn test_async_reload_applies_when_current() {
    let h = Harness::new(Page::new("Users/Index", url("/users")).with_prop("users", json!([])));
    h.transport.route_delayed(
        "/users",
        Duration::from_millis(10),
        page_response(page_json("Users/Index", "/users", json!({"users": [1, 2]}))),
    );

    h.router
        .visit(VisitParams::get("/users").asynchronous())
        .await
        .unwrap();

    assert_eq!(h.router.page().props["users"], json!([1, 2]));
}

/// Synchronous visits always apply, in the order their responses arrive.
#[tokio::test]
async fn test_sync_responses_apply_in_arrival_order() {
    let h = Harness::new(Page::new("Home", url("/")));
    h.transport.route_delayed(
        "/slow",
        Duration::from_millis(40),
        page_response(page_json("Slow", "/slow", json!({}))),
    );
    h.transport.route_delayed(
        "/fast",
        Duration::from_millis(5),
        page_response(page_json("Fast", "/fast", json!({}))),
    );
    let navigations = h.capture(EventKind::Navigate);

    let (slow, fast) = tokio::join!(
        h.router.visit(VisitParams::get("/slow")),
        h.router.visit(VisitParams::get("/fast")),
    );
    slow.unwrap();
    fast.unwrap();

    assert_eq!(
        components(&navigations.lock()),
        vec!["Fast".to_string(), "Slow".to_string()]
    );
    assert_eq!(h.router.page().component, "Slow");
}

/// A response queued while another is rendering waits for it instead of
/// superseding it.
#[tokio::test]
async fn test_queue_serializes_slow_renders() {
    let renderer = StaticRenderer::new().with_delay("Slow", Duration::from_millis(30));
    let h = Harness::with_renderer(renderer, Page::new("Home", url("/")));
    let successes = h.capture(EventKind::Success);
    let originating = h.router.page();

    tokio::join!(
        h.router.handle_response(
            VisitParams::get("/slow"),
            originating.clone(),
            page_response(page_json("Slow", "/slow", json!({}))),
        ),
        h.router.handle_response(
            VisitParams::get("/fast"),
            originating.clone(),
            page_response(page_json("Fast", "/fast", json!({}))),
        ),
    );

    assert_eq!(
        components(&successes.lock()),
        vec!["Slow".to_string(), "Fast".to_string()]
    );
    assert_eq!(h.router.page().component, "Fast");
    assert_eq!(h.browser.history_len(), 3);
}

/// Abandoning a visit while its page renders does not stall later visits.
#[tokio::test]
async fn test_cancelled_visit_does_not_block_queue() {
    let renderer = StaticRenderer::new().with_delay("Slow", Duration::from_millis(200));
    let h = Harness::with_renderer(renderer, Page::new("Home", url("/")));
    h.transport.route("/slow", page_response(page_json("Slow", "/slow", json!({}))));
    h.transport.route("/next", page_response(page_json("Next", "/next", json!({}))));

    let abandoned = tokio::time::timeout(
        Duration::from_millis(20),
        h.router.visit(VisitParams::get("/slow")),
    )
    .await;
    assert!(abandoned.is_err());

    h.router.visit(VisitParams::get("/next")).await.unwrap();

    assert_eq!(h.router.page().component, "Next");
    assert_eq!(h.browser.history_len(), 2);
}
