//! Shared test utilities: scripted transport and router fixtures.

#![allow(dead_code, unused_imports)]

use async_trait::async_trait;
use pageswap::browser::MemoryBrowser;
use pageswap::config::Config;
use pageswap::events::{Event, EventKind};
use pageswap::page::Page;
use pageswap::render::StaticRenderer;
use pageswap::router::{Capabilities, Router};
use pageswap::transport::{HttpResponse, Transport, TransportError};
use pageswap::visit::VisitParams;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub const ORIGIN: &str = "https://app.test";

pub fn url(path: &str) -> String {
    format!("{}{}", ORIGIN, path)
}

/// A protocol response carrying `page`.
pub fn page_response(page: Value) -> HttpResponse {
    HttpResponse::new(200, page).with_header("X-Inertia", "true")
}

pub fn page_json(component: &str, path: &str, props: Value) -> Value {
    json!({
        "component": component,
        "props": props,
        "url": path,
        "version": "v1"
    })
}

/// Transport answering by URL with optional latency, recording every send.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, (Duration, HttpResponse)>>,
    sent: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self, url: &str, response: HttpResponse) {
        self.route_delayed(url, Duration::ZERO, response);
    }

    pub fn route_delayed(&self, url: &str, delay: Duration, response: HttpResponse) {
        self.routes.lock().insert(url.to_string(), (delay, response));
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, params: &VisitParams, _current: &Page) -> Result<HttpResponse, TransportError> {
        self.sent.lock().push(params.url().to_string());
        let route = self.routes.lock().get(params.url()).cloned();
        let (delay, response) = route.unwrap_or_else(|| {
            (
                Duration::ZERO,
                HttpResponse::new(404, Value::String("not found".to_string())),
            )
        });
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(response)
    }
}

pub struct Harness {
    pub browser: Arc<MemoryBrowser>,
    pub transport: Arc<ScriptedTransport>,
    pub renderer: Arc<StaticRenderer>,
    pub router: Router,
}

impl Harness {
    /// Router whose current page is `initial`, with the browser at its URL.
    pub fn new(initial: Page) -> Self {
        let browser = Arc::new(MemoryBrowser::new(initial.url.clone()));
        Self::with_browser(browser, initial)
    }

    pub fn with_browser(browser: Arc<MemoryBrowser>, initial: Page) -> Self {
        Self::with_parts(browser, Arc::new(StaticRenderer::new()), initial)
    }

    pub fn with_renderer(renderer: StaticRenderer, initial: Page) -> Self {
        let browser = Arc::new(MemoryBrowser::new(initial.url.clone()));
        Self::with_parts(browser, Arc::new(renderer), initial)
    }

    pub fn with_parts(browser: Arc<MemoryBrowser>, renderer: Arc<StaticRenderer>, initial: Page) -> Self {
        let transport = Arc::new(ScriptedTransport::new());
        let caps = Capabilities::in_memory(browser.clone(), renderer.clone(), transport.clone());
        let router = Router::new(&Config::default(), initial, caps);
        Self {
            browser,
            transport,
            renderer,
            router,
        }
    }

    /// Record every event of `kind`.
    pub fn capture(&self, kind: EventKind) -> Arc<Mutex<Vec<Event>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        self.router.events().on(kind, move |event| {
            sink.lock().push(event.clone());
            false
        });
        seen
    }
}
