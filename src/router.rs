//! The explicitly constructed context every component works through.

use std::sync::Arc;

use async_trait::async_trait;

use crate::browser::{Location, MemoryBrowser, Modal, Scroll};
use crate::config::{Config, ProtocolConfig};
use crate::events::EventBus;
use crate::history::{HistoryAdapter, HistoryCipher, HistoryError, HistoryStore};
use crate::initial::{self, InitialScenario, NavigationType};
use crate::page::{Page, PageStore, Props};
use crate::render::Renderer;
use crate::response::{QueueProcessor, Response, ResponseQueue, VisitError};
use crate::session::SessionStore;
use crate::transport::{HttpResponse, Transport};
use crate::visit::VisitParams;

/// Host capabilities a router is built from.
pub struct Capabilities {
    pub history: Arc<dyn HistoryStore>,
    pub session: Arc<dyn SessionStore>,
    pub location: Arc<dyn Location>,
    pub scroll: Arc<dyn Scroll>,
    pub modal: Arc<dyn Modal>,
    pub renderer: Arc<dyn Renderer>,
    pub transport: Arc<dyn Transport>,
    pub cipher: Option<Arc<dyn HistoryCipher>>,
}

impl Capabilities {
    /// Every browser capability backed by one [`MemoryBrowser`].
    pub fn in_memory(
        browser: Arc<MemoryBrowser>,
        renderer: Arc<dyn Renderer>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            history: browser.clone(),
            session: browser.clone(),
            location: browser.clone(),
            scroll: browser.clone(),
            modal: browser,
            renderer,
            transport,
            cipher: None,
        }
    }

    pub fn with_cipher(mut self, cipher: Arc<dyn HistoryCipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }
}

/// Shared state response processing and startup restoration work on.
pub struct Context {
    pub protocol: ProtocolConfig,
    pub page: PageStore,
    pub history: Arc<HistoryAdapter>,
    pub events: EventBus,
    pub session: Arc<dyn SessionStore>,
    pub location: Arc<dyn Location>,
    pub scroll: Arc<dyn Scroll>,
    pub modal: Arc<dyn Modal>,
}

#[async_trait]
impl QueueProcessor<Response> for Context {
    type Error = VisitError;

    async fn process(&self, response: Response) -> Result<(), VisitError> {
        let outcome = response.process(self).await?;
        tracing::debug!(url = %response.params().url(), outcome = ?outcome, "Response processed");
        Ok(())
    }
}

/// Issues visits and serializes their responses.
pub struct Router {
    ctx: Context,
    queue: ResponseQueue<Response>,
    transport: Arc<dyn Transport>,
}

impl Router {
    pub fn new(config: &Config, initial: Page, caps: Capabilities) -> Self {
        let events = EventBus::new();
        let history = Arc::new(HistoryAdapter::new(
            caps.history,
            caps.cipher,
            config.history.encrypt,
        ));
        let page = PageStore::new(
            initial,
            caps.renderer,
            history.clone(),
            caps.location.clone(),
            caps.scroll.clone(),
            events.clone(),
        );

        Self {
            ctx: Context {
                protocol: config.protocol.clone(),
                page,
                history,
                events,
                session: caps.session,
                location: caps.location,
                scroll: caps.scroll,
                modal: caps.modal,
            },
            queue: ResponseQueue::new(),
            transport: caps.transport,
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn page(&self) -> Page {
        self.ctx.page.get()
    }

    pub fn store(&self) -> &PageStore {
        &self.ctx.page
    }

    pub fn events(&self) -> &EventBus {
        &self.ctx.events
    }

    /// Reconcile the initial page with how the browser arrived here.
    ///
    /// Must run once, before the first visit.
    pub async fn init(&self, navigation: NavigationType) -> InitialScenario {
        initial::resolve(&self.ctx, navigation).await
    }

    /// Send a visit and process its response.
    ///
    /// Returns once the response is queued; if another response is being
    /// processed, this one runs after it on that drain.
    pub async fn visit(&self, params: VisitParams) -> Result<(), VisitError> {
        let originating = self.ctx.page.get();
        tracing::debug!(params = ?params, "Visit dispatched");
        let http = self.transport.send(&params, &originating).await?;
        self.handle_response(params, originating, http).await;
        Ok(())
    }

    /// Queue a response received outside [`visit`](Self::visit).
    pub async fn handle_response(&self, params: VisitParams, originating: Page, http: HttpResponse) {
        self.enqueue(Response::new(params, http, originating)).await;
    }

    pub async fn enqueue(&self, response: Response) {
        self.queue.add(response, &self.ctx).await;
    }

    pub fn remember(&self, state: Props) -> Result<(), HistoryError> {
        self.ctx.page.remember(state)
    }

    pub fn restore(&self) -> Props {
        self.ctx.page.remembered_state()
    }
}
