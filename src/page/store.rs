//! Single source of truth for the current page.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use url::Url;

use super::url::{href_to_url, is_same_url_without_hash};
use super::{Page, Props, ScrollRegion};
use crate::browser::{Location, Scroll};
use crate::events::{Event, EventBus};
use crate::history::{HistoryAdapter, HistoryError};
use crate::render::{RenderError, Renderer};

/// Errors that abort a commit before any state changes.
#[derive(Debug, Error)]
pub enum CommitError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Options for [`PageStore::set`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    pub replace: bool,
    pub preserve_scroll: bool,
    pub preserve_state: bool,
}

/// Holds the current page.
///
/// Cheap to clone; clones share the same page.
#[derive(Clone)]
pub struct PageStore {
    inner: Arc<PageStoreInner>,
}

struct PageStoreInner {
    page: RwLock<Page>,
    /// Bumped by every `set`; a set that sees a newer value was superseded.
    generation: AtomicU64,
    renderer: Arc<dyn Renderer>,
    history: Arc<HistoryAdapter>,
    location: Arc<dyn Location>,
    scroll: Arc<dyn Scroll>,
    events: EventBus,
}

impl PageStore {
    pub fn new(
        initial: Page,
        renderer: Arc<dyn Renderer>,
        history: Arc<HistoryAdapter>,
        location: Arc<dyn Location>,
        scroll: Arc<dyn Scroll>,
        events: EventBus,
    ) -> Self {
        Self {
            inner: Arc::new(PageStoreInner {
                page: RwLock::new(initial),
                generation: AtomicU64::new(0),
                renderer,
                history,
                location,
                scroll,
                events,
            }),
        }
    }

    /// Snapshot of the current page.
    pub fn get(&self) -> Page {
        self.inner.page.read().clone()
    }

    /// Commit `page` as the current page.
    ///
    /// Resolves the component and encodes the history entry before anything
    /// is written, so a failure leaves the store untouched. Returns
    /// `Ok(false)` when a later `set` started while this one was resolving.
    pub async fn set(&self, mut page: Page, options: SetOptions) -> Result<bool, CommitError> {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if page.clear_history {
            self.inner.history.clear();
        }

        self.inner.renderer.resolve(&page.component).await?;

        if self.inner.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(component = %page.component, "Page commit superseded");
            return Ok(false);
        }

        if page.remembered_state.is_none() {
            page.remembered_state = Some(Props::new());
        }

        let replace = options.replace || self.is_current_location(&page.url);
        let snapshot = self.inner.history.encode(&page)?;

        *self.inner.page.write() = page.clone();
        tracing::info!(
            component = %page.component,
            url = %page.url,
            replace,
            preserve_state = options.preserve_state,
            "Page committed"
        );

        self.inner.renderer.swap(&page, options.preserve_state).await;
        self.inner.history.commit(snapshot, replace);

        if !options.preserve_scroll {
            self.inner.scroll.reset();
        }

        if !replace {
            self.inner.events.dispatch(&Event::Navigate { page });
        }

        Ok(true)
    }

    fn is_current_location(&self, url: &str) -> bool {
        let Ok(location) = Url::parse(&self.inner.location.href()) else {
            return false;
        };
        href_to_url(url, &location)
            .map(|target| is_same_url_without_hash(&target, &location))
            .unwrap_or(false)
    }

    /// Append `hash` to the current page's URL unless it already carries it.
    pub fn set_url_hash(&self, hash: &str) {
        if hash.is_empty() {
            return;
        }
        let mut page = self.inner.page.write();
        if page.url.contains(hash) {
            return;
        }
        page.url = match Url::parse(&page.url) {
            Ok(mut url) => {
                url.set_fragment(Some(hash.trim_start_matches('#')));
                url.to_string()
            }
            Err(_) => format!("{}{}", page.url, hash),
        };
    }

    /// Store client-only state on the current page and its history entry.
    pub fn remember(&self, state: Props) -> Result<(), HistoryError> {
        let page = {
            let mut page = self.inner.page.write();
            page.remembered_state = Some(state);
            page.clone()
        };
        self.inner.history.replace_state(&page)
    }

    pub fn remembered_state(&self) -> Props {
        self.inner.page.read().remembered_state.clone().unwrap_or_default()
    }

    /// Record scroll offsets on the current page and its history entry.
    pub fn save_scroll_regions(&self, regions: Vec<ScrollRegion>) -> Result<(), HistoryError> {
        let page = {
            let mut page = self.inner.page.write();
            page.scroll_regions = Some(regions);
            page.clone()
        };
        self.inner.history.replace_state(&page)
    }

    pub fn scroll_regions(&self) -> Vec<ScrollRegion> {
        self.inner.page.read().scroll_regions.clone().unwrap_or_default()
    }
}
