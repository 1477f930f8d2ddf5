//! Lifecycle events and the bus that delivers them.
//!
//! Listeners are plain callables. Each one may intercept an event by
//! returning `true`; every listener still runs, and `dispatch` reports
//! whether any of them intercepted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::page::{Page, Props};

/// Kinds of events, used to subscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Prefetched,
    Error,
    Success,
    Navigate,
    Invalid,
    MissingHistoryItem,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prefetched => "prefetched",
            Self::Error => "error",
            Self::Success => "success",
            Self::Navigate => "navigate",
            Self::Invalid => "invalid",
            Self::MissingHistoryItem => "missingHistoryItem",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    /// A prefetch probe completed; page state is untouched.
    Prefetched { url: String, body: Value },
    /// A visit committed a page carrying validation errors.
    Error { errors: Props },
    Success { page: Page },
    /// A page is fully applied and rendered.
    Navigate { page: Page },
    /// A response without the protocol signature arrived.
    Invalid { status: u16, body: Value },
    /// A history entry could not be restored on startup.
    MissingHistoryItem,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Prefetched { .. } => EventKind::Prefetched,
            Self::Error { .. } => EventKind::Error,
            Self::Success { .. } => EventKind::Success,
            Self::Navigate { .. } => EventKind::Navigate,
            Self::Invalid { .. } => EventKind::Invalid,
            Self::MissingHistoryItem => EventKind::MissingHistoryItem,
        }
    }
}

/// Returns `true` to intercept the event.
pub type Listener = Arc<dyn Fn(&Event) -> bool + Send + Sync>;

/// Handle for removing a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registration {
    id: ListenerId,
    kind: EventKind,
    listener: Listener,
}

#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

#[derive(Default)]
struct EventBusInner {
    next_id: AtomicU64,
    listeners: RwLock<Vec<Registration>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `listener` to events of `kind`.
    pub fn on<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        let id = ListenerId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.listeners.write().push(Registration {
            id,
            kind,
            listener: Arc::new(listener),
        });
        id
    }

    pub fn off(&self, id: ListenerId) {
        self.inner.listeners.write().retain(|r| r.id != id);
    }

    /// Deliver `event` to every matching listener.
    ///
    /// Returns whether any listener intercepted it.
    pub fn dispatch(&self, event: &Event) -> bool {
        let kind = event.kind();
        // Snapshot so listeners may subscribe or unsubscribe while running
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .read()
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| Arc::clone(&r.listener))
            .collect();

        let mut intercepted = false;
        for listener in &listeners {
            intercepted |= listener(event);
        }

        tracing::debug!(
            event = kind.as_str(),
            listeners = listeners.len(),
            intercepted,
            "Event dispatched"
        );
        intercepted
    }
}
