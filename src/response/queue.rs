//! Single-flight FIFO for response processing.

use std::collections::VecDeque;
use std::fmt::Display;

use async_trait::async_trait;
use parking_lot::Mutex;
use scopeguard::ScopeGuard;

/// Something that processes queued items one at a time.
#[async_trait]
pub trait QueueProcessor<T: Send + 'static>: Send + Sync {
    type Error: Display + Send;

    async fn process(&self, item: T) -> Result<(), Self::Error>;
}

struct QueueState<T> {
    items: VecDeque<T>,
    processing: bool,
}

/// Processes items strictly in arrival order, never two at once.
///
/// The first `add` on an idle queue drains it; `add` calls made while a
/// drain is running only append and return immediately. Failed items are
/// logged and draining continues. If the draining caller is cancelled, the
/// item in flight is lost and the queue goes idle; items behind it are
/// drained by the next `add`.
pub struct ResponseQueue<T> {
    state: Mutex<QueueState<T>>,
}

impl<T: Send + 'static> Default for ResponseQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> ResponseQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                processing: false,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_processing(&self) -> bool {
        self.state.lock().processing
    }

    pub async fn add<P>(&self, item: T, processor: &P)
    where
        P: QueueProcessor<T> + ?Sized,
    {
        {
            let mut state = self.state.lock();
            state.items.push_back(item);
            if state.processing {
                return;
            }
            state.processing = true;
        }
        self.drain(processor).await;
    }

    async fn drain<P>(&self, processor: &P)
    where
        P: QueueProcessor<T> + ?Sized,
    {
        // A caller dropping this future mid-item must not leave the queue
        // marked busy; whatever is still queued runs on the next add.
        let idle_on_cancel = scopeguard::guard(&self.state, |state| {
            let mut state = state.lock();
            state.processing = false;
            tracing::warn!(pending = state.items.len(), "Response queue drain cancelled");
        });

        let mut processed = 0usize;
        loop {
            // Pop and the idle transition share one lock so no add can slip between
            let next = {
                let mut state = self.state.lock();
                match state.items.pop_front() {
                    Some(item) => item,
                    None => {
                        state.processing = false;
                        break;
                    }
                }
            };

            if let Err(e) = processor.process(next).await {
                tracing::warn!(error = %e, "Queued response failed");
            }
            processed += 1;
        }
        ScopeGuard::into_inner(idle_on_cancel);
        tracing::trace!(processed, "Response queue drained");
    }
}
