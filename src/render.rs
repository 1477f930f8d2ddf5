//! The view layer as seen by the page store.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

use crate::page::Page;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Component '{component}' could not be resolved")]
    UnknownComponent { component: String },

    #[error("Component '{component}' failed to load: {reason}")]
    LoadFailed { component: String, reason: String },
}

/// Resolves components and swaps the rendered view.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Make `component` renderable. Called before any state changes.
    async fn resolve(&self, component: &str) -> Result<(), RenderError>;

    /// Render `page`; resolves once the new view is on screen.
    async fn swap(&self, page: &Page, preserve_state: bool);
}

/// Renderer with a fixed component set and optional resolution delays.
#[derive(Default)]
pub struct StaticRenderer {
    /// Empty means every component resolves.
    components: Vec<String>,
    delays: HashMap<String, Duration>,
    swaps: Mutex<Vec<(Page, bool)>>,
}

impl StaticRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only resolve the listed components.
    pub fn with_components<I, S>(mut self, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.components = components.into_iter().map(Into::into).collect();
        self
    }

    /// Delay resolution of `component`, as a lazily loaded chunk would.
    pub fn with_delay(mut self, component: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(component.into(), delay);
        self
    }

    /// Every swap so far with its preserve-state flag.
    pub fn swaps(&self) -> Vec<(Page, bool)> {
        self.swaps.lock().clone()
    }
}

#[async_trait]
impl Renderer for StaticRenderer {
    async fn resolve(&self, component: &str) -> Result<(), RenderError> {
        if let Some(delay) = self.delays.get(component) {
            tokio::time::sleep(*delay).await;
        }
        if !self.components.is_empty() && !self.components.iter().any(|c| c == component) {
            return Err(RenderError::UnknownComponent {
                component: component.to_string(),
            });
        }
        Ok(())
    }

    async fn swap(&self, page: &Page, preserve_state: bool) {
        self.swaps.lock().push((page.clone(), preserve_state));
    }
}
