//! Browser history persistence of page snapshots.
//!
//! Each entry's state is a JSON object `{"page": ..., "encrypted": bool}`.
//! Plain entries hold the page object; encrypted entries hold the sealed
//! page bytes base64-encoded.

mod store;

pub use store::{HistoryCipher, HistoryStore};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use parking_lot::RwLock;
use serde_json::{json, Value};
use thiserror::Error;

use crate::page::{Page, Props, ScrollRegion};

/// Key of remembered state inside a stored page.
pub const REMEMBERED_STATE_KEY: &str = "rememberedState";
/// Key of scroll regions inside a stored page.
pub const SCROLL_REGIONS_KEY: &str = "scrollRegions";

/// Errors reading or writing history entries.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("No history state at the current position")]
    Missing,

    #[error("History entry is encrypted but no cipher is configured")]
    NoCipher,

    #[error("History cipher failed: {0}")]
    Cipher(String),

    #[error("History entry could not be decoded: {0}")]
    Decode(String),

    #[error("History entry JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// An encoded entry ready to be written at the current position.
#[derive(Debug, Clone)]
pub struct HistorySnapshot {
    url: String,
    state: Value,
    page: Page,
}

/// Reads and writes page snapshots through a [`HistoryStore`].
pub struct HistoryAdapter {
    store: Arc<dyn HistoryStore>,
    cipher: Option<Arc<dyn HistoryCipher>>,
    encrypt_by_default: bool,
    /// Last page written or decoded, unencrypted.
    current: RwLock<Option<Page>>,
    preserve_url: AtomicBool,
}

impl HistoryAdapter {
    pub fn new(
        store: Arc<dyn HistoryStore>,
        cipher: Option<Arc<dyn HistoryCipher>>,
        encrypt_by_default: bool,
    ) -> Self {
        Self {
            store,
            cipher,
            encrypt_by_default,
            current: RwLock::new(None),
            preserve_url: AtomicBool::new(false),
        }
    }

    /// Whether page commits currently keep the active URL.
    pub fn preserve_url(&self) -> bool {
        self.preserve_url.load(Ordering::SeqCst)
    }

    pub fn set_preserve_url(&self, preserve: bool) {
        self.preserve_url.store(preserve, Ordering::SeqCst);
    }

    /// Encode `page` without touching the store.
    ///
    /// Every fallible step of a history write happens here, so callers can
    /// encode first and [`commit`](Self::commit) after other state changed.
    pub fn encode(&self, page: &Page) -> Result<HistorySnapshot, HistoryError> {
        let encrypt = page.encrypt_history || self.encrypt_by_default;
        let state = if encrypt {
            let cipher = self.cipher.as_ref().ok_or(HistoryError::NoCipher)?;
            let plain = serde_json::to_vec(page)?;
            let sealed = cipher.encrypt(&plain)?;
            json!({ "page": BASE64.encode(sealed), "encrypted": true })
        } else {
            json!({ "page": serde_json::to_value(page)?, "encrypted": false })
        };

        Ok(HistorySnapshot {
            url: page.url.clone(),
            state,
            page: page.clone(),
        })
    }

    /// Write an encoded snapshot, pushing a new entry or replacing the current one.
    pub fn commit(&self, snapshot: HistorySnapshot, replace: bool) {
        if replace {
            self.store.replace_state(&snapshot.url, snapshot.state);
        } else {
            self.store.push_state(&snapshot.url, snapshot.state);
        }
        tracing::debug!(url = %snapshot.url, replace, "History entry written");
        *self.current.write() = Some(snapshot.page);
    }

    pub fn push_state(&self, page: &Page) -> Result<(), HistoryError> {
        let snapshot = self.encode(page)?;
        self.commit(snapshot, false);
        Ok(())
    }

    pub fn replace_state(&self, page: &Page) -> Result<(), HistoryError> {
        let snapshot = self.encode(page)?;
        self.commit(snapshot, true);
        Ok(())
    }

    /// Whether the current position carries any state at all.
    pub fn has_any_state(&self) -> bool {
        self.store.state().is_some()
    }

    /// Decode the page stored at the current position.
    pub fn decrypt(&self) -> Result<Page, HistoryError> {
        let state = self.store.state().ok_or(HistoryError::Missing)?;
        let page = self.decode(&state)?;
        *self.current.write() = Some(page.clone());
        Ok(page)
    }

    fn decode(&self, state: &Value) -> Result<Page, HistoryError> {
        let stored = state
            .get("page")
            .ok_or_else(|| HistoryError::Decode("entry has no page".to_string()))?;
        let encrypted = state.get("encrypted").and_then(Value::as_bool).unwrap_or(false);

        if !encrypted {
            return Ok(serde_json::from_value(stored.clone())?);
        }

        let cipher = self.cipher.as_ref().ok_or(HistoryError::NoCipher)?;
        let sealed = stored
            .as_str()
            .ok_or_else(|| HistoryError::Decode("encrypted page is not a string".to_string()))?;
        let sealed = BASE64
            .decode(sealed)
            .map_err(|e| HistoryError::Decode(e.to_string()))?;
        let plain = cipher.decrypt(&sealed)?;
        Ok(serde_json::from_slice(&plain)?)
    }

    /// Last known page at the current position, decoding the store if needed.
    fn current_page(&self) -> Option<Page> {
        if let Some(page) = self.current.read().clone() {
            return Some(page);
        }
        self.store.state().and_then(|state| self.decode(&state).ok())
    }

    /// Read one field of the stored page by its wire name.
    pub fn get_state(&self, key: &str, default: Value) -> Value {
        let Some(page) = self.current_page() else {
            return default;
        };
        match serde_json::to_value(&page) {
            Ok(Value::Object(mut fields)) => match fields.remove(key) {
                Some(Value::Null) | None => default,
                Some(value) => value,
            },
            _ => default,
        }
    }

    /// Remove one field of the stored page and rewrite the entry in place.
    pub fn delete_state(&self, key: &str) -> Result<(), HistoryError> {
        let Some(page) = self.current_page() else {
            return Ok(());
        };
        let mut fields = match serde_json::to_value(&page)? {
            Value::Object(fields) => fields,
            _ => return Ok(()),
        };
        if fields.remove(key).is_none() {
            return Ok(());
        }
        let page: Page = serde_json::from_value(Value::Object(fields))?;
        tracing::debug!(key, "Deleted history state");
        self.replace_state(&page)
    }

    /// Remembered state of the stored page, empty when none.
    pub fn remembered_state(&self) -> Props {
        match self.get_state(REMEMBERED_STATE_KEY, Value::Null) {
            Value::Object(state) => state,
            _ => Props::new(),
        }
    }

    pub fn scroll_regions(&self) -> Vec<ScrollRegion> {
        serde_json::from_value(self.get_state(SCROLL_REGIONS_KEY, json!([]))).unwrap_or_default()
    }

    /// Drop everything sealed so far.
    pub fn clear(&self) {
        if let Some(cipher) = &self.cipher {
            cipher.rotate();
        }
        *self.current.write() = None;
        tracing::info!("History cleared");
    }
}
