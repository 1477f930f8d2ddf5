//! Capabilities the history adapter is built on.

use serde_json::Value;

use super::HistoryError;

/// Session-history entries of the host browser.
///
/// Only the entry at the current position is ever read or written.
pub trait HistoryStore: Send + Sync {
    /// Add a new entry after the current position.
    fn push_state(&self, url: &str, state: Value);
    /// Overwrite the entry at the current position.
    fn replace_state(&self, url: &str, state: Value);
    /// State attached to the current position, if any.
    fn state(&self) -> Option<Value>;
}

/// Seals history payloads for pages that ask for encrypted history.
pub trait HistoryCipher: Send + Sync {
    fn encrypt(&self, plain: &[u8]) -> Result<Vec<u8>, HistoryError>;
    fn decrypt(&self, sealed: &[u8]) -> Result<Vec<u8>, HistoryError>;
    /// Discard the current key so previously sealed entries become unreadable.
    fn rotate(&self) {}
}
