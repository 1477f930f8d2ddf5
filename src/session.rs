//! Session-scoped key/value storage and the location-visit resume marker.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from session storage.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session storage is unavailable: {0}")]
    Unavailable(String),

    #[error("Session value for '{key}' is malformed: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Key/value storage that survives full page navigations within a tab.
pub trait SessionStore: Send + Sync {
    fn exists(&self, key: &str) -> bool;
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove(&self, key: &str) -> Result<(), SessionError>;
}

/// Marker left behind before an external-redirect navigation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationVisit {
    #[serde(default)]
    pub preserve_scroll: bool,
}

impl LocationVisit {
    pub fn save(&self, session: &dyn SessionStore, key: &str) -> Result<(), SessionError> {
        let encoded = serde_json::to_string(self).map_err(|source| SessionError::Malformed {
            key: key.to_string(),
            source,
        })?;
        session.set(key, &encoded)
    }

    /// Read and remove the marker.
    ///
    /// Returns `None` when no marker exists. The marker is removed whenever it
    /// exists, even if its contents cannot be read; unreadable contents fall
    /// back to the default marker.
    pub fn take(session: &dyn SessionStore, key: &str) -> Option<LocationVisit> {
        if !session.exists(key) {
            return None;
        }

        let marker = match session.get(key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(key, error = %e, "Malformed location visit marker");
                LocationVisit::default()
            }),
            Ok(None) => LocationVisit::default(),
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read location visit marker");
                LocationVisit::default()
            }
        };

        if let Err(e) = session.remove(key) {
            tracing::warn!(key, error = %e, "Failed to remove location visit marker");
        }

        Some(marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::MemoryBrowser;

    const KEY: &str = "inertiaLocationVisit";

    #[test]
    fn save_uses_wire_field_names() {
        let browser = MemoryBrowser::new("https://app.test/");
        LocationVisit { preserve_scroll: true }.save(&browser, KEY).unwrap();
        assert_eq!(
            browser.get(KEY).unwrap().as_deref(),
            Some(r#"{"preserveScroll":true}"#)
        );
    }

    #[test]
    fn take_consumes_marker() {
        let browser = MemoryBrowser::new("https://app.test/");
        LocationVisit { preserve_scroll: true }.save(&browser, KEY).unwrap();

        assert_eq!(
            LocationVisit::take(&browser, KEY),
            Some(LocationVisit { preserve_scroll: true })
        );
        assert!(!browser.exists(KEY));
        assert_eq!(LocationVisit::take(&browser, KEY), None);
    }

    #[test]
    fn malformed_marker_is_still_consumed() {
        let browser = MemoryBrowser::new("https://app.test/");
        browser.set(KEY, "not json").unwrap();

        assert_eq!(LocationVisit::take(&browser, KEY), Some(LocationVisit::default()));
        assert!(!browser.exists(KEY));
    }
}
