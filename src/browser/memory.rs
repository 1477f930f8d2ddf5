//! In-memory browser: history stack, session storage, location, scroll, modal.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde_json::Value;

use super::{Location, Modal, Scroll};
use crate::history::HistoryStore;
use crate::page::ScrollRegion;
use crate::session::{SessionError, SessionStore};

/// A full-document navigation requested through [`Location`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Assign(String),
    Reload,
}

#[derive(Debug, Clone)]
struct Entry {
    url: String,
    state: Option<Value>,
}

struct BrowserState {
    entries: Vec<Entry>,
    index: usize,
    session: HashMap<String, String>,
    session_available: bool,
    navigations: Vec<Navigation>,
    modal: Vec<String>,
    scroll_resets: usize,
    scroll_restores: Vec<Vec<ScrollRegion>>,
}

/// Single-tab browser kept entirely in memory.
///
/// Implements every host capability so one instance can back a router and
/// later a second router (a simulated reload or back/forward load) sharing
/// the same history and session storage.
pub struct MemoryBrowser {
    state: Mutex<BrowserState>,
}

impl MemoryBrowser {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(BrowserState {
                entries: vec![Entry {
                    url: href.into(),
                    state: None,
                }],
                index: 0,
                session: HashMap::new(),
                session_available: true,
                navigations: Vec::new(),
                modal: Vec::new(),
                scroll_resets: 0,
                scroll_restores: Vec::new(),
            }),
        }
    }

    /// Move one entry back. Returns false at the start of history.
    pub fn back(&self) -> bool {
        let mut state = self.state.lock();
        if state.index == 0 {
            return false;
        }
        state.index -= 1;
        true
    }

    /// Move one entry forward. Returns false at the end of history.
    pub fn forward(&self) -> bool {
        let mut state = self.state.lock();
        if state.index + 1 >= state.entries.len() {
            return false;
        }
        state.index += 1;
        true
    }

    /// Make session storage fail every call, as private browsing modes do.
    pub fn set_session_available(&self, available: bool) {
        self.state.lock().session_available = available;
    }

    /// Overwrite the raw state of the current entry.
    pub fn set_current_state(&self, value: Option<Value>) {
        let mut state = self.state.lock();
        let index = state.index;
        state.entries[index].state = value;
    }

    pub fn current_state(&self) -> Option<Value> {
        let state = self.state.lock();
        state.entries[state.index].state.clone()
    }

    pub fn history_len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn navigations(&self) -> Vec<Navigation> {
        self.state.lock().navigations.clone()
    }

    pub fn modal_contents(&self) -> Vec<String> {
        self.state.lock().modal.clone()
    }

    pub fn scroll_resets(&self) -> usize {
        self.state.lock().scroll_resets
    }

    pub fn scroll_restores(&self) -> Vec<Vec<ScrollRegion>> {
        self.state.lock().scroll_restores.clone()
    }

    fn check_session(state: &BrowserState) -> Result<(), SessionError> {
        if state.session_available {
            Ok(())
        } else {
            Err(SessionError::Unavailable("storage disabled".to_string()))
        }
    }
}

impl Location for MemoryBrowser {
    fn href(&self) -> String {
        let state = self.state.lock();
        state.entries[state.index].url.clone()
    }

    fn assign(&self, url: &str) {
        let mut state = self.state.lock();
        state.navigations.push(Navigation::Assign(url.to_string()));
        let keep = state.index + 1;
        state.entries.truncate(keep);
        state.entries.push(Entry {
            url: url.to_string(),
            state: None,
        });
        state.index += 1;
    }

    fn reload(&self) {
        self.state.lock().navigations.push(Navigation::Reload);
    }
}

impl HistoryStore for MemoryBrowser {
    fn push_state(&self, url: &str, value: Value) {
        let mut state = self.state.lock();
        let keep = state.index + 1;
        state.entries.truncate(keep);
        state.entries.push(Entry {
            url: url.to_string(),
            state: Some(value),
        });
        state.index += 1;
    }

    fn replace_state(&self, url: &str, value: Value) {
        let mut state = self.state.lock();
        let index = state.index;
        state.entries[index] = Entry {
            url: url.to_string(),
            state: Some(value),
        };
    }

    fn state(&self) -> Option<Value> {
        self.current_state()
    }
}

impl SessionStore for MemoryBrowser {
    fn exists(&self, key: &str) -> bool {
        let state = self.state.lock();
        state.session_available && state.session.contains_key(key)
    }

    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let state = self.state.lock();
        Self::check_session(&state)?;
        Ok(state.session.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        Self::check_session(&state)?;
        state.session.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        Self::check_session(&state)?;
        state.session.remove(key);
        Ok(())
    }
}

impl Scroll for MemoryBrowser {
    fn reset(&self) {
        self.state.lock().scroll_resets += 1;
    }

    fn restore(&self, regions: &[ScrollRegion]) {
        self.state.lock().scroll_restores.push(regions.to_vec());
    }
}

impl Modal for MemoryBrowser {
    fn show(&self, content: &str) {
        self.state.lock().modal.push(content.to_string());
    }
}
