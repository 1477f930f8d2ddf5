//! Host-browser capabilities the visit engine consumes.

mod memory;

pub use memory::{MemoryBrowser, Navigation};

use url::Url;

use crate::page::url::hash_of;
use crate::page::ScrollRegion;

/// The document location.
pub trait Location: Send + Sync {
    /// Current absolute URL.
    fn href(&self) -> String;

    /// Fragment of the current URL including `#`, or empty.
    fn hash(&self) -> String {
        Url::parse(&self.href()).map(|url| hash_of(&url)).unwrap_or_default()
    }

    /// Full navigation to `url`, leaving the application.
    fn assign(&self, url: &str);

    /// Full reload of the current document.
    fn reload(&self);
}

/// Scroll measurement and restoration.
pub trait Scroll: Send + Sync {
    /// Scroll the document and every tracked region back to the top.
    fn reset(&self);
    fn restore(&self, regions: &[ScrollRegion]);
}

/// Overlay used to display non-protocol responses.
pub trait Modal: Send + Sync {
    fn show(&self, content: &str);
}
