//! Client-side visit orchestration for server-driven page protocols.
//!
//! The server answers each navigation with a page payload (component, props,
//! url, version). This crate issues visits, serializes responses through a
//! single-flight queue, reconciles them against the current page and browser
//! history, and restores state on startup.
//!
//! # Architecture
//!
//! ```text
//! Router::visit ──→ Transport ──→ Response ──→ ResponseQueue
//!                                                   │
//!                                                   ▼
//!                       EventBus ◀── Response::process ──→ PageStore ──→ HistoryAdapter
//! ```

pub mod browser;
pub mod config;
pub mod events;
pub mod history;
pub mod initial;
pub mod logging;
pub mod page;
pub mod render;
pub mod response;
pub mod router;
pub mod session;
pub mod transport;
pub mod visit;

pub use page::{Page, PageStore};
pub use response::{Response, ResponseQueue};
pub use router::Router;
pub use visit::VisitParams;
