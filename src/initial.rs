//! Startup reconciliation of the initial page with browser state.

use crate::events::Event;
use crate::history::REMEMBERED_STATE_KEY;
use crate::page::{Page, Props, SetOptions};
use crate::router::Context;
use crate::session::LocationVisit;

/// How the browser arrived at this document load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationType {
    #[default]
    Navigate,
    Reload,
    BackForward,
}

/// Which restoration path ran on startup. Exactly one runs per load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialScenario {
    BackForward,
    LocationResume,
    Default,
}

/// Restore state for the initial load.
///
/// Scenarios are tried in fixed order: back/forward with stored state,
/// resume after a location visit, then a plain load. A reload first drops
/// remembered state.
pub async fn resolve(ctx: &Context, navigation: NavigationType) -> InitialScenario {
    if navigation == NavigationType::Reload {
        if let Err(e) = ctx.history.delete_state(REMEMBERED_STATE_KEY) {
            tracing::warn!(error = %e, "Failed to clear remembered state on reload");
        }
    }

    let scenario = if navigation == NavigationType::BackForward && ctx.history.has_any_state() {
        handle_back_forward(ctx).await;
        InitialScenario::BackForward
    } else if let Some(marker) = LocationVisit::take(ctx.session.as_ref(), &ctx.protocol.location_visit_key) {
        handle_location(ctx, marker).await;
        InitialScenario::LocationResume
    } else {
        handle_default(ctx, navigation).await;
        InitialScenario::Default
    };

    tracing::info!(navigation = ?navigation, scenario = ?scenario, "Initial visit resolved");
    scenario
}

async fn handle_back_forward(ctx: &Context) {
    let scroll_regions = ctx.history.scroll_regions();
    let page = match ctx.history.decrypt() {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!(error = %e, "History item could not be restored");
            ctx.events.dispatch(&Event::MissingHistoryItem);
            handle_unrestorable(ctx).await;
            return;
        }
    };

    let options = SetOptions {
        replace: false,
        preserve_scroll: true,
        preserve_state: true,
    };
    if commit(ctx, page, options).await {
        ctx.scroll.restore(&scroll_regions);
        ctx.events.dispatch(&Event::Navigate { page: ctx.page.get() });
    }
}

async fn handle_location(ctx: &Context, marker: LocationVisit) {
    ctx.page.set_url_hash(&ctx.location.hash());

    let stored = if ctx.history.has_any_state() {
        match ctx.history.decrypt() {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(error = %e, "Location visit state could not be restored");
                ctx.events.dispatch(&Event::MissingHistoryItem);
                handle_unrestorable(ctx).await;
                return;
            }
        }
    } else {
        ctx.page.get()
    };

    let scroll_regions = stored.scroll_regions.clone().unwrap_or_default();
    let mut page = ctx.page.get();
    page.remembered_state = Some(stored.remembered_state.unwrap_or_default());
    page.scroll_regions = stored.scroll_regions;

    let options = SetOptions {
        replace: false,
        preserve_scroll: marker.preserve_scroll,
        preserve_state: true,
    };
    if commit(ctx, page, options).await {
        if marker.preserve_scroll {
            ctx.scroll.restore(&scroll_regions);
        }
        ctx.events.dispatch(&Event::Navigate { page: ctx.page.get() });
    }
}

async fn handle_default(ctx: &Context, navigation: NavigationType) {
    ctx.page.set_url_hash(&ctx.location.hash());
    let scroll_regions = ctx.history.scroll_regions();

    let options = SetOptions {
        replace: false,
        preserve_scroll: true,
        preserve_state: true,
    };
    if commit(ctx, ctx.page.get(), options).await {
        if navigation == NavigationType::Reload {
            ctx.scroll.restore(&scroll_regions);
        }
        ctx.events.dispatch(&Event::Navigate { page: ctx.page.get() });
    }
}

/// Commit the server-rendered page with nothing restored onto it.
async fn handle_unrestorable(ctx: &Context) {
    ctx.page.set_url_hash(&ctx.location.hash());
    let mut page = ctx.page.get();
    page.remembered_state = Some(Props::new());
    page.scroll_regions = None;

    let options = SetOptions {
        replace: false,
        preserve_scroll: true,
        preserve_state: true,
    };
    if commit(ctx, page, options).await {
        ctx.events.dispatch(&Event::Navigate { page: ctx.page.get() });
    }
}

async fn commit(ctx: &Context, page: Page, options: SetOptions) -> bool {
    match ctx.page.set(page, options).await {
        Ok(committed) => committed,
        Err(e) => {
            tracing::error!(error = %e, "Initial page could not be committed");
            false
        }
    }
}
