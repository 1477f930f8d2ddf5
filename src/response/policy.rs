//! Staleness policy for responses that arrive after the user moved on.

use url::Url;

use crate::page::url::{href_to_url, same_origin_and_path};
use crate::page::Page;

/// Decide whether a response page should replace the current page.
///
/// Precedence, highest first:
/// 1. synchronous visits always apply;
/// 2. a component change between originating and incoming page is a
///    server redirect and applies;
/// 3. if the current component moved away from the originating one, the
///    user navigated elsewhere meanwhile and the response is dropped;
/// 4. otherwise it applies only if origin and path are unchanged.
pub fn should_set_page(
    is_async: bool,
    originating: &Page,
    incoming: &Page,
    current: &Page,
    base: &Url,
) -> bool {
    if !is_async {
        return true;
    }

    if originating.component != incoming.component {
        return true;
    }

    if originating.component != current.component {
        return false;
    }

    match (
        href_to_url(&originating.url, base),
        href_to_url(&current.url, base),
    ) {
        (Ok(originating_url), Ok(current_url)) => same_origin_and_path(&originating_url, &current_url),
        _ => originating.url == current.url,
    }
}
