//! URL comparisons used when reconciling pages with the browser location.

use url::{ParseError, Url};

/// Resolve `href` (absolute or relative) against `base`.
pub fn href_to_url(href: &str, base: &Url) -> Result<Url, ParseError> {
    Url::options().base_url(Some(base)).parse(href)
}

pub fn url_without_hash(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);
    url
}

pub fn is_same_url_without_hash(a: &Url, b: &Url) -> bool {
    url_without_hash(a) == url_without_hash(b)
}

/// Same origin and same path; query and fragment are ignored.
pub fn same_origin_and_path(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin() && a.path() == b.path()
}

/// Carry the fragment of `original` over to `target` when they only differ by hash.
pub fn set_hash_if_same_url(original: &Url, target: &mut Url) {
    if is_same_url_without_hash(original, target) {
        target.set_fragment(original.fragment());
    }
}

/// Fragment of `url` including the leading `#`, or an empty string.
pub fn hash_of(url: &Url) -> String {
    match url.fragment() {
        Some(fragment) if !fragment.is_empty() => format!("#{}", fragment),
        _ => String::new(),
    }
}
