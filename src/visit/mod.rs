//! Visit request parameters.
//!
//! Parameters are built once and then only read; the single mutation path
//! is [`VisitParams::merge`], used when a live visit takes over a
//! prefetched response.

mod preserve;

pub use preserve::Preserve;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::page::{Page, Props};
use crate::response::Response;
use crate::transport::HttpResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

pub type SuccessHook = Arc<dyn Fn(&Page) + Send + Sync>;
pub type ErrorHook = Arc<dyn Fn(&Props) + Send + Sync>;
pub type PrefetchedHook = Arc<dyn Fn(&HttpResponse) + Send + Sync>;
pub type PrefetchResponseHook = Arc<dyn Fn(&Response) + Send + Sync>;
pub type FinishHook = Arc<dyn Fn(&VisitParams) + Send + Sync>;

/// Caller hooks attached to one visit.
#[derive(Clone, Default)]
pub struct VisitCallbacks {
    pub on_success: Option<SuccessHook>,
    pub on_error: Option<ErrorHook>,
    pub on_prefetched: Option<PrefetchedHook>,
    pub on_prefetch_response: Option<PrefetchResponseHook>,
    pub on_finish: Vec<FinishHook>,
}

/// Descriptor of a single navigation.
#[derive(Clone)]
pub struct VisitParams {
    url: String,
    method: Method,
    data: Props,
    headers: Vec<(String, String)>,
    preserve_scroll: Preserve,
    preserve_state: Preserve,
    preserve_url: bool,
    replace: bool,
    is_async: bool,
    prefetch: bool,
    error_bag: Option<String>,
    only: Vec<String>,
    except: Vec<String>,
    callbacks: VisitCallbacks,
}

impl fmt::Debug for VisitParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisitParams")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("preserve_scroll", &self.preserve_scroll)
            .field("preserve_state", &self.preserve_state)
            .field("preserve_url", &self.preserve_url)
            .field("replace", &self.replace)
            .field("async", &self.is_async)
            .field("prefetch", &self.prefetch)
            .field("error_bag", &self.error_bag)
            .field("only", &self.only)
            .field("except", &self.except)
            .finish_non_exhaustive()
    }
}

impl VisitParams {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            data: Props::new(),
            headers: Vec::new(),
            preserve_scroll: Preserve::No,
            preserve_state: Preserve::No,
            preserve_url: false,
            replace: false,
            is_async: false,
            prefetch: false,
            error_bag: None,
            only: Vec::new(),
            except: Vec::new(),
            callbacks: VisitCallbacks::default(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    /// A reload of the current page restricted to `only`, kept async.
    pub fn partial_reload(url: impl Into<String>, only: &[&str]) -> Self {
        Self::get(url)
            .only(only)
            .preserve_scroll(Preserve::Yes)
            .preserve_state(Preserve::Yes)
            .asynchronous()
    }

    pub fn data(mut self, name: impl Into<String>, value: Value) -> Self {
        self.data.insert(name.into(), value);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn preserve_scroll(mut self, preserve: Preserve) -> Self {
        self.preserve_scroll = preserve;
        self
    }

    pub fn preserve_state(mut self, preserve: Preserve) -> Self {
        self.preserve_state = preserve;
        self
    }

    pub fn preserve_url(mut self, preserve: bool) -> Self {
        self.preserve_url = preserve;
        self
    }

    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    pub fn asynchronous(mut self) -> Self {
        self.is_async = true;
        self
    }

    pub fn prefetch(mut self) -> Self {
        self.prefetch = true;
        self
    }

    pub fn error_bag(mut self, bag: impl Into<String>) -> Self {
        self.error_bag = Some(bag.into());
        self
    }

    pub fn only(mut self, props: &[&str]) -> Self {
        self.only = props.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn except(mut self, props: &[&str]) -> Self {
        self.except = props.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn on_success<F: Fn(&Page) + Send + Sync + 'static>(mut self, hook: F) -> Self {
        self.callbacks.on_success = Some(Arc::new(hook));
        self
    }

    pub fn on_error<F: Fn(&Props) + Send + Sync + 'static>(mut self, hook: F) -> Self {
        self.callbacks.on_error = Some(Arc::new(hook));
        self
    }

    pub fn on_prefetched<F: Fn(&HttpResponse) + Send + Sync + 'static>(mut self, hook: F) -> Self {
        self.callbacks.on_prefetched = Some(Arc::new(hook));
        self
    }

    pub fn on_prefetch_response<F: Fn(&Response) + Send + Sync + 'static>(mut self, hook: F) -> Self {
        self.callbacks.on_prefetch_response = Some(Arc::new(hook));
        self
    }

    pub fn on_finish<F: Fn(&VisitParams) + Send + Sync + 'static>(mut self, hook: F) -> Self {
        self.callbacks.on_finish.push(Arc::new(hook));
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn payload(&self) -> &Props {
        &self.data
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn preserve_scroll_option(&self) -> &Preserve {
        &self.preserve_scroll
    }

    pub fn preserve_state_option(&self) -> &Preserve {
        &self.preserve_state
    }

    pub fn preserves_url(&self) -> bool {
        self.preserve_url
    }

    pub fn is_replace(&self) -> bool {
        self.replace
    }

    pub fn is_async(&self) -> bool {
        self.is_async
    }

    pub fn is_prefetch(&self) -> bool {
        self.prefetch
    }

    pub fn error_bag_name(&self) -> Option<&str> {
        self.error_bag.as_deref()
    }

    pub fn only_props(&self) -> &[String] {
        &self.only
    }

    pub fn except_props(&self) -> &[String] {
        &self.except
    }

    /// A partial reload asks for a subset of props.
    pub fn is_partial(&self) -> bool {
        !self.only.is_empty() || !self.except.is_empty()
    }

    pub fn callbacks(&self) -> &VisitCallbacks {
        &self.callbacks
    }

    /// Run the completion hooks registered with [`on_finish`](Self::on_finish).
    pub fn run_finish_callbacks(&self) {
        for hook in &self.callbacks.on_finish {
            hook(self);
        }
    }

    /// Adopt the options and hooks of `live` for a response first fetched
    /// by a prefetch, so it is applied like a normal visit.
    pub fn merge(&mut self, live: &VisitParams) {
        self.preserve_scroll = live.preserve_scroll.clone();
        self.preserve_state = live.preserve_state.clone();
        self.preserve_url = live.preserve_url;
        self.replace = live.replace;
        self.is_async = live.is_async;
        self.error_bag = live.error_bag.clone();
        self.callbacks = live.callbacks.clone();
        self.callbacks.on_prefetched = None;
        self.callbacks.on_prefetch_response = None;
        self.prefetch = false;
    }
}
