//! Turning one network response into a page transition or side effect.

mod merge;
mod policy;
mod queue;

pub use merge::{carry_remembered_state, merge_props};
pub use policy::should_set_page;
pub use queue::{QueueProcessor, ResponseQueue};

use thiserror::Error;
use url::Url;

use crate::events::Event;
use crate::page::url::{href_to_url, is_same_url_without_hash, set_hash_if_same_url};
use crate::page::{CommitError, Page, Props, SetOptions};
use crate::router::Context;
use crate::session::LocationVisit;
use crate::transport::{HttpResponse, TransportError};
use crate::visit::{Preserve, VisitParams};

/// Errors from issuing or processing a visit.
#[derive(Debug, Error)]
pub enum VisitError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Commit failed: {0}")]
    Commit(#[from] CommitError),

    #[error("Malformed page payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Invalid URL '{url}': {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// What processing a response did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Prefetch probe; page state untouched.
    Prefetched,
    /// Page committed; `errors` when it carried validation errors.
    Applied { errors: bool },
    /// Superseded by a newer navigation or a newer commit.
    Discarded,
    /// Full browser navigation to an external location.
    LocationVisit { url: String },
    /// Location visit skipped because the resume marker could not be stored.
    Unhandled,
    /// Non-protocol response; `displayed` when the modal was shown.
    Invalid { displayed: bool },
}

/// A network response paired with the visit that produced it.
#[derive(Clone)]
pub struct Response {
    params: VisitParams,
    http: HttpResponse,
    /// Page current when the visit was dispatched.
    originating_page: Page,
}

impl Response {
    pub fn new(params: VisitParams, http: HttpResponse, originating_page: Page) -> Self {
        Self {
            params,
            http,
            originating_page,
        }
    }

    pub fn params(&self) -> &VisitParams {
        &self.params
    }

    pub fn http(&self) -> &HttpResponse {
        &self.http
    }

    pub fn originating_page(&self) -> &Page {
        &self.originating_page
    }

    /// Hand a prefetched response over to the live visit reusing it.
    pub fn merge_params(&mut self, live: &VisitParams) {
        self.params.merge(live);
    }

    fn is_protocol_response(&self, ctx: &Context) -> bool {
        self.http.has_header(&ctx.protocol.signature_header)
    }

    fn is_location_visit(&self, ctx: &Context) -> bool {
        self.http.status == 409 && self.http.has_header(&ctx.protocol.location_header)
    }

    pub async fn process(&self, ctx: &Context) -> Result<Outcome, VisitError> {
        if self.params.is_prefetch() {
            return Ok(self.handle_prefetch(ctx));
        }

        self.params.run_finish_callbacks();

        if !self.is_protocol_response(ctx) {
            return self.handle_non_protocol(ctx);
        }

        ctx.history.set_preserve_url(self.params.preserves_url());
        let result = self.apply(ctx).await;
        ctx.history.set_preserve_url(false);
        result
    }

    fn handle_prefetch(&self, ctx: &Context) -> Outcome {
        let callbacks = self.params.callbacks();
        if let Some(hook) = &callbacks.on_prefetched {
            hook(&self.http);
        }
        ctx.events.dispatch(&Event::Prefetched {
            url: self.params.url().to_string(),
            body: self.http.body.clone(),
        });
        if let Some(hook) = &callbacks.on_prefetch_response {
            hook(self);
        }
        tracing::debug!(url = %self.params.url(), "Prefetch response handled");
        Outcome::Prefetched
    }

    fn handle_non_protocol(&self, ctx: &Context) -> Result<Outcome, VisitError> {
        if self.is_location_visit(ctx) {
            let location = self.http.header(&ctx.protocol.location_header).unwrap_or_default();
            let base = self.location_url(ctx)?;
            let mut target = parse_href(location, &base)?;
            let request_url = parse_href(self.params.url(), &base)?;
            set_hash_if_same_url(&request_url, &mut target);
            return Ok(self.location_visit(ctx, &base, target));
        }

        let intercepted = ctx.events.dispatch(&Event::Invalid {
            status: self.http.status,
            body: self.http.body.clone(),
        });
        tracing::warn!(
            url = %self.params.url(),
            status = self.http.status,
            intercepted,
            "Response lacks protocol signature"
        );
        if intercepted {
            return Ok(Outcome::Invalid { displayed: false });
        }
        ctx.modal.show(&self.http.body_text());
        Ok(Outcome::Invalid { displayed: true })
    }

    fn location_visit(&self, ctx: &Context, current: &Url, target: Url) -> Outcome {
        let marker = LocationVisit {
            preserve_scroll: matches!(self.params.preserve_scroll_option(), Preserve::Yes),
        };
        if let Err(e) = marker.save(ctx.session.as_ref(), &ctx.protocol.location_visit_key) {
            tracing::warn!(error = %e, target = %target, "Location visit skipped");
            return Outcome::Unhandled;
        }

        if is_same_url_without_hash(current, &target) {
            tracing::info!(target = %target, "Location visit reloads current document");
            ctx.location.reload();
        } else {
            tracing::info!(target = %target, "Location visit");
            ctx.location.assign(target.as_str());
        }
        Outcome::LocationVisit {
            url: target.to_string(),
        }
    }

    async fn apply(&self, ctx: &Context) -> Result<Outcome, VisitError> {
        let mut incoming: Page = serde_json::from_value(self.http.body.clone())?;
        let current = ctx.page.get();
        let base = self.location_url(ctx)?;

        if !should_set_page(
            self.params.is_async(),
            &self.originating_page,
            &incoming,
            &current,
            &base,
        ) {
            tracing::debug!(
                url = %self.params.url(),
                component = %incoming.component,
                "Stale response discarded"
            );
            return Ok(Outcome::Discarded);
        }

        if self.params.is_partial() && incoming.component == current.component {
            merge_props(&mut incoming, &current);
        }

        let remembered = ctx
            .history
            .has_any_state()
            .then(|| ctx.history.remembered_state());
        carry_remembered_state(
            self.params.preserve_state_option().is_requested(),
            remembered,
            &mut incoming,
            &current,
        );

        let options = SetOptions {
            replace: self.params.is_replace(),
            preserve_scroll: self.params.preserve_scroll_option().resolve(&incoming),
            preserve_state: self.params.preserve_state_option().resolve(&incoming),
        };

        incoming.url = if ctx.history.preserve_url() {
            current.url.clone()
        } else {
            self.page_url(&incoming, &base)?
        };

        if !ctx.page.set(incoming, options).await? {
            return Ok(Outcome::Discarded);
        }

        let page = ctx.page.get();
        let errors = page.errors();
        if !errors.is_empty() {
            let scoped = self.scoped_errors(errors);
            ctx.events.dispatch(&Event::Error {
                errors: scoped.clone(),
            });
            if let Some(hook) = &self.params.callbacks().on_error {
                hook(&scoped);
            }
            return Ok(Outcome::Applied { errors: true });
        }

        ctx.events.dispatch(&Event::Success { page: page.clone() });
        if let Some(hook) = &self.params.callbacks().on_success {
            hook(&page);
        }
        Ok(Outcome::Applied { errors: false })
    }

    /// Response URL, keeping the request's hash when only the hash differs.
    fn page_url(&self, incoming: &Page, base: &Url) -> Result<String, VisitError> {
        let mut response_url = parse_href(&incoming.url, base)?;
        let request_url = parse_href(self.params.url(), base)?;
        set_hash_if_same_url(&request_url, &mut response_url);
        Ok(response_url.to_string())
    }

    fn scoped_errors(&self, errors: Props) -> Props {
        let Some(bag) = self.params.error_bag_name() else {
            return errors;
        };
        match errors.get(bag) {
            Some(serde_json::Value::Object(scoped)) => scoped.clone(),
            _ => Props::new(),
        }
    }

    fn location_url(&self, ctx: &Context) -> Result<Url, VisitError> {
        let href = ctx.location.href();
        Url::parse(&href).map_err(|source| VisitError::Url { url: href, source })
    }
}

fn parse_href(href: &str, base: &Url) -> Result<Url, VisitError> {
    href_to_url(href, base).map_err(|source| VisitError::Url {
        url: href.to_string(),
        source,
    })
}
