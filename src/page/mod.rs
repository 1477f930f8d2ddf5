//! The page payload and the store holding the current one.

mod store;
pub mod url;

pub use store::{CommitError, PageStore, SetOptions};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Server-supplied props, and client-only remembered state.
pub type Props = Map<String, Value>;

/// Prop carrying validation errors.
pub const ERRORS_PROP: &str = "errors";

/// The unit of navigable state.
///
/// Field names are the wire names the server sends and history entries
/// store, so they serialize in camelCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Opaque identifier the renderer resolves to a view.
    pub component: String,
    #[serde(default)]
    pub props: Props,
    pub url: String,
    /// Asset version token; carried, never interpreted here.
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remembered_state: Option<Props>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_regions: Option<Vec<ScrollRegion>>,
    /// Props the server wants appended/merged instead of replaced.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merge_props: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub clear_history: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub encrypt_history: bool,
}

/// Captured scroll offsets of one scrollable region.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollRegion {
    pub top: f64,
    pub left: f64,
}

impl Page {
    pub fn new(component: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            props: Props::new(),
            url: url.into(),
            version: None,
            remembered_state: None,
            scroll_regions: None,
            merge_props: Vec::new(),
            clear_history: false,
            encrypt_history: false,
        }
    }

    /// Builder-style prop insertion.
    pub fn with_prop(mut self, name: impl Into<String>, value: Value) -> Self {
        self.props.insert(name.into(), value);
        self
    }

    /// Validation errors riding along in the `errors` prop.
    ///
    /// Anything other than an object counts as no errors.
    pub fn errors(&self) -> Props {
        match self.props.get(ERRORS_PROP) {
            Some(Value::Object(errors)) => errors.clone(),
            _ => Props::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        matches!(self.props.get(ERRORS_PROP), Some(Value::Object(e)) if !e.is_empty())
    }
}
