use std::fmt;
use std::sync::Arc;

use crate::page::Page;

/// Whether a visit keeps scroll position or component state.
///
/// Resolved against the incoming page right before it is committed.
#[derive(Clone, Default)]
pub enum Preserve {
    Yes,
    #[default]
    No,
    /// Preserve only when the incoming page carries validation errors.
    Errors,
    With(Arc<dyn Fn(&Page) -> bool + Send + Sync>),
}

impl Preserve {
    pub fn with<F: Fn(&Page) -> bool + Send + Sync + 'static>(predicate: F) -> Self {
        Self::With(Arc::new(predicate))
    }

    pub fn resolve(&self, page: &Page) -> bool {
        match self {
            Self::Yes => true,
            Self::No => false,
            Self::Errors => page.has_errors(),
            Self::With(predicate) => predicate(page),
        }
    }

    /// Whether the caller asked for preservation in any form.
    pub fn is_requested(&self) -> bool {
        !matches!(self, Self::No)
    }
}

impl From<bool> for Preserve {
    fn from(value: bool) -> Self {
        if value {
            Self::Yes
        } else {
            Self::No
        }
    }
}

impl fmt::Debug for Preserve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => write!(f, "Yes"),
            Self::No => write!(f, "No"),
            Self::Errors => write!(f, "Errors"),
            Self::With(_) => write!(f, "With(..)"),
        }
    }
}
