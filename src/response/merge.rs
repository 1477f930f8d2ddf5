//! Prop reconciliation for partial reloads and remembered state carry-over.

use serde_json::Value;

use crate::page::{Page, Props};

/// Merge `incoming` props over `current` props.
///
/// Props named in `incoming.merge_props` are appended (arrays) or
/// shallow-merged (objects) onto the current value; any other shape
/// replaces it. Afterwards the incoming props are layered over the full
/// current prop set so props the partial reload did not fetch survive.
pub fn merge_props(incoming: &mut Page, current: &Page) {
    for name in &incoming.merge_props {
        let Some(incoming_value) = incoming.props.get_mut(name) else {
            continue;
        };
        let Some(current_value) = current.props.get(name) else {
            continue;
        };

        match (current_value, incoming_value) {
            (Value::Array(prior), Value::Array(new)) => {
                let mut merged = prior.clone();
                merged.append(new);
                *new = merged;
            }
            (Value::Object(prior), Value::Object(new)) => {
                let mut merged = prior.clone();
                merged.extend(std::mem::take(new));
                *new = merged;
            }
            _ => {}
        }
    }

    let mut layered = current.props.clone();
    layered.extend(std::mem::take(&mut incoming.props));
    incoming.props = layered;
}

/// Copy remembered state onto `incoming` when the visit preserves state
/// and stays on the same component.
pub fn carry_remembered_state(
    preserve_state: bool,
    remembered: Option<Props>,
    incoming: &mut Page,
    current: &Page,
) {
    if !preserve_state || incoming.component != current.component {
        return;
    }
    if let Some(state) = remembered {
        incoming.remembered_state = Some(state);
    }
}
