//! Presentation lookups for states and type codes.
//!
//! Every function is total: unrecognized input maps to a fixed fallback.

use crate::model::{LineState, TypeCode};

/// Class of the progress bar fill.
pub fn progress_class(state: &LineState) -> &'static str {
    match state {
        LineState::Done => "complete",
        LineState::Assigned => "ready",
        LineState::Confirmed => "confirmed",
        LineState::Waiting => "waiting",
        _ => "draft",
    }
}

/// Class of the state label chip.
pub fn state_label_class(state: &LineState) -> &'static str {
    match state {
        LineState::Done => "done",
        LineState::Assigned => "assigned",
        LineState::Confirmed => "confirmed",
        LineState::Waiting => "waiting",
        _ => "draft",
    }
}

pub fn type_icon(code: &TypeCode) -> &'static str {
    match code {
        TypeCode::Outgoing => "fa-truck",
        TypeCode::Internal => "fa-exchange",
        TypeCode::Incoming => "fa-arrow-down",
        _ => "fa-arrows-h",
    }
}

/// Human label for a type code; unknown codes are shown as-is.
pub fn type_label(code: &TypeCode) -> &str {
    match code {
        TypeCode::Outgoing => "Outbound",
        TypeCode::Internal => "Internal",
        TypeCode::Incoming => "Inbound",
        other => other.as_str(),
    }
}
