//! Header badge: a one-line delivery status computed by the backend.

use serde::Serialize;

use crate::normalize::FALSE_SENTINEL;
use crate::summary::Summary;

/// Text the backend emits when an order has no deliveries.
pub const EMPTY_SUMMARY_TEXT: &str = "Sin entregas";

/// Leading glyph of a fully delivered summary.
pub const DONE_GLYPH: char = '✓';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeStyle {
    Idle,
    Done,
    InProgress,
}

impl BadgeStyle {
    /// Classify a summary text. `empty_text` is the backend's "no deliveries" text.
    pub fn classify(text: &str, empty_text: &str) -> Self {
        if text.is_empty() || text == FALSE_SENTINEL || text == empty_text {
            BadgeStyle::Idle
        } else if text.starts_with(DONE_GLYPH) {
            BadgeStyle::Done
        } else {
            BadgeStyle::InProgress
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            BadgeStyle::Idle => "summary-empty",
            BadgeStyle::Done => "summary-done",
            BadgeStyle::InProgress => "summary-progress",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            BadgeStyle::Idle => "fa-clock-o",
            BadgeStyle::Done => "fa-check-circle",
            BadgeStyle::InProgress => "fa-spinner fa-pulse",
        }
    }
}

/// Status line for the badge, in the backend's wording.
pub fn summary_text(summary: &Summary) -> String {
    if summary.total == 0 {
        return EMPTY_SUMMARY_TEXT.to_string();
    }

    if summary.done == summary.total {
        return format!("{} {} entrega(s) completada(s)", DONE_GLYPH, summary.total);
    }

    let mut parts = Vec::new();
    if summary.done > 0 {
        parts.push(format!("{} completada(s)", summary.done));
    }
    if summary.active > 0 {
        parts.push(format!("{} en proceso", summary.active));
    }
    let pending = summary
        .total
        .saturating_sub(summary.done)
        .saturating_sub(summary.active);
    if pending > 0 {
        parts.push(format!("{} pendiente(s)", pending));
    }

    parts.join(" | ")
}
