//! Display formatting helpers.

use crate::hierarchy::NodeKind;
use chrono::{DateTime, NaiveDate, Utc};

/// Prefix of an entity's display number.
#[must_use]
pub fn number_prefix(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Project => "P",
        NodeKind::Epic => "E",
        NodeKind::Issue | NodeKind::SubIssue => "I",
    }
}

/// Human-facing entity number, e.g. `P-1`, `E-3` or `I-2`.
#[must_use]
pub fn display_number(kind: NodeKind, number: u32) -> String {
    format!("{}-{number}", number_prefix(kind))
}

/// Byte count with a binary unit: `512 B`, `1.5 KB`, `3.0 MB`, `1.2 GB`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match bytes {
        b if b < KB => format!("{b} B"),
        b if b < MB => format!("{:.1} KB", b as f64 / KB as f64),
        b if b < GB => format!("{:.1} MB", b as f64 / MB as f64),
        b => format!("{:.1} GB", b as f64 / GB as f64),
    }
}

/// Calendar date of a timestamp, e.g. `Mar 5, 2024`.
#[must_use]
pub fn format_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%b %-d, %Y").to_string()
}

/// Due date relative to `today`: `overdue`, `today`, or the date itself.
#[must_use]
pub fn format_due_date(due: NaiveDate, today: NaiveDate) -> String {
    if due < today {
        "overdue".to_string()
    } else if due == today {
        "today".to_string()
    } else {
        due.format("%b %-d, %Y").to_string()
    }
}
