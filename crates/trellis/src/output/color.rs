//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success/Done:   green   (done status, completed actions)
//!   - Warning/Active: yellow  (doing, in review, P1 priority)
//!   - Error/Blocked:  red     (blocked issues, P0 priority, cycles)
//!   - Info/Reference: cyan    (display numbers)
//!   - Muted:          dimmed  (canceled, connectors, rollups)
//!   - Emphasis:       bold    (section headers, projects)

use colored::Colorize;
use trellis_core::domain::IssueStatus;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
#[must_use]
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
#[must_use]
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
#[must_use]
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "info" color (cyan) to text.
#[must_use]
pub fn info(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply color to status text; blocked issues read as blocked whatever
/// their stored status.
pub(crate) fn colorize_status(status: IssueStatus, blocked: bool, config: &OutputConfig) -> String {
    let text = if blocked {
        "blocked".to_string()
    } else {
        status.to_string()
    };
    if !config.use_colors {
        return text;
    }
    if blocked {
        return text.red().to_string();
    }
    match status {
        IssueStatus::Todo => text.white().to_string(),
        IssueStatus::Doing | IssueStatus::InReview => text.yellow().to_string(),
        IssueStatus::Done => text.green().to_string(),
        IssueStatus::Canceled => text.dimmed().to_string(),
    }
}

/// Apply color to priority text based on priority level.
pub(crate) fn colorize_priority(priority: u8, config: &OutputConfig) -> String {
    let text = format!("P{priority}");
    if !config.use_colors {
        return text;
    }
    match priority {
        0 => text.red().bold().to_string(),
        1 => text.yellow().to_string(),
        _ => text.to_string(),
    }
}

/// Colorize a display number (cyan).
pub(crate) fn colorize_number(number: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return number.to_string();
    }
    number.cyan().to_string()
}

/// Get a colored status icon, with ASCII fallback support.
pub(crate) fn colored_status_icon(status: IssueStatus, blocked: bool, config: &OutputConfig) -> String {
    let icon = match (config.use_ascii, blocked) {
        (true, true) => "x",
        (false, true) => "✗",
        (true, false) => match status {
            IssueStatus::Todo => "o",
            IssueStatus::Doing => ">",
            IssueStatus::InReview => "?",
            IssueStatus::Done => "+",
            IssueStatus::Canceled => "-",
        },
        (false, false) => match status {
            IssueStatus::Todo => "○",
            IssueStatus::Doing => "▶",
            IssueStatus::InReview => "◐",
            IssueStatus::Done => "✓",
            IssueStatus::Canceled => "⊘",
        },
    };

    if !config.use_colors {
        return icon.to_string();
    }
    if blocked {
        return icon.red().to_string();
    }
    match status {
        IssueStatus::Todo => icon.white().to_string(),
        IssueStatus::Doing | IssueStatus::InReview => icon.yellow().to_string(),
        IssueStatus::Done => icon.green().to_string(),
        IssueStatus::Canceled => icon.dimmed().to_string(),
    }
}

/// Color a completion percentage: green when finished, yellow when started.
pub(crate) fn colorize_percentage(percentage: u8, config: &OutputConfig) -> String {
    let text = format!("{percentage}%");
    if !config.use_colors {
        return text;
    }
    match percentage {
        100 => text.green().to_string(),
        0 => text.dimmed().to_string(),
        _ => text.yellow().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn plain() -> OutputConfig {
        OutputConfig::new(false, false)
    }

    #[rstest]
    #[case(IssueStatus::Todo, false, "todo")]
    #[case(IssueStatus::InReview, false, "in_review")]
    #[case(IssueStatus::Todo, true, "blocked")]
    fn test_status_text_without_colors(
        #[case] status: IssueStatus,
        #[case] blocked: bool,
        #[case] expected: &str,
    ) {
        assert_eq!(colorize_status(status, blocked, &plain()), expected);
    }

    #[rstest]
    #[case(IssueStatus::Todo, false, "o")]
    #[case(IssueStatus::Doing, false, ">")]
    #[case(IssueStatus::Done, false, "+")]
    #[case(IssueStatus::Done, true, "x")]
    fn test_ascii_icons(#[case] status: IssueStatus, #[case] blocked: bool, #[case] expected: &str) {
        let config = OutputConfig::new(true, false);
        assert_eq!(colored_status_icon(status, blocked, &config), expected);
    }

    #[test]
    fn test_plain_helpers_pass_text_through() {
        let config = plain();
        assert_eq!(success("ok", &config), "ok");
        assert_eq!(error("bad", &config), "bad");
        assert_eq!(colorize_priority(0, &config), "P0");
        assert_eq!(colorize_percentage(30, &config), "30%");
    }

    #[test]
    fn test_colored_output_adds_escape_codes() {
        colored::control::set_override(true);
        let config = OutputConfig::new(false, true);
        assert_ne!(success("ok", &config), "ok");
        colored::control::unset_override();
    }
}
