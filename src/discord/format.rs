//! Text helpers shared by the event handlers.

use chrono::DateTime;

/// Truncate `text` to at most `max_len` characters, marking the cut with `...`.
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Summarise file changes, e.g. `+ 2 added, ~ 1 modified`.
///
/// Empty categories are left out; no changes at all yields an empty string.
pub fn format_file_changes(added: usize, modified: usize, removed: usize) -> String {
    let mut parts = Vec::new();
    if added > 0 {
        parts.push(format!("+ {} added", added));
    }
    if modified > 0 {
        parts.push(format!("~ {} modified", modified));
    }
    if removed > 0 {
        parts.push(format!("- {} removed", removed));
    }
    parts.join(", ")
}

/// Upper-case label for a workflow conclusion. Anything unknown is still pending.
pub fn status_text(conclusion: Option<&str>) -> &'static str {
    match conclusion {
        Some("success") => "SUCCESS",
        Some("failure") => "FAILURE",
        Some("cancelled") => "CANCELLED",
        Some("skipped") => "SKIPPED",
        _ => "PENDING",
    }
}

/// Human-readable elapsed time between two RFC 3339 timestamps.
///
/// Returns `"Unknown"` if either side is missing or unparseable.
pub fn format_duration(start: Option<&str>, end: Option<&str>) -> String {
    let (Some(start), Some(end)) = (start, end) else {
        return "Unknown".to_string();
    };
    let (Ok(start), Ok(end)) = (
        DateTime::parse_from_rfc3339(start),
        DateTime::parse_from_rfc3339(end),
    ) else {
        return "Unknown".to_string();
    };

    let secs = (end - start).num_seconds().max(0);
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
    }

    #[test]
    fn test_truncate_long_text() {
        assert_eq!(truncate("abcdefghijkl", 10), "abcdefg...");
        assert_eq!(truncate("abcdefghijkl", 10).chars().count(), 10);
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        assert_eq!(truncate("ééééé", 5), "ééééé");
        assert_eq!(truncate("éééééé", 5), "éé...");
    }

    #[test]
    fn test_format_file_changes() {
        assert_eq!(format_file_changes(2, 1, 0), "+ 2 added, ~ 1 modified");
        assert_eq!(format_file_changes(0, 0, 3), "- 3 removed");
        assert_eq!(format_file_changes(0, 0, 0), "");
    }

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(Some("success")), "SUCCESS");
        assert_eq!(status_text(Some("failure")), "FAILURE");
        assert_eq!(status_text(Some("cancelled")), "CANCELLED");
        assert_eq!(status_text(Some("skipped")), "SKIPPED");
        assert_eq!(status_text(Some("timed_out")), "PENDING");
        assert_eq!(status_text(None), "PENDING");
    }

    #[test]
    fn test_format_duration() {
        let start = Some("2025-01-01T10:00:00Z");
        assert_eq!(format_duration(start, Some("2025-01-01T10:00:42Z")), "42s");
        assert_eq!(format_duration(start, Some("2025-01-01T10:03:05Z")), "3m 5s");
        assert_eq!(format_duration(start, Some("2025-01-01T12:15:00Z")), "2h 15m");
    }

    #[test]
    fn test_format_duration_unknown() {
        assert_eq!(format_duration(None, Some("2025-01-01T10:00:00Z")), "Unknown");
        assert_eq!(format_duration(Some("yesterday"), Some("today")), "Unknown");
    }
}
