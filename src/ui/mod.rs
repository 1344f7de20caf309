pub mod contributor_panel;
pub mod detail_panel;
pub mod header_bar;
pub mod help_panel;
pub mod input;
pub mod node;
pub mod repo_list;
pub mod status_bar;
pub mod theme;
pub mod toast;

use ratatui::{
    buffer::Buffer as Buf,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Well-known ids of the two content panels inside the page tree.
pub const REPO_DETAIL_ID: &str = "repoDetailCard";
pub const CONTRIBUTORS_ID: &str = "contributorsCard";

/// Cuts `s` to at most `max` display columns, marking the cut with an
/// ellipsis.
pub fn truncate_with_ellipsis(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    let budget = max.saturating_sub(1);
    let mut used = 0;
    let mut out: String = s
        .chars()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= budget
        })
        .collect();
    out.push('\u{2026}');
    out
}

/// Popup area of the given percentages, centred in `area`.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(row);
    popup
}

/// Paints an alert node as bold red wrapped text.
pub fn render_alert(alert: &node::Node, area: Rect, buf: &mut Buf) {
    let text = alert.text.as_deref().unwrap_or("");
    let style = Style::default().fg(theme::ERROR_FG);
    Paragraph::new(Line::from(vec![
        Span::styled("\u{2716} ", style),
        Span::styled(text.to_string(), style.add_modifier(Modifier::BOLD)),
    ]))
    .wrap(Wrap { trim: true })
    .render(area, buf);
}

/// Coarse age of an update timestamp, e.g. `3d ago`.
pub fn format_time_ago(time: &chrono::DateTime<chrono::Utc>) -> String {
    let secs = chrono::Utc::now()
        .signed_duration_since(*time)
        .num_seconds()
        .max(0);
    const STEPS: &[(i64, &str)] = &[
        (365 * 86_400, "y"),
        (30 * 86_400, "mo"),
        (86_400, "d"),
        (3_600, "h"),
        (60, "m"),
    ];
    STEPS
        .iter()
        .find(|(size, _)| secs >= *size)
        .map(|(size, unit)| format!("{}{unit} ago", secs / size))
        .unwrap_or_else(|| format!("{secs}s ago"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate_with_ellipsis("alpha", 10), "alpha");
        assert_eq!(truncate_with_ellipsis("alphabet", 5), "alph\u{2026}");
        assert_eq!(truncate_with_ellipsis("alphabet", 1), "\u{2026}");
    }

    #[test]
    fn time_ago_buckets() {
        let t = chrono::Utc::now() - chrono::Duration::days(3);
        assert_eq!(format_time_ago(&t), "3d ago");
        let t = chrono::Utc::now() - chrono::Duration::days(800);
        assert_eq!(format_time_ago(&t), "2y ago");
        let t = chrono::Utc::now() + chrono::Duration::hours(1);
        assert_eq!(format_time_ago(&t), "0s ago");
    }

    #[test]
    fn popup_is_centred() {
        let popup = centered_rect(50, 50, Rect::new(0, 0, 100, 40));
        assert_eq!(popup, Rect::new(25, 10, 50, 20));
    }
}
