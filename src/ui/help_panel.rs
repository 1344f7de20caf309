use crate::ui::theme;
use ratatui::{
    buffer::Buffer as Buf,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

struct Section {
    title: &'static str,
    keys: &'static [(&'static str, &'static str)],
}

const SECTIONS: &[Section] = &[
    Section {
        title: "Repositories",
        keys: &[
            ("j/k \u{2191}/\u{2193}", "Change selection"),
            ("g / G", "First / last repository"),
            ("o", "Open repository page"),
        ],
    },
    Section {
        title: "Contributors",
        keys: &[
            ("j/k \u{2191}/\u{2193}", "Move cursor"),
            ("Enter / click", "Open profile"),
            ("r", "Reload list"),
        ],
    },
    Section {
        title: "General",
        keys: &[
            ("Tab / h / l", "Switch panel"),
            ("PgUp / PgDn", "Move by page"),
            ("?", "Toggle help"),
            ("Esc", "Dismiss message"),
            ("q", "Quit"),
        ],
    },
];

fn help_lines() -> Vec<Line<'static>> {
    let title = Style::default()
        .fg(theme::SECTION_HEADER_FG)
        .add_modifier(Modifier::BOLD);
    let key = Style::default().fg(theme::FOCUS_COLOR);

    let mut lines = Vec::new();
    for (i, section) in SECTIONS.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        lines.push(Line::styled(section.title, title));
        lines.extend(section.keys.iter().map(|(k, desc)| {
            Line::from(vec![Span::styled(format!("  {k:<15}"), key), Span::raw(*desc)])
        }));
    }
    lines
}

pub struct HelpPanel;

impl Widget for HelpPanel {
    fn render(self, area: Rect, buf: &mut Buf) {
        let popup = super::centered_rect(50, 70, area);
        Clear.render(popup, buf);
        Paragraph::new(help_lines())
            .block(
                Block::default()
                    .title(" Keys ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme::ACCENT)),
            )
            .render(popup, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::buffer_text;

    #[test]
    fn lists_every_section() {
        let area = Rect::new(0, 0, 100, 40);
        let mut buf = Buf::empty(area);
        HelpPanel.render(area, &mut buf);
        let text = buffer_text(&buf);
        for section in SECTIONS {
            assert!(text.contains(section.title), "missing {}", section.title);
        }
        assert!(text.contains("Open profile"));
    }
}
