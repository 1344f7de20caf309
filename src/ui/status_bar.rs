use crate::ui::theme;
use ratatui::{
    buffer::Buffer as Buf,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

pub struct StatusBar<'a> {
    pub state: &'a str,
    pub repo_count: Option<usize>,
    pub contributors: &'a str,
    pub focus: &'a str,
}

fn separator() -> Span<'static> {
    Span::styled(
        "\u{2502}",
        Style::default().fg(theme::BORDER_COLOR).bg(theme::STATUS_BG),
    )
}

impl<'a> Widget for StatusBar<'a> {
    fn render(self, area: Rect, buf: &mut Buf) {
        let bg = Style::default().bg(theme::STATUS_BG);
        for x in area.x..area.right() {
            buf[(x, area.y)].set_style(bg);
        }

        let mut spans = vec![Span::styled(
            format!(" {} ", self.state),
            Style::default()
                .fg(theme::FOCUS_COLOR)
                .bg(theme::STATUS_BG)
                .add_modifier(Modifier::BOLD),
        )];

        if let Some(count) = self.repo_count {
            spans.push(separator());
            spans.push(Span::styled(format!(" {count} repos "), bg));
        }

        if !self.contributors.is_empty() {
            spans.push(separator());
            spans.push(Span::styled(format!(" {} ", self.contributors), bg));
        }

        spans.push(separator());
        spans.push(Span::styled(
            format!(" focus: {} ", self.focus),
            Style::default().fg(theme::DIM_TEXT).bg(theme::STATUS_BG),
        ));

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
