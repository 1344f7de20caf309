use crate::ui::node::Node;
use crate::ui::theme;
use crate::ui::truncate_with_ellipsis;
use ratatui::{
    buffer::Buffer as Buf,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Paints the selection control as a scrolling list. The highlighted row is
/// the option whose value equals the control's `value` attribute.
pub struct RepoList<'a> {
    pub control: Option<&'a Node>,
    pub scroll: usize,
    pub focused: bool,
}

impl<'a> RepoList<'a> {
    pub fn selected_index(control: &Node) -> Option<usize> {
        let value = control.attr("value")?;
        control
            .children
            .iter()
            .position(|o| o.attr("value") == Some(value))
    }

    /// Scroll offset that keeps `selected` inside a viewport of `visible` rows.
    pub fn clamp_scroll(scroll: usize, selected: usize, visible: usize) -> usize {
        if visible == 0 {
            return scroll;
        }
        if selected >= scroll + visible {
            selected + 1 - visible
        } else if selected < scroll {
            selected
        } else {
            scroll
        }
    }
}

impl<'a> Widget for RepoList<'a> {
    fn render(self, area: Rect, buf: &mut Buf) {
        let border_style = if self.focused {
            Style::default().fg(theme::FOCUS_COLOR)
        } else {
            Style::default().fg(theme::BORDER_COLOR)
        };

        let block = Block::default()
            .title(" Repositories ")
            .borders(Borders::ALL)
            .border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        let Some(control) = self.control else {
            return;
        };

        let selected = Self::selected_index(control);
        let visible = inner.height as usize;
        let sel_bg = if self.focused {
            theme::SELECTED_BG
        } else {
            theme::UNFOCUSED_SEL_BG
        };

        for (i, option) in control
            .children
            .iter()
            .skip(self.scroll)
            .take(visible)
            .enumerate()
        {
            let y = inner.y + i as u16;
            let is_selected = Some(self.scroll + i) == selected;
            let label = option.text.as_deref().unwrap_or("");
            let label = truncate_with_ellipsis(label, (inner.width as usize).saturating_sub(2));

            let line = if is_selected {
                Line::from(vec![
                    Span::styled(
                        "\u{258e} ",
                        Style::default().fg(theme::ACCENT).bg(sel_bg),
                    ),
                    Span::styled(
                        label,
                        Style::default().bg(sel_bg).add_modifier(Modifier::BOLD),
                    ),
                ])
            } else {
                Line::from(vec![Span::raw("  "), Span::raw(label)])
            };
            buf.set_line(inner.x, y, &line, inner.width);

            if is_selected {
                for x in inner.x..inner.right() {
                    buf[(x, y)].set_style(Style::default().bg(sel_bg));
                }
            }
        }
    }
}
