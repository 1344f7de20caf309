use crate::github::types::Repository;
use crate::selection::Selection;
use crate::ui::node::{create_and_append, Node, NodeKind};
use crate::ui::theme;
use ratatui::{
    buffer::Buffer as Buf,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

pub const TITLE: &str = "HYF repositories";

/// Builds the banner and the selection control under `root` and returns the
/// control. One option per repository, in the order the API returned them.
pub fn render_header<'a>(
    root: &'a mut Node,
    repos: &[Repository],
    selection: &Selection,
) -> &'a mut Node {
    let header = create_and_append(NodeKind::Div, root, &[("class", "header"), ("text", TITLE)]);
    let select = create_and_append(
        NodeKind::Select,
        header,
        &[("name", "repositoryList"), ("class", "repository-list")],
    );
    for repo in repos {
        let id = repo.id.to_string();
        create_and_append(
            NodeKind::Option,
            select,
            &[("value", id.as_str()), ("text", repo.name.as_str())],
        );
    }
    sync_control(select, selection);
    select
}

/// Mirrors the selection into the control's `value` attribute.
pub fn sync_control(select: &mut Node, selection: &Selection) {
    match selection.repo_id() {
        Some(id) => {
            select.attrs.insert("value".to_string(), id.to_string());
        }
        None => {
            select.attrs.remove("value");
        }
    }
}

pub struct HeaderBar<'a> {
    pub header: Option<&'a Node>,
    pub org: &'a str,
    pub selected_label: Option<&'a str>,
    pub position: Option<(usize, usize)>,
}

impl<'a> Widget for HeaderBar<'a> {
    fn render(self, area: Rect, buf: &mut Buf) {
        let bg = Style::default().bg(theme::HEADER_BG);
        for x in area.x..area.right() {
            buf[(x, area.y)].set_style(bg);
        }

        let title = self
            .header
            .and_then(|h| h.text.as_deref())
            .unwrap_or(TITLE);

        let mut spans: Vec<Span<'static>> = vec![
            Span::styled(
                format!(" {title}"),
                Style::default()
                    .fg(theme::ACCENT)
                    .bg(theme::HEADER_BG)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                " \u{2503} ",
                Style::default().fg(theme::SEPARATOR).bg(theme::HEADER_BG),
            ),
            Span::styled(
                self.org.to_string(),
                Style::default().fg(theme::DIM_TEXT).bg(theme::HEADER_BG),
            ),
        ];

        if let Some(label) = self.selected_label {
            spans.push(Span::styled(
                " \u{2503} ",
                Style::default().fg(theme::SEPARATOR).bg(theme::HEADER_BG),
            ));
            spans.push(Span::styled(
                format!("\u{25be} {label}"),
                Style::default().bg(theme::HEADER_BG),
            ));
            if let Some((idx, total)) = self.position {
                spans.push(Span::styled(
                    format!("  {}/{}", idx + 1, total),
                    Style::default().fg(theme::DIM_TEXT).bg(theme::HEADER_BG),
                ));
            }
        }

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);

        let right = "? help ";
        let right_w = UnicodeWidthStr::width(right);
        let area_w = area.width as usize;
        if area_w > right_w {
            let right_x = area.x + (area_w - right_w) as u16;
            let right_span = Span::styled(
                right,
                Style::default().fg(theme::DIM_TEXT).bg(theme::HEADER_BG),
            );
            buf.set_line(right_x, area.y, &Line::from(right_span), right_w as u16);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{buffer_text, make_repo};

    #[test]
    fn one_option_per_repository_in_fetch_order() {
        let repos = vec![make_repo(1, "a"), make_repo(2, "b")];
        let mut selection = Selection::default();
        selection.choose(1);
        let mut root = Node::new(NodeKind::Root);

        let select = render_header(&mut root, &repos, &selection);
        let values: Vec<&str> = select
            .children
            .iter()
            .filter_map(|o| o.attr("value"))
            .collect();
        let labels: Vec<&str> = select
            .children
            .iter()
            .filter_map(|o| o.text.as_deref())
            .collect();
        assert_eq!(values, vec!["1", "2"]);
        assert_eq!(labels, vec!["a", "b"]);
        assert_eq!(select.attr("value"), Some("1"));

        let header = root.find_by_class("header").unwrap();
        assert_eq!(header.text.as_deref(), Some(TITLE));
    }

    #[test]
    fn options_keep_unsorted_source_order() {
        let repos = vec![make_repo(9, "zeta"), make_repo(3, "alpha"), make_repo(5, "mu")];
        let mut root = Node::new(NodeKind::Root);
        let select = render_header(&mut root, &repos, &Selection::default());
        let values: Vec<&str> = select
            .children
            .iter()
            .filter_map(|o| o.attr("value"))
            .collect();
        assert_eq!(values, vec!["9", "3", "5"]);
        assert!(select.attr("value").is_none());
    }

    #[test]
    fn bar_shows_title_and_selected_repo() {
        let mut root = Node::new(NodeKind::Root);
        render_header(&mut root, &[], &Selection::default());
        let area = Rect::new(0, 0, 80, 1);
        let mut buf = Buf::empty(area);
        HeaderBar {
            header: root.find_by_class("header"),
            org: "HackYourFuture",
            selected_label: Some("JavaScript"),
            position: Some((0, 12)),
        }
        .render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("HYF repositories"));
        assert!(text.contains("JavaScript"));
        assert!(text.contains("1/12"));
    }
}
