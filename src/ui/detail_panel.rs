use crate::github::types::Repository;
use crate::selection::Selection;
use crate::ui::node::{
    create_alert, create_and_append, make_link, new_row, Node, NodeKind, RowContent, ALERT_CLASS,
};
use crate::ui::{format_time_ago, render_alert, theme, truncate_with_ellipsis};
use ratatui::{
    buffer::Buffer as Buf,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

pub const LABEL_WIDTH: usize = 14;

/// Rebuilds the detail panel for the selected repository: a four-row table
/// of link, description, fork count and last update.
pub fn render_repo_details(panel: &mut Node, repos: &[Repository], selection: &Selection) {
    panel.clear();

    let Some(repo) = selection.active(repos) else {
        let message = match selection.repo_id() {
            Some(id) => format!("Repository {id} not found"),
            None => "No repositories found".to_string(),
        };
        create_alert(panel, &message);
        return;
    };

    let table = create_and_append(NodeKind::Table, panel, &[]);
    let forks = repo.forks_count.to_string();
    new_row(
        table,
        "Repository:",
        RowContent::Node(make_link(&repo.html_url, &repo.name)),
    );
    new_row(table, "Description:", RowContent::Text(repo.description.as_deref()));
    new_row(table, "Forks:", RowContent::Text(Some(forks.as_str())));
    new_row(table, "Updated:", RowContent::Text(Some(repo.updated_at.as_str())));
}

pub struct DetailPanel<'a> {
    pub panel: Option<&'a Node>,
}

impl<'a> Widget for DetailPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buf) {
        let block = Block::default()
            .title(" Repository ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::BORDER_COLOR));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 1 || inner.width < 10 {
            return;
        }
        let Some(panel) = self.panel else {
            return;
        };

        if let Some(alert) = panel.find_by_class(ALERT_CLASS) {
            render_alert(alert, inner, buf);
            return;
        }

        let Some(table) = panel.find_kind(NodeKind::Table) else {
            return;
        };

        let label_style = Style::default().fg(theme::ACCENT);
        let x = inner.x + 1;
        let w = inner.width.saturating_sub(1);
        let value_w = (w as usize).saturating_sub(LABEL_WIDTH);
        let mut y = inner.y;

        for row in &table.children {
            if y >= inner.bottom() {
                return;
            }
            let label = row
                .children
                .first()
                .and_then(|c| c.text.as_deref())
                .unwrap_or("");
            let Some(value_cell) = row.children.get(1) else {
                continue;
            };

            let mut spans = vec![Span::styled(
                format!("{label:<LABEL_WIDTH$}"),
                label_style,
            )];
            spans.extend(value_spans(label, value_cell, value_w));
            buf.set_line(x, y, &Line::from(spans), w);
            y += 1;

            // Long descriptions continue on the following lines
            if label == "Description:" {
                let text = value_cell.text.as_deref().unwrap_or("");
                for chunk in wrap_chars(text, value_w).into_iter().skip(1) {
                    if y >= inner.bottom() {
                        return;
                    }
                    let line = Line::from(vec![
                        Span::raw(" ".repeat(LABEL_WIDTH)),
                        Span::raw(chunk),
                    ]);
                    buf.set_line(x, y, &line, w);
                    y += 1;
                }
            }
        }
    }
}

fn value_spans(label: &str, cell: &Node, width: usize) -> Vec<Span<'static>> {
    if let Some(link) = cell.find_kind(NodeKind::Link) {
        let text = link.text.as_deref().unwrap_or("");
        return vec![Span::styled(
            truncate_with_ellipsis(text, width),
            Style::default()
                .fg(theme::LINK_COLOR)
                .add_modifier(Modifier::UNDERLINED | Modifier::BOLD),
        )];
    }

    let text = cell.text.as_deref().unwrap_or("");
    if label == "Description:" {
        let first = wrap_chars(text, width).into_iter().next().unwrap_or_default();
        return vec![Span::raw(first)];
    }

    let mut spans = vec![Span::raw(truncate_with_ellipsis(text, width))];
    if label == "Updated:" {
        if let Ok(time) = chrono::DateTime::parse_from_rfc3339(text) {
            let ago = format_time_ago(&time.with_timezone(&chrono::Utc));
            spans.push(Span::styled(
                format!("  ({ago})"),
                Style::default().fg(theme::DIM_TEXT),
            ));
        }
    }
    spans
}

fn wrap_chars(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
        .into_iter()
        .map(|l| truncate_with_ellipsis(&l, width))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{buffer_text, make_repo};

    fn rows_text(panel: &Node) -> Vec<(String, String)> {
        panel
            .find_kind(NodeKind::Table)
            .unwrap()
            .children
            .iter()
            .map(|row| (row.children[0].text_content(), row.children[1].text_content()))
            .collect()
    }

    #[test]
    fn four_rows_for_selected_repository() {
        let repos = vec![make_repo(1, "a"), make_repo(2, "b")];
        let mut selection = Selection::default();
        selection.choose(2);
        let mut panel = Node::new(NodeKind::Div);

        render_repo_details(&mut panel, &repos, &selection);

        assert_eq!(
            rows_text(&panel),
            vec![
                ("Repository:".to_string(), "b".to_string()),
                ("Description:".to_string(), "b description".to_string()),
                ("Forks:".to_string(), "20".to_string()),
                ("Updated:".to_string(), "2018-03-01T10:00:00Z".to_string()),
            ]
        );
        let link = panel.find_kind(NodeKind::Link).unwrap();
        assert_eq!(link.attr("href"), Some("https://github.com/HackYourFuture/b"));
        assert_eq!(link.attr("target"), Some("_blank"));
    }

    #[test]
    fn absent_description_is_empty() {
        let mut repo = make_repo(1, "a");
        repo.description = None;
        let mut selection = Selection::default();
        selection.choose(1);
        let mut panel = Node::new(NodeKind::Div);
        render_repo_details(&mut panel, &[repo], &selection);
        assert_eq!(rows_text(&panel)[1].1, "");
    }

    #[test]
    fn rerender_replaces_previous_table() {
        let repos = vec![make_repo(1, "a"), make_repo(2, "b")];
        let mut selection = Selection::default();
        let mut panel = Node::new(NodeKind::Div);

        selection.choose(1);
        render_repo_details(&mut panel, &repos, &selection);
        selection.choose(2);
        render_repo_details(&mut panel, &repos, &selection);

        assert_eq!(panel.children.len(), 1);
        assert_eq!(panel.count_kind(NodeKind::Row), 4);
        assert_eq!(rows_text(&panel)[0].1, "b");
    }

    #[test]
    fn unknown_id_renders_alert() {
        let repos = vec![make_repo(1, "a")];
        let mut selection = Selection::default();
        selection.choose(99);
        let mut panel = Node::new(NodeKind::Div);
        render_repo_details(&mut panel, &repos, &selection);
        assert_eq!(panel.count_class(ALERT_CLASS), 1);
        assert_eq!(panel.count_kind(NodeKind::Table), 0);
        assert_eq!(panel.text_content(), "Repository 99 not found");
    }

    #[test]
    fn widget_paints_labels_and_values() {
        let repos = vec![make_repo(3, "JavaScript")];
        let mut selection = Selection::default();
        selection.choose(3);
        let mut panel = Node::new(NodeKind::Div);
        render_repo_details(&mut panel, &repos, &selection);

        let area = Rect::new(0, 0, 60, 8);
        let mut buf = Buf::empty(area);
        DetailPanel {
            panel: Some(&panel),
        }
        .render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("Repository:"));
        assert!(text.contains("JavaScript"));
        assert!(text.contains("Forks:"));
        assert!(text.contains("30"));
        assert!(text.contains("2018-03-01T10:00:00Z"));
    }

    #[test]
    fn wrap_splits_on_words() {
        assert_eq!(
            wrap_chars("one two three four", 9),
            vec!["one two", "three", "four"]
        );
        assert!(wrap_chars("", 9).is_empty());
    }
}
