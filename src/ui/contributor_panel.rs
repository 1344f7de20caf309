use crate::avatar_cache::AvatarCache;
use crate::error::FetchError;
use crate::github::types::{Contributor, Repository};
use crate::selection::Selection;
use crate::terminal_graphics::GraphicsCapability;
use crate::ui::node::{create_alert, create_and_append, Node, NodeKind, ALERT_CLASS};
use crate::ui::{render_alert, theme, truncate_with_ellipsis};
use ratatui::{
    buffer::Buffer as Buf,
    layout::{Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

pub const HEADER_TEXT: &str = "Contributions";
pub const LIST_CLASS: &str = "contributor-list";
pub const ITEM_CLASS: &str = "contributor-item";
const LOADING_CLASS: &str = "loading";

/// Contributor fetch issued for one selection. The token ties the eventual
/// response back to the selection it was made for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributorRequest {
    pub url: String,
    pub token: u64,
}

/// Clears the panel and resolves what to fetch for the active repository.
pub fn begin_contributors(
    panel: &mut Node,
    repos: &[Repository],
    selection: &Selection,
) -> Option<ContributorRequest> {
    panel.clear();
    let repo = selection.active(repos)?;
    create_and_append(
        NodeKind::Paragraph,
        panel,
        &[("class", LOADING_CLASS), ("text", "Loading contributors\u{2026}")],
    );
    Some(ContributorRequest {
        url: repo.contributors_url.clone(),
        token: selection.token(),
    })
}

/// Rebuilds the panel from a finished fetch: one alert on failure, otherwise
/// a header and one list item per contributor in API order.
pub fn apply_contributors(
    panel: &mut Node,
    result: &Result<Vec<Contributor>, FetchError>,
    avatar_rows: u16,
) {
    panel.clear();

    let contributors = match result {
        Ok(list) => list,
        Err(e) => {
            create_alert(panel, &e.to_string());
            return;
        }
    };

    create_and_append(
        NodeKind::Paragraph,
        panel,
        &[("class", "contributor-header"), ("text", HEADER_TEXT)],
    );
    let ul = create_and_append(NodeKind::List, panel, &[("class", LIST_CLASS)]);
    let height = avatar_rows.to_string();
    for profile in contributors {
        render_contributor(ul, profile, &height);
    }
}

fn render_contributor(list: &mut Node, profile: &Contributor, height: &str) {
    let li = create_and_append(
        NodeKind::ListItem,
        list,
        &[
            ("class", ITEM_CLASS),
            ("aria-label", profile.login.as_str()),
            ("href", profile.html_url.as_str()),
        ],
    );
    create_and_append(
        NodeKind::Image,
        li,
        &[
            ("src", profile.avatar_url.as_str()),
            ("class", "contributor-avatar"),
            ("height", height),
        ],
    );
    let data = create_and_append(NodeKind::Div, li, &[("class", "contributor-data")]);
    create_and_append(NodeKind::Div, data, &[("text", profile.login.as_str())]);
    let count = profile.contributions.to_string();
    create_and_append(
        NodeKind::Div,
        data,
        &[("class", "contributor-badge"), ("text", count.as_str())],
    );
}

pub fn items(panel: &Node) -> &[Node] {
    panel
        .find_by_class(LIST_CLASS)
        .map(|ul| ul.children.as_slice())
        .unwrap_or(&[])
}

pub fn item_href(panel: &Node, index: usize) -> Option<&str> {
    items(panel).get(index).and_then(|li| li.attr("href"))
}

/// Avatar urls of the rendered roster, in list order.
pub fn avatar_urls(panel: &Node) -> Vec<String> {
    items(panel)
        .iter()
        .filter_map(|li| li.find_kind(NodeKind::Image))
        .filter_map(|img| img.attr("src"))
        .map(String::from)
        .collect()
}

struct ItemView<'a> {
    login: &'a str,
    badge: &'a str,
    avatar: &'a str,
}

fn item_view(li: &Node) -> ItemView<'_> {
    let avatar = li
        .find_kind(NodeKind::Image)
        .and_then(|img| img.attr("src"))
        .unwrap_or("");
    let badge = li
        .find_by_class("contributor-badge")
        .and_then(|b| b.text.as_deref())
        .unwrap_or("");
    let login = li
        .find_by_class("contributor-data")
        .and_then(|d| d.children.first())
        .and_then(|d| d.text.as_deref())
        .unwrap_or("");
    ItemView {
        login,
        badge,
        avatar,
    }
}

pub struct ContributorPanel<'a> {
    pub panel: Option<&'a Node>,
    pub cursor: usize,
    pub scroll: usize,
    pub focused: bool,
    pub item_rows: u16,
    pub graphics: GraphicsCapability,
    pub avatars: &'a mut AvatarCache,
}

impl<'a> ContributorPanel<'a> {
    pub fn block(focused: bool) -> Block<'static> {
        let border_style = if focused {
            Style::default().fg(theme::FOCUS_COLOR)
        } else {
            Style::default().fg(theme::BORDER_COLOR)
        };
        Block::default()
            .title(" Contributors ")
            .borders(Borders::ALL)
            .border_style(border_style)
    }

    /// Number of whole items that fit below the header line.
    pub fn visible_items(inner: Rect, item_rows: u16) -> usize {
        (inner.height.saturating_sub(1) / item_rows.max(1)) as usize
    }

    /// Item index under screen row `y`, given the panel's outer area.
    pub fn item_at(area: Rect, scroll: usize, item_rows: u16, y: u16) -> Option<usize> {
        let inner = Self::block(false).inner(area);
        let list_top = inner.y + 1;
        if y < list_top || y >= inner.bottom() {
            return None;
        }
        let offset = ((y - list_top) / item_rows.max(1)) as usize;
        if offset >= Self::visible_items(inner, item_rows) {
            return None;
        }
        Some(scroll + offset)
    }

    fn render_item(&mut self, li: &Node, rect: Rect, selected: bool, buf: &mut Buf) {
        let view = item_view(li);
        let rows = rect.height;
        let sel_bg = if self.focused {
            theme::SELECTED_BG
        } else {
            theme::UNFOCUSED_SEL_BG
        };

        if selected {
            for y in rect.y..rect.bottom() {
                for x in rect.x..rect.right() {
                    buf[(x, y)].set_style(Style::default().bg(sel_bg));
                }
                if let Some(cell) = buf.cell_mut(Position::new(rect.x, y)) {
                    cell.set_symbol("\u{258e}");
                    cell.set_fg(theme::ACCENT);
                }
            }
        }

        let avatar_x = rect.x + 1;
        let avatar_cols = self.graphics.square_cols(rows);
        if avatar_x + avatar_cols >= rect.right() {
            return;
        }
        let avatar_rect = Rect::new(avatar_x, rect.y, avatar_cols, rows);
        self.render_avatar(view.avatar, view.login, avatar_rect, buf);

        let text_x = avatar_x + avatar_cols + 1;
        let text_w = rect.right().saturating_sub(text_x);
        let bg = if selected { sel_bg } else { Color::Reset };
        let login = truncate_with_ellipsis(view.login, text_w as usize);
        let login_span = Span::styled(
            login,
            Style::default()
                .fg(theme::SECTION_HEADER_FG)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        );
        let badge_spans = vec![
            Span::styled(
                format!(" {} ", view.badge),
                Style::default().fg(Color::White).bg(theme::BADGE_BG),
            ),
            Span::styled(" contributions", Style::default().fg(theme::DIM_TEXT).bg(bg)),
        ];

        if rows >= 2 {
            buf.set_line(text_x, rect.y, &Line::from(login_span), text_w);
            buf.set_line(text_x, rect.y + 1, &Line::from(badge_spans), text_w);
        } else {
            let mut spans = vec![login_span, Span::styled("  ", Style::default().bg(bg))];
            spans.extend(badge_spans);
            buf.set_line(text_x, rect.y, &Line::from(spans), text_w);
        }
    }

    fn render_avatar(&mut self, url: &str, login: &str, rect: Rect, buf: &mut Buf) {
        if self.graphics.is_kitty() {
            if let Some(seq) = self.avatars.encoded(url, rect.width, rect.height) {
                let seq = seq.to_string();
                for y in rect.y..rect.bottom() {
                    for x in rect.x..rect.right() {
                        if let Some(cell) = buf.cell_mut(Position::new(x, y)) {
                            cell.set_skip(true);
                        }
                    }
                }
                if let Some(cell) = buf.cell_mut(Position::new(rect.x, rect.y)) {
                    cell.set_skip(false);
                    cell.set_symbol(&seq);
                }
                return;
            }
        }

        // Initials tile when no image is available
        let color = theme::avatar_color(login);
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                buf[(x, y)].set_symbol(" ").set_style(Style::default().bg(color));
            }
        }
        let initial: String = login
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default();
        let cx = rect.x + rect.width / 2;
        let cy = rect.y + rect.height.saturating_sub(1) / 2;
        buf.set_string(
            cx.min(rect.right().saturating_sub(1)),
            cy,
            initial,
            Style::default()
                .fg(Color::Black)
                .bg(color)
                .add_modifier(Modifier::BOLD),
        );
    }
}

impl<'a> Widget for ContributorPanel<'a> {
    fn render(mut self, area: Rect, buf: &mut Buf) {
        let block = Self::block(self.focused);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 1 || inner.width < 8 {
            return;
        }
        let Some(panel) = self.panel else {
            return;
        };

        if let Some(alert) = panel.find_by_class(ALERT_CLASS) {
            render_alert(alert, inner, buf);
            return;
        }

        if let Some(loading) = panel.find_by_class(LOADING_CLASS) {
            let text = loading.text.as_deref().unwrap_or("");
            buf.set_string(inner.x + 1, inner.y, text, Style::default().fg(theme::DIM_TEXT));
            return;
        }

        let Some(header) = panel.find_by_class("contributor-header") else {
            return;
        };
        let list = items(panel);
        let header_line = Line::from(vec![
            Span::styled(
                header.text.clone().unwrap_or_default(),
                Style::default()
                    .fg(theme::SECTION_HEADER_FG)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ),
            Span::styled(
                format!("  {}", list.len()),
                Style::default().fg(theme::DIM_TEXT),
            ),
        ]);
        buf.set_line(inner.x + 1, inner.y, &header_line, inner.width.saturating_sub(1));

        let rows = self.item_rows.max(1);
        let visible = Self::visible_items(inner, rows);
        for (i, li) in list.iter().skip(self.scroll).take(visible).enumerate() {
            let y = inner.y + 1 + i as u16 * rows;
            let rect = Rect::new(inner.x, y, inner.width, rows);
            let selected = self.scroll + i == self.cursor;
            self.render_item(li, rect, selected, buf);
        }
    }
}
