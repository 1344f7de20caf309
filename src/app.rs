use crate::avatar_cache::AvatarCache;
use crate::config::Config;
use crate::error::FetchError;
use crate::event::AppEvent;
use crate::github::types::{Contributor, Repository};
use crate::selection::Selection;
use crate::terminal_graphics::GraphicsCapability;
use crate::ui::{
    contributor_panel::{self, ContributorPanel, ContributorRequest},
    detail_panel::{render_repo_details, DetailPanel},
    header_bar::{render_header, sync_control, HeaderBar},
    help_panel::HelpPanel,
    input::{self, Action},
    node::{create_alert, create_and_append, Node, NodeKind, ALERT_CLASS},
    render_alert,
    repo_list::RepoList,
    status_bar::StatusBar,
    theme,
    toast::{Notification, NotifyLevel, Toast},
    CONTRIBUTORS_ID, REPO_DETAIL_ID,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::time::Instant;

const PAGE_STEP: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Loading,
    ListError,
    ListReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContributorsState {
    Idle,
    Loading,
    Ready(usize),
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Repositories,
    Contributors,
}

impl Focus {
    fn label(self) -> &'static str {
        match self {
            Focus::Repositories => "repositories",
            Focus::Contributors => "contributors",
        }
    }
}

/// Side effects the event loop performs on the app's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchContributors(ContributorRequest),
    FetchAvatar(String),
    Open(String),
}

#[derive(Debug, Default, Clone, Copy)]
struct Regions {
    repo_list: Rect,
    contributors: Rect,
}

pub struct App {
    pub config: Config,
    pub root: Node,
    pub repos: Vec<Repository>,
    pub selection: Selection,
    pub page: PageState,
    pub contributors_state: ContributorsState,

    pub focus: Focus,
    pub repo_scroll: usize,
    pub contributor_cursor: usize,
    pub contributor_scroll: usize,
    pub show_help: bool,
    pub notification: Option<Notification>,

    pub graphics: GraphicsCapability,
    pub avatars: AvatarCache,

    pub should_quit: bool,
    commands: Vec<Command>,
    regions: Regions,
}

impl App {
    pub fn new(config: Config, graphics: GraphicsCapability) -> Self {
        Self {
            config,
            root: Node::with_options(NodeKind::Root, &[("id", "root")]),
            repos: Vec::new(),
            selection: Selection::default(),
            page: PageState::Loading,
            contributors_state: ContributorsState::Idle,
            focus: Focus::Repositories,
            repo_scroll: 0,
            contributor_cursor: 0,
            contributor_scroll: 0,
            show_help: false,
            notification: None,
            graphics,
            avatars: AvatarCache::new(),
            should_quit: false,
            commands: Vec::new(),
            regions: Regions::default(),
        }
    }

    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn notify(&mut self, message: impl Into<String>, level: NotifyLevel) {
        self.notification = Some(Notification::new(message, level));
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_action(input::map_key(key)),
            AppEvent::Mouse(mouse) => self.handle_action(input::map_mouse(mouse)),
            AppEvent::Resize => {
                self.graphics.redetect_cell_size();
                self.avatars.clear_placements();
            }
            AppEvent::Tick => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|n| n.expired(Instant::now()))
                {
                    self.notification = None;
                }
            }
            AppEvent::ReposLoaded(result) => self.on_repos_loaded(result),
            AppEvent::ContributorsLoaded { token, result } => {
                self.on_contributors_loaded(token, result)
            }
            AppEvent::AvatarLoaded { url, png } => self.avatars.store(&url, png),
        }
    }

    pub fn on_repos_loaded(&mut self, result: Result<Vec<Repository>, FetchError>) {
        match result {
            Ok(repos) => self.render_content(repos),
            Err(e) => {
                tracing::error!(error = %e, "repository list fetch failed");
                self.root.clear();
                create_alert(&mut self.root, &e.to_string());
                self.page = PageState::ListError;
            }
        }
    }

    /// Header, the two content panels, and the initial render for the first
    /// repository in list order.
    fn render_content(&mut self, repos: Vec<Repository>) {
        self.repos = repos;
        self.root.clear();
        if let Some(first) = self.repos.first() {
            self.selection.choose(first.id);
        }

        render_header(&mut self.root, &self.repos, &self.selection);
        let content = create_and_append(NodeKind::Div, &mut self.root, &[("class", "content")]);
        create_and_append(
            NodeKind::Div,
            content,
            &[("class", "left-div whiteframe"), ("id", REPO_DETAIL_ID)],
        );
        create_and_append(
            NodeKind::Div,
            content,
            &[("class", "right-div whiteframe"), ("id", CONTRIBUTORS_ID)],
        );

        self.page = PageState::ListReady;
        self.refresh_panels();
    }

    /// Change handler of the selection control: rebuild both panels for the
    /// current selection.
    fn refresh_panels(&mut self) {
        if let Some(control) = self.root.find_by_class_mut("repository-list") {
            sync_control(control, &self.selection);
        }
        if let Some(panel) = self.root.find_by_id_mut(REPO_DETAIL_ID) {
            render_repo_details(panel, &self.repos, &self.selection);
        }
        self.refresh_contributors();
    }

    fn refresh_contributors(&mut self) {
        self.contributor_cursor = 0;
        self.contributor_scroll = 0;
        self.avatars.clear();

        let Some(panel) = self.root.find_by_id_mut(CONTRIBUTORS_ID) else {
            return;
        };
        match contributor_panel::begin_contributors(panel, &self.repos, &self.selection) {
            Some(request) => {
                tracing::info!(url = %request.url, token = request.token, "fetching contributors");
                self.contributors_state = ContributorsState::Loading;
                self.commands.push(Command::FetchContributors(request));
            }
            None => self.contributors_state = ContributorsState::Idle,
        }
    }

    pub fn select_index(&mut self, index: usize) {
        let Some(repo) = self.repos.get(index) else {
            return;
        };
        if self.selection.repo_id() == Some(repo.id) {
            return;
        }
        tracing::debug!(repo = %repo.name, "selection changed");
        self.selection.choose(repo.id);
        self.refresh_panels();
    }

    pub fn on_contributors_loaded(
        &mut self,
        token: u64,
        result: Result<Vec<Contributor>, FetchError>,
    ) {
        if !self.selection.is_current(token) {
            tracing::debug!(token, current = self.selection.token(), "dropping stale contributors");
            return;
        }
        let Some(panel) = self.root.find_by_id_mut(CONTRIBUTORS_ID) else {
            return;
        };

        contributor_panel::apply_contributors(panel, &result, self.config.avatar_rows);
        match &result {
            Ok(list) => {
                tracing::info!(count = list.len(), "contributors loaded");
                self.contributors_state = ContributorsState::Ready(list.len());
            }
            Err(e) => {
                tracing::warn!(error = %e, "contributors fetch failed");
                self.contributors_state = ContributorsState::Error;
            }
        }

        if self.config.show_avatars && self.graphics.is_kitty() {
            for url in contributor_panel::avatar_urls(panel) {
                if self.avatars.request(&url) {
                    self.commands.push(Command::FetchAvatar(url));
                }
            }
        }
    }

    pub fn control(&self) -> Option<&Node> {
        self.root.find_kind(NodeKind::Select)
    }

    pub fn detail_panel(&self) -> Option<&Node> {
        self.root.find_by_id(REPO_DETAIL_ID)
    }

    pub fn contributors_panel(&self) -> Option<&Node> {
        self.root.find_by_id(CONTRIBUTORS_ID)
    }

    fn contributor_count(&self) -> usize {
        self.contributors_panel()
            .map(|p| contributor_panel::items(p).len())
            .unwrap_or(0)
    }

    fn open_contributor(&mut self, index: usize) {
        let href = self
            .contributors_panel()
            .and_then(|p| contributor_panel::item_href(p, index))
            .map(String::from);
        if let Some(href) = href.filter(|h| !h.is_empty()) {
            self.commands.push(Command::Open(href));
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.repos.len();
        if len == 0 {
            return;
        }
        let current = self.selection.index_in(&self.repos).unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(len - 1);
        self.select_index(next);
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.contributor_count();
        if len == 0 {
            return;
        }
        self.contributor_cursor = self
            .contributor_cursor
            .saturating_add_signed(delta)
            .min(len - 1);
    }

    fn move_focused(&mut self, delta: isize) {
        match self.focus {
            Focus::Repositories => self.move_selection(delta),
            Focus::Contributors => self.move_cursor(delta),
        }
    }

    pub fn handle_action(&mut self, action: Action) {
        if self.show_help {
            match action {
                Action::Help | Action::ClosePopup => self.show_help = false,
                Action::Quit => self.should_quit = true,
                _ => {}
            }
            return;
        }

        match action {
            Action::Quit => self.should_quit = true,
            Action::ScrollDown => self.move_focused(1),
            Action::ScrollUp => self.move_focused(-1),
            Action::PageDown => self.move_focused(PAGE_STEP as isize),
            Action::PageUp => self.move_focused(-(PAGE_STEP as isize)),
            Action::Top => self.move_focused(isize::MIN),
            Action::Bottom => self.move_focused(isize::MAX),
            Action::NextPanel | Action::PrevPanel => {
                self.focus = match self.focus {
                    Focus::Repositories => Focus::Contributors,
                    Focus::Contributors => Focus::Repositories,
                };
            }
            Action::Activate => {
                if self.focus == Focus::Contributors {
                    self.open_contributor(self.contributor_cursor);
                }
            }
            Action::OpenRepository => {
                if let Some(repo) = self.selection.active(&self.repos) {
                    self.commands.push(Command::Open(repo.html_url.clone()));
                }
            }
            Action::Reload => {
                if self.page == PageState::ListReady {
                    self.selection.bump();
                    self.refresh_contributors();
                }
            }
            Action::Help => self.show_help = true,
            Action::ClosePopup => self.notification = None,
            Action::Click { column, row } => self.handle_click(column, row),
            Action::None => {}
        }
    }

    fn handle_click(&mut self, column: u16, row: u16) {
        let pos = Position::new(column, row);
        let regions = self.regions;

        if regions.repo_list.contains(pos) {
            self.focus = Focus::Repositories;
            let inner = Block::default().borders(Borders::ALL).inner(regions.repo_list);
            if inner.contains(pos) {
                self.select_index(self.repo_scroll + (row - inner.y) as usize);
            }
        } else if regions.contributors.contains(pos) {
            self.focus = Focus::Contributors;
            let hit = ContributorPanel::item_at(
                regions.contributors,
                self.contributor_scroll,
                self.config.avatar_rows,
                row,
            );
            if let Some(index) = hit.filter(|i| *i < self.contributor_count()) {
                self.contributor_cursor = index;
                self.open_contributor(index);
            }
        }
    }

    fn status_text(&self) -> (&'static str, String) {
        let state = match self.page {
            PageState::Loading => "loading",
            PageState::ListError => "error",
            PageState::ListReady => "ready",
        };
        let contributors = match self.contributors_state {
            ContributorsState::Idle => String::new(),
            ContributorsState::Loading => "loading contributors".to_string(),
            ContributorsState::Ready(n) => format!("{n} contributors"),
            ContributorsState::Error => "contributors unavailable".to_string(),
        };
        (state, contributors)
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(size);

        let selected_label = self.selection.active(&self.repos).map(|r| r.name.as_str());
        let position = self
            .selection
            .index_in(&self.repos)
            .map(|i| (i, self.repos.len()));
        frame.render_widget(
            HeaderBar {
                header: self.root.find_by_class("header"),
                org: &self.config.org,
                selected_label,
                position,
            },
            main_chunks[0],
        );

        match self.page {
            PageState::Loading => {
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme::BORDER_COLOR));
                frame.render_widget(
                    Paragraph::new(" Loading repositories\u{2026}")
                        .style(Style::default().fg(theme::DIM_TEXT))
                        .block(block),
                    main_chunks[1],
                );
            }
            PageState::ListError => {
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme::BORDER_COLOR));
                let inner = block.inner(main_chunks[1]);
                frame.render_widget(block, main_chunks[1]);
                if let Some(alert) = self.root.find_by_class(ALERT_CLASS) {
                    render_alert(alert, inner, frame.buffer_mut());
                }
            }
            PageState::ListReady => self.render_body(frame, main_chunks[1]),
        }

        let (state, contributors) = self.status_text();
        frame.render_widget(
            StatusBar {
                state,
                repo_count: (self.page == PageState::ListReady).then_some(self.repos.len()),
                contributors: &contributors,
                focus: self.focus.label(),
            },
            main_chunks[2],
        );

        if let Some(ref n) = self.notification {
            frame.render_widget(Toast { notification: n }, size);
        }
        if self.show_help {
            frame.render_widget(HelpPanel, size);
        }
    }

    fn render_body(&mut self, frame: &mut Frame, area: Rect) {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(28), Constraint::Min(1)])
            .split(area);
        let content = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(body[1]);

        self.regions = Regions {
            repo_list: body[0],
            contributors: content[1],
        };

        let list_visible = body[0].height.saturating_sub(2) as usize;
        if let Some(selected) = self.selection.index_in(&self.repos) {
            self.repo_scroll = RepoList::clamp_scroll(self.repo_scroll, selected, list_visible);
        }
        frame.render_widget(
            RepoList {
                control: self.control(),
                scroll: self.repo_scroll,
                focused: self.focus == Focus::Repositories,
            },
            body[0],
        );

        frame.render_widget(
            DetailPanel {
                panel: self.detail_panel(),
            },
            content[0],
        );

        let rows = self.config.avatar_rows.max(1);
        let inner = ContributorPanel::block(false).inner(content[1]);
        let visible = ContributorPanel::visible_items(inner, rows);
        let scroll = RepoList::clamp_scroll(self.contributor_scroll, self.contributor_cursor, visible);
        if scroll != self.contributor_scroll {
            self.contributor_scroll = scroll;
            // placements from the previous scroll position would linger
            self.avatars.clear_placements();
        }
        frame.render_widget(
            ContributorPanel {
                panel: self.root.find_by_id(CONTRIBUTORS_ID),
                cursor: self.contributor_cursor,
                scroll: self.contributor_scroll,
                focused: self.focus == Focus::Contributors,
                item_rows: rows,
                graphics: self.graphics,
                avatars: &mut self.avatars,
            },
            content[1],
        );
    }
}
