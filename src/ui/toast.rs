use crate::ui::theme;
use ratatui::{
    buffer::Buffer as Buf,
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

use super::truncate_with_ellipsis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Error,
    Info,
}

impl NotifyLevel {
    pub fn ttl(&self) -> Duration {
        match self {
            NotifyLevel::Error => Duration::from_secs(8),
            NotifyLevel::Info => Duration::from_secs(3),
        }
    }

    pub fn color(&self) -> Color {
        match self {
            NotifyLevel::Error => theme::ERROR_FG,
            NotifyLevel::Info => theme::ACCENT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotifyLevel,
    pub created: Instant,
}

impl Notification {
    pub fn new(message: impl Into<String>, level: NotifyLevel) -> Self {
        Self {
            message: message.into(),
            level,
            created: Instant::now(),
        }
    }

    pub fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.created) >= self.level.ttl()
    }
}

/// Transient message pinned to the bottom-right corner, above the status bar.
pub struct Toast<'a> {
    pub notification: &'a Notification,
}

impl Toast<'_> {
    fn area(&self, screen: Rect) -> Option<Rect> {
        let message = self.notification.message.lines().next().unwrap_or("");
        let width = (message.width() as u16).saturating_add(4).min(screen.width);
        let height = 3;
        if width < 5 || screen.height < height + 1 {
            return None;
        }
        Some(Rect::new(
            screen.right().saturating_sub(width + 1),
            screen.bottom().saturating_sub(height + 1),
            width,
            height,
        ))
    }
}

impl Widget for Toast<'_> {
    fn render(self, area: Rect, buf: &mut Buf) {
        let Some(rect) = self.area(area) else {
            return;
        };
        let style = Style::default().fg(self.notification.level.color());
        let message = self.notification.message.lines().next().unwrap_or("");
        let inner_width = rect.width.saturating_sub(2) as usize;

        Clear.render(rect, buf);
        Paragraph::new(Line::styled(truncate_with_ellipsis(message, inner_width), style))
            .block(Block::default().borders(Borders::ALL).border_style(style))
            .render(rect, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_outlive_info() {
        let created = Instant::now();
        let err = Notification {
            message: "x".into(),
            level: NotifyLevel::Error,
            created,
        };
        let info = Notification {
            message: "x".into(),
            level: NotifyLevel::Info,
            created,
        };
        let later = created + Duration::from_secs(5);
        assert!(!err.expired(later));
        assert!(info.expired(later));
    }

    #[test]
    fn sits_in_bottom_right_corner() {
        let screen = Rect::new(0, 0, 60, 20);
        let n = Notification::new("could not open browser", NotifyLevel::Error);
        let mut buf = Buf::empty(screen);
        Toast { notification: &n }.render(screen, &mut buf);

        let text = crate::test_utils::buffer_text(&buf);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[17].contains("could not open browser"));
        assert!(lines[17].ends_with("\u{2502} "));
    }
}
