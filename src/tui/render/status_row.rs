use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Focus};
use crate::util::unicode::truncate_to_width;

/// Render the status row (bottom of screen): key hints for the focused part
pub fn render_status_row<S>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let line = if app.show_key_hints {
        let hint = match app.focus {
            Focus::Entry => "Enter add  Tab list  Esc quit",
            Focus::List => "x toggle  d delete  Tab entry  q quit",
        };
        Line::from(Span::styled(
            truncate_to_width(hint, width),
            Style::default().fg(app.theme.dim).bg(bg),
        ))
    } else {
        Line::from(Span::styled(" ".repeat(width), Style::default().bg(bg)))
    };

    frame.render_widget(Paragraph::new(line), area);
}
