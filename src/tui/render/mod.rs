pub mod menu_view;
pub mod status_row;

#[cfg(test)]
pub(crate) mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use crate::io::storage::TaskStorage;

use super::app::App;

/// Main render function: menu on top, status row at the bottom
pub fn render<S: TaskStorage>(frame: &mut Frame, app: &mut App<S>) {
    let area = frame.area();

    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // menu
            Constraint::Length(1), // status row
        ])
        .split(area);

    menu_view::render_menu(frame, app, chunks[0]);
    status_row::render_status_row(frame, app, chunks[1]);
}
