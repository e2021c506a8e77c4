use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::io::storage::TaskStorage;
use crate::tui::app::{App, Focus};
use crate::tui::menu::{MenuItem, TaskRow};
use crate::util::unicode::{display_width, tail_to_width, truncate_to_width};

const PLACEHOLDER: &str = "Add a new task...";
const DELETE_MARKER: &str = "\u{2715}"; // ✕

/// Render the menu items. Fixed rows (header, entry, footer) always show;
/// the task rows scroll to keep the selection visible.
pub fn render_menu<S: TaskStorage>(frame: &mut Frame, app: &mut App<S>, area: Rect) {
    let width = area.width as usize;
    let (head_len, tail_len) = {
        let items = app.menu.items();
        let first = items.iter().position(|i| matches!(i, MenuItem::Task(_)));
        let last = items.iter().rposition(|i| matches!(i, MenuItem::Task(_)));
        match (first, last) {
            (Some(first), Some(last)) => (first, items.len() - last - 1),
            _ => (items.len(), 0),
        }
    };

    let visible = (area.height as usize).saturating_sub(head_len + tail_len);
    app.scroll_into_view(visible);

    let items = app.menu.items();
    let mut lines: Vec<Line> = Vec::with_capacity(area.height as usize);
    for item in &items[..head_len] {
        lines.push(fixed_line(app, item, width));
    }
    for (index, row) in app
        .menu
        .task_rows()
        .enumerate()
        .skip(app.scroll)
        .take(visible)
    {
        lines.push(task_line(app, row, index, width));
    }
    for item in &items[items.len() - tail_len..] {
        lines.push(fixed_line(app, item, width));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn fixed_line<'a, S>(app: &App<S>, item: &MenuItem, width: usize) -> Line<'a> {
    let bg = app.theme.background;
    match item {
        MenuItem::Header => Line::from(Span::styled(
            truncate_to_width(&app.menu.summary().tooltip(), width),
            Style::default()
                .fg(app.theme.highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        )),
        MenuItem::Separator | MenuItem::TaskDivider | MenuItem::FooterDivider => Line::from(
            Span::styled("\u{2500}".repeat(width), Style::default().fg(app.theme.dim).bg(bg)),
        ),
        MenuItem::Entry => entry_line(app, width),
        MenuItem::Footer => Line::from(Span::styled(
            app.menu.footer_text(),
            Style::default().fg(app.theme.dim).bg(bg),
        )),
        // task rows are drawn by `task_line`
        MenuItem::Task(_) => Line::default(),
    }
}

fn entry_line<'a, S>(app: &App<S>, width: usize) -> Line<'a> {
    let bg = app.theme.background;
    let focused = app.focus == Focus::Entry;
    let prompt_color = if focused {
        app.theme.highlight
    } else {
        app.theme.dim
    };
    let mut spans = vec![Span::styled("> ", Style::default().fg(prompt_color).bg(bg))];

    // keep the end of a long entry in view
    let room = width.saturating_sub(3);
    let text = tail_to_width(&app.entry, room).to_string();
    spans.push(Span::styled(
        text,
        Style::default().fg(app.theme.text_bright).bg(bg),
    ));
    if focused {
        spans.push(Span::styled(
            "\u{258C}", // ▌
            Style::default().fg(app.theme.highlight).bg(bg),
        ));
    }
    if app.entry.is_empty() {
        spans.push(Span::styled(
            truncate_to_width(PLACEHOLDER, room),
            Style::default()
                .fg(app.theme.dim)
                .bg(bg)
                .add_modifier(Modifier::ITALIC),
        ));
    }
    Line::from(spans)
}

fn task_line<'a, S>(app: &App<S>, row: &TaskRow, index: usize, width: usize) -> Line<'a> {
    let selected = app.focus == Focus::List && index == app.cursor;
    let bg = if selected {
        app.theme.selection_bg
    } else if row.flash > 0 {
        app.theme.flash_bg
    } else {
        app.theme.background
    };

    let (checkbox, checkbox_color) = if row.task.completed {
        ("[x] ", app.theme.green)
    } else {
        ("[ ] ", app.theme.text)
    };
    let text_style = if row.task.completed {
        Style::default()
            .fg(app.theme.dim)
            .bg(bg)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(app.theme.text_bright).bg(bg)
    };

    // checkbox, text, gap, marker
    let room = width.saturating_sub(checkbox.len() + 2);
    let text = truncate_to_width(&row.task.text, room);
    let pad = room.saturating_sub(display_width(&text));
    let marker_color = if selected {
        app.theme.red
    } else {
        app.theme.dim
    };

    Line::from(vec![
        Span::styled(checkbox, Style::default().fg(checkbox_color).bg(bg)),
        Span::styled(text, text_style),
        Span::styled(" ".repeat(pad + 1), Style::default().bg(bg)),
        Span::styled(DELETE_MARKER, Style::default().fg(marker_color).bg(bg)),
    ])
}
