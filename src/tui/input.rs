use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::io::storage::TaskStorage;

use super::app::{App, Focus};

/// Handle a key event for whichever part of the menu has focus
pub fn handle_key<S: TaskStorage>(app: &mut App<S>, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }
    match app.focus {
        Focus::Entry => handle_entry(app, key),
        Focus::List => handle_list(app, key),
    }
}

fn handle_entry<S: TaskStorage>(app: &mut App<S>, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_entry(),
        KeyCode::Tab | KeyCode::BackTab => app.toggle_focus(),
        KeyCode::Down => {
            if app.menu.task_count() > 0 {
                app.focus = Focus::List;
                app.cursor = 0;
            }
        }
        KeyCode::Backspace => app.backspace(),
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            app.type_char(c)
        }
        _ => {}
    }
}

fn handle_list<S: TaskStorage>(app: &mut App<S>, key: KeyEvent) {
    match key.code {
        KeyCode::Tab | KeyCode::BackTab => app.toggle_focus(),
        KeyCode::Up | KeyCode::Char('k') => {
            if app.cursor == 0 {
                app.focus = Focus::Entry;
            } else {
                app.move_cursor(-1);
            }
        }
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(1),
        KeyCode::Home | KeyCode::Char('g') => app.cursor = 0,
        KeyCode::End | KeyCode::Char('G') => {
            app.cursor = app.menu.task_count().saturating_sub(1);
        }
        KeyCode::Char(' ') | KeyCode::Char('x') | KeyCode::Enter => app.toggle_selected(),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
        KeyCode::Esc | KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}
