use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::storage::TaskStorage;
use crate::model::UiConfig;
use crate::ops::store::TaskStore;
use crate::ops::sync::{Dispatch, Session};
use crate::util::unicode::prev_grapheme_boundary;

use super::input;
use super::menu::Menu;
use super::render;
use super::theme::Theme;

/// Where keystrokes go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// The "add a new task" input
    Entry,
    /// The task rows
    List,
}

/// Main application state
pub struct App<S> {
    pub session: Session<S>,
    pub menu: Menu,
    pub focus: Focus,
    /// Text typed into the entry so far
    pub entry: String,
    /// Selected task row
    pub cursor: usize,
    /// First visible task row
    pub scroll: usize,
    pub should_quit: bool,
    pub theme: Theme,
    pub show_key_hints: bool,
}

impl<S: TaskStorage> App<S> {
    pub fn new(store: TaskStore<S>, ui: &UiConfig) -> Self {
        let mut session = Session::new(store);
        let mut menu = Menu::new();
        menu.apply(session.start());
        App {
            session,
            menu,
            focus: Focus::Entry,
            entry: String::new(),
            cursor: 0,
            scroll: 0,
            should_quit: false,
            theme: Theme::from_config(ui),
            show_key_hints: ui.show_key_hints,
        }
    }

    pub fn selected_task_id(&self) -> Option<u64> {
        self.menu.row(self.cursor).map(|r| r.task.id)
    }

    /// Patch the menu. While the list has focus the selection follows its
    /// row through reorders and inserts; when the row itself goes away the
    /// cursor stays put.
    pub fn apply(&mut self, dispatch: Dispatch) {
        let selected = match self.focus {
            Focus::List => self.menu.row(self.cursor).map(|r| r.widget),
            Focus::Entry => None,
        };
        self.menu.apply(dispatch);
        if let Some(index) = selected.and_then(|w| self.menu.widget_index(w)) {
            self.cursor = index;
        }
        self.clamp_cursor();
    }

    /// Add the entry text as a task. Blank text is left in place untouched.
    pub fn submit_entry(&mut self) {
        if let Some(dispatch) = self.session.add(&self.entry) {
            self.entry.clear();
            self.apply(dispatch);
        }
    }

    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_task_id()
            && let Some(dispatch) = self.session.toggle(id)
        {
            self.apply(dispatch);
        }
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected_task_id()
            && let Some(dispatch) = self.session.delete(id)
        {
            self.apply(dispatch);
        }
    }

    pub fn type_char(&mut self, c: char) {
        self.entry.push(c);
    }

    /// Remove the last grapheme cluster from the entry.
    pub fn backspace(&mut self) {
        if let Some(at) = prev_grapheme_boundary(&self.entry, self.entry.len()) {
            self.entry.truncate(at);
        }
    }

    /// Switch focus between entry and list. An empty list keeps the entry.
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Entry if self.menu.task_count() > 0 => Focus::List,
            _ => Focus::Entry,
        };
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let count = self.menu.task_count();
        if count == 0 {
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(count - 1);
    }

    pub fn tick(&mut self) {
        self.menu.tick();
    }

    /// Keep `cursor` within `height` visible rows.
    pub fn scroll_into_view(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if self.cursor >= self.scroll + height {
            self.scroll = self.cursor + 1 - height;
        }
        let max_scroll = self.menu.task_count().saturating_sub(height);
        self.scroll = self.scroll.min(max_scroll);
    }

    fn clamp_cursor(&mut self) {
        let count = self.menu.task_count();
        if count == 0 {
            self.cursor = 0;
            self.focus = Focus::Entry;
        } else {
            self.cursor = self.cursor.min(count - 1);
        }
    }
}

/// Run the terminal menu over `store` until the user quits.
pub fn run<S: TaskStorage>(
    store: TaskStore<S>,
    ui: &UiConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(store, ui);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Restore the terminal if something panics mid-frame
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    app.session.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop<S: TaskStorage>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<S>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                input::handle_key(app, key);
            }
        } else {
            app.tick();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
