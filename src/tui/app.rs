use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
    KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;

use crate::io::config_io::open_workspace;
use crate::io::document_io::{Document, read_document};
use crate::io::persist::DebouncedWriter;
use crate::model::config::AppConfig;
use crate::model::list::{ListKind, TaskList};
use crate::model::task::{Task, TaskId};
use crate::ops::drag::{DragSession, RowGeometry};
use crate::ops::task_ops::TaskError;

use super::input;
use super::render;
use super::theme::Theme;

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Editing a task title inline
    Edit,
    /// Waiting for y/n on a pending action
    Confirm,
}

/// An action that waits for confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    Delete(TaskId),
    Complete(TaskId),
}

/// Inline title editor state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub target: TaskId,
    pub buffer: String,
    /// Byte offset into `buffer`, always on a grapheme boundary
    pub cursor: usize,
    /// The task was created for this edit; cancelling removes it
    pub is_new: bool,
}

/// Main application state
pub struct App {
    pub doc: Document,
    pub active: ListKind,
    pub mode: Mode,
    pub edit: Option<EditState>,
    pub pending: Option<PendingAction>,
    pub drag: DragSession,
    /// Geometry of the rows drawn in the last frame
    pub rows: HashMap<TaskId, RowGeometry>,
    /// Where the task rows were drawn in the last frame
    pub list_area: Rect,
    /// First display row shown in the list area
    pub scroll_offset: usize,
    /// One-shot status message, cleared on the next key press
    pub message: Option<String>,
    pub theme: Theme,
    pub show_key_hints: bool,
    pub should_quit: bool,
    /// Absent in tests, where nothing is written to disk
    pub writer: Option<DebouncedWriter>,
}

impl App {
    pub fn new(doc: Document, config: &AppConfig) -> Self {
        App {
            doc,
            active: ListKind::Todo,
            mode: Mode::Navigate,
            edit: None,
            pending: None,
            drag: DragSession::new(),
            rows: HashMap::new(),
            list_area: Rect::default(),
            scroll_offset: 0,
            message: None,
            theme: Theme::from_config(&config.ui),
            show_key_hints: config.ui.show_key_hints,
            should_quit: false,
            writer: None,
        }
    }

    pub fn list(&self) -> &TaskList {
        self.doc.list(self.active)
    }

    pub fn list_mut(&mut self) -> &mut TaskList {
        self.doc.list_mut(self.active)
    }

    /// The focused task, if it is visible
    pub fn focused(&self) -> Option<&Task> {
        let list = self.list();
        list.focus_id.and_then(|id| list.visible_task(id))
    }

    /// Record that the document changed
    pub fn mark_dirty(&mut self) {
        if let Some(w) = &mut self.writer {
            w.mark_dirty(Instant::now());
        }
    }

    /// Fold an operation result into the UI: success marks the document
    /// dirty, a missing id is a silent no-op, anything else is shown.
    pub fn apply<T>(&mut self, result: Result<T, TaskError>) -> Option<T> {
        match result {
            Ok(v) => {
                self.mark_dirty();
                Some(v)
            }
            Err(TaskError::NotFound(_)) => None,
            Err(e) => {
                self.message = Some(e.to_string());
                None
            }
        }
    }

    /// Switch between the todo list and the library
    pub fn switch_list(&mut self) {
        self.drag.cancel();
        self.active = self.active.other();
        self.scroll_offset = 0;
        self.rows.clear();
    }

    /// Write pending changes now
    pub fn flush(&mut self) {
        if let Some(w) = &mut self.writer
            && let Err(e) = w.flush(&self.doc)
        {
            self.message = Some(format!("save failed: {}", e));
        }
    }

    /// Write if the quiet window has passed
    pub fn tick(&mut self) {
        if let Some(w) = &mut self.writer
            && let Err(e) = w.poll(Instant::now(), &self.doc)
        {
            self.message = Some(format!("save failed: {}", e));
        }
    }

    /// Task id of the row drawn at screen line `y`
    pub fn row_at(&self, y: u16) -> Option<TaskId> {
        let y = y as f64;
        self.rows
            .iter()
            .find(|(_, g)| y >= g.top && y < g.bottom)
            .map(|(id, _)| *id)
    }
}

/// Run the TUI application
pub fn run(start: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = open_workspace(start)?;
    let path = workspace.document_path();
    let doc = read_document(&workspace.data_dir, &path)?;

    let mut app = App::new(doc, &workspace.config);
    app.writer = Some(DebouncedWriter::new(
        workspace.data_dir.clone(),
        path,
        Duration::from_millis(workspace.config.storage.save_debounce_ms),
    ));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Restore the terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            DisableFocusChange,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    app.flush();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => input::handle_key(app, key),
                Event::Mouse(mouse) => input::handle_mouse(app, mouse),
                Event::FocusLost => input::handle_focus_lost(app),
                _ => {}
            }
        }
        app.tick();

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
