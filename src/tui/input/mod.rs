mod confirm;
mod edit;
mod mouse;
mod navigate;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Mode};

use confirm::handle_confirm;
use edit::handle_edit;
pub use edit::begin_edit;
pub use mouse::handle_mouse;
use navigate::handle_navigate;

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    // Esc always abandons a drag in progress first
    if key.code == KeyCode::Esc && app.drag.cancel() {
        return;
    }

    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Edit => handle_edit(app, key),
        Mode::Confirm => handle_confirm(app, key),
    }
}

/// The terminal lost focus: a drag can no longer complete
pub fn handle_focus_lost(app: &mut App) {
    if app.drag.cancel() {
        tracing::debug!("drag cancelled on focus loss");
    }
}
