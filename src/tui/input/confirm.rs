use crossterm::event::{KeyCode, KeyEvent};

use crate::ops::task_ops;
use crate::tui::app::{App, Mode, PendingAction};

use super::navigate::delete;

/// y runs the pending action; n or Esc drops it
pub(super) fn handle_confirm(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            let pending = app.pending.take();
            app.mode = Mode::Navigate;
            match pending {
                Some(PendingAction::Delete(id)) => delete(app, id),
                Some(PendingAction::Complete(id)) => {
                    let result = task_ops::toggle_completed(app.list_mut(), id, true);
                    app.apply(result);
                }
                None => {}
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending = None;
            app.mode = Mode::Navigate;
        }
        _ => {}
    }
}
