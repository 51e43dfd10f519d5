use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::task::{TaskId, TaskPatch};
use crate::ops::task_ops;
use crate::tui::app::{App, EditState, Mode};
use crate::tui::text::{next_boundary, prev_boundary};

/// Open the inline title editor on a visible task
pub fn begin_edit(app: &mut App, id: TaskId, is_new: bool) {
    let Some(task) = app.list().visible_task(id) else {
        return;
    };
    let buffer = task.title.clone();
    app.edit = Some(EditState {
        target: id,
        cursor: buffer.len(),
        buffer,
        is_new,
    });
    app.mode = Mode::Edit;
}

pub(super) fn handle_edit(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => return commit(app),
        KeyCode::Esc => return cancel(app),
        _ => {}
    }
    let Some(edit) = app.edit.as_mut() else {
        app.mode = Mode::Navigate;
        return;
    };

    match key.code {
        KeyCode::Backspace => {
            if let Some(prev) = prev_boundary(&edit.buffer, edit.cursor) {
                edit.buffer.replace_range(prev..edit.cursor, "");
                edit.cursor = prev;
            }
        }
        KeyCode::Delete => {
            if let Some(next) = next_boundary(&edit.buffer, edit.cursor) {
                edit.buffer.replace_range(edit.cursor..next, "");
            }
        }
        KeyCode::Left => {
            if let Some(prev) = prev_boundary(&edit.buffer, edit.cursor) {
                edit.cursor = prev;
            }
        }
        KeyCode::Right => {
            if let Some(next) = next_boundary(&edit.buffer, edit.cursor) {
                edit.cursor = next;
            }
        }
        KeyCode::Home => edit.cursor = 0,
        KeyCode::End => edit.cursor = edit.buffer.len(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            edit.buffer.replace_range(..edit.cursor, "");
            edit.cursor = 0;
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            edit.buffer.insert(edit.cursor, c);
            edit.cursor += c.len_utf8();
        }
        _ => {}
    }
}

/// Save the buffer as the title. A new task left blank is discarded.
fn commit(app: &mut App) {
    let Some(edit) = app.edit.take() else {
        return;
    };
    app.mode = Mode::Navigate;

    let title = edit.buffer.trim().to_string();
    if title.is_empty() {
        if edit.is_new {
            let result = task_ops::remove_task(app.list_mut(), edit.target);
            app.apply(result);
        }
        return;
    }
    let result = task_ops::update_task(app.list_mut(), edit.target, &TaskPatch::title(title));
    app.apply(result);
}

/// Drop the buffer. A task created for this edit is removed again.
fn cancel(app: &mut App) {
    let Some(edit) = app.edit.take() else {
        return;
    };
    app.mode = Mode::Navigate;
    if edit.is_new {
        let result = task_ops::remove_task(app.list_mut(), edit.target);
        app.apply(result);
    }
}
