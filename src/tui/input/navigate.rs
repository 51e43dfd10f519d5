use crossterm::event::{KeyCode, KeyEvent};

use crate::model::list::ListKind;
use crate::model::task::TaskId;
use crate::ops::nav;
use crate::ops::task_ops::{self, InsertPosition};
use crate::tui::app::{App, Mode, PendingAction};

use super::edit::begin_edit;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    app.message = None;

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Esc => {}

        // Focus
        KeyCode::Char('j') | KeyCode::Down => {
            nav::focus_next(app.list_mut());
        }
        KeyCode::Char('k') | KeyCode::Up => {
            nav::focus_prev(app.list_mut());
        }

        // Expand / collapse
        KeyCode::Left | KeyCode::Char('h') => collapse_or_parent(app),
        KeyCode::Right | KeyCode::Char('l') => {
            if let Some(id) = app.list().focus_id {
                let result = task_ops::toggle_expand(app.list_mut(), id, true);
                app.apply(result);
            }
        }

        KeyCode::Char(' ') => toggle_done(app),

        // Creation
        KeyCode::Enter => add_sibling(app),
        KeyCode::Char('a') => {
            let result = task_ops::add_task(
                app.list_mut(),
                String::new(),
                None,
                InsertPosition::Bottom,
                true,
            );
            if let Some(id) = app.apply(result) {
                begin_edit(app, id, true);
            }
        }
        KeyCode::Char('s') => {
            if let Some(parent) = app.focused().map(|t| t.id) {
                let result = task_ops::add_task(
                    app.list_mut(),
                    String::new(),
                    Some(parent),
                    InsertPosition::Bottom,
                    true,
                );
                if let Some(id) = app.apply(result) {
                    begin_edit(app, id, true);
                }
            }
        }
        KeyCode::Char('e') => {
            if let Some(id) = app.focused().map(|t| t.id) {
                begin_edit(app, id, false);
            }
        }

        KeyCode::Char('d') => {
            if let Some(id) = app.focused().map(|t| t.id) {
                if nav::needs_delete_confirm(app.list()) {
                    app.pending = Some(PendingAction::Delete(id));
                    app.mode = Mode::Confirm;
                } else {
                    delete(app, id);
                }
            }
        }

        KeyCode::Char('p') => promote(app),
        KeyCode::Tab => app.switch_list(),
        _ => {}
    }
}

/// Collapse the focused task, or step out to its parent when there is
/// nothing to collapse
fn collapse_or_parent(app: &mut App) {
    let Some(task) = app.focused() else {
        return;
    };
    let id = task.id;
    let parent = task.parent;
    let collapsible = task.expand && app.list().has_children(id);
    if collapsible {
        let result = task_ops::toggle_expand(app.list_mut(), id, false);
        app.apply(result);
    } else if parent.is_some() {
        task_ops::set_focus(app.list_mut(), parent);
    }
}

fn toggle_done(app: &mut App) {
    let Some(task) = app.focused() else {
        return;
    };
    let id = task.id;
    let checked = !task.completed;
    if checked && nav::needs_completion_confirm(app.list(), id) {
        app.pending = Some(PendingAction::Complete(id));
        app.mode = Mode::Confirm;
        return;
    }
    let result = task_ops::toggle_completed(app.list_mut(), id, checked);
    app.apply(result);
}

/// Enter: a new empty task right after the focused one, same parent
fn add_sibling(app: &mut App) {
    let (parent, position) = match app.focused() {
        Some(task) => (task.parent, InsertPosition::After(task.id)),
        None => (None, InsertPosition::Bottom),
    };
    let result = task_ops::add_task(app.list_mut(), String::new(), parent, position, true);
    if let Some(id) = app.apply(result) {
        begin_edit(app, id, true);
    }
}

pub(super) fn delete(app: &mut App, id: TaskId) {
    let result = task_ops::remove_task(app.list_mut(), id);
    if let Some(removed) = app.apply(result)
        && removed.len() > 1
    {
        app.message = Some(format!("deleted {} tasks", removed.len()));
    }
}

fn promote(app: &mut App) {
    if app.active != ListKind::Library {
        return;
    }
    let Some(id) = app.focused().map(|t| t.id) else {
        return;
    };
    let (library, todo) = app.doc.pair_mut(ListKind::Library);
    let result = task_ops::batch_copy_subtree(library, todo, id);
    if let Some(ids) = app.apply(result) {
        app.message = Some(format!("copied {} task(s) to Todo", ids.len()));
    }
}
