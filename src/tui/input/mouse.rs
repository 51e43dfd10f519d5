use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::ops::drag::DragOutcome;
use crate::ops::nav;
use crate::ops::task_ops::{self, TaskError};
use crate::tui::app::{App, Mode};
use crate::tui::render::list_view::{HANDLE_WIDTH, expander_column};

/// Handle a mouse event. Only the list view reacts, and only in navigate mode.
pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.mode != Mode::Navigate {
        return;
    }
    // Cell centre, so a pointer on a row sits halfway between its edges
    let x = mouse.column as f64 + 0.5;
    let y = mouse.row as f64 + 0.5;

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => press(app, mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => {
            let list = app.doc.list(app.active);
            app.drag.pointer_moved(x, y, list, &app.rows);
        }
        MouseEventKind::Up(MouseButton::Left) => release(app),
        MouseEventKind::ScrollDown => {
            nav::focus_next(app.list_mut());
        }
        MouseEventKind::ScrollUp => {
            nav::focus_prev(app.list_mut());
        }
        _ => {}
    }
}

fn press(app: &mut App, column: u16, row: u16) {
    let Some(id) = app.row_at(row) else {
        return;
    };
    app.message = None;
    task_ops::set_focus(app.list_mut(), Some(id));

    let area_x = app.list_area.x;
    if column < area_x + HANDLE_WIDTH {
        app.drag.start(id);
        return;
    }

    let depth = app.list().depth(id);
    if column == expander_column(area_x, depth) && app.list().has_children(id) {
        let expand = app.list().visible_task(id).is_some_and(|t| !t.expand);
        let result = task_ops::toggle_expand(app.list_mut(), id, expand);
        app.apply(result);
    }
}

fn release(app: &mut App) {
    let outcome = app.drag.finish(app.doc.list_mut(app.active));
    match outcome {
        DragOutcome::NotDragging | DragOutcome::NoTarget => {}
        DragOutcome::Moved { task, .. } => {
            task_ops::set_focus(app.list_mut(), Some(task));
            app.mark_dirty();
        }
        // Dropped back where it started
        DragOutcome::Rejected(TaskError::InvalidMove { task, target }) if task == target => {}
        // The dragged or target task went away mid-drag
        DragOutcome::Rejected(TaskError::NotFound(_)) => {}
        DragOutcome::Rejected(e) => app.message = Some(e.to_string()),
    }
}
