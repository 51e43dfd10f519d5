use crate::model::list::TaskList;
use crate::model::task::TaskId;

use super::hierarchy::{build_tree, collect_ids, strict_descendants};

/// Visible task ids in display (pre-order) order
pub fn display_order(list: &TaskList) -> Vec<TaskId> {
    collect_ids(&build_tree(&list.visible))
}

/// Move focus one row down. With no focus, focuses the first row.
/// Stays put on the last row. Returns the new focus.
pub fn focus_next(list: &mut TaskList) -> Option<TaskId> {
    step_focus(list, 1)
}

/// Move focus one row up. With no focus, focuses the last row.
pub fn focus_prev(list: &mut TaskList) -> Option<TaskId> {
    step_focus(list, -1)
}

fn step_focus(list: &mut TaskList, delta: isize) -> Option<TaskId> {
    let order = display_order(list);
    if order.is_empty() {
        list.focus_id = None;
        return None;
    }
    let current = list
        .focus_id
        .and_then(|id| order.iter().position(|&o| o == id));
    let next = match current {
        None if delta > 0 => 0,
        None => order.len() - 1,
        Some(idx) => idx
            .saturating_add_signed(delta)
            .min(order.len() - 1),
    };
    list.focus_id = Some(order[next]);
    list.focus_id
}

/// Whether any descendant (shown or collapsed) is still incomplete.
/// A corrupt hierarchy answers `true` so callers ask before acting.
pub fn has_incomplete_descendants(list: &TaskList, id: TaskId) -> bool {
    match strict_descendants(id, list.all_tasks()) {
        Ok(ids) => ids
            .iter()
            .any(|d| list.task(*d).is_some_and(|t| !t.completed)),
        Err(_) => true,
    }
}

/// Completing `id` should be confirmed first under the list's preferences
pub fn needs_completion_confirm(list: &TaskList, id: TaskId) -> bool {
    list.preferences.confirm_incomplete_subtasks && has_incomplete_descendants(list, id)
}

/// Deleting should be confirmed first under the list's preferences
pub fn needs_delete_confirm(list: &TaskList) -> bool {
    list.preferences.confirm_before_delete
}
