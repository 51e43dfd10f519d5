use std::collections::{HashMap, HashSet};

use chrono::Utc;

use crate::model::list::{PreferencesPatch, TaskList};
use crate::model::task::{Task, TaskId, TaskPatch};

use super::hierarchy::{descendant_closure, strict_descendants};

/// Error type for task operations.
///
/// Every operation checks its inputs before touching the list, so an `Err`
/// always means the list is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(TaskId),
    #[error("cannot move task {task} under its own descendant {target}")]
    InvalidMove { task: TaskId, target: TaskId },
    #[error("task hierarchy is corrupt: task {0} is its own ancestor")]
    CorruptHierarchy(TaskId),
}

/// Where a moved task lands relative to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveEdge {
    /// Directly after the target, sharing its parent
    Sibling,
    /// Directly after the target, as its child
    Child,
}

/// Where to insert a new task in the visible collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    /// Append to the end
    Bottom,
    /// Insert right after this visible task (falls back to the end if it is not visible)
    After(TaskId),
}

/// Milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

// ---------------------------------------------------------------------------
// Task CRUD
// ---------------------------------------------------------------------------

/// Add a task and return its id.
///
/// A child of a collapsed parent expands the parent first so the new task
/// is visible. A parent that is itself inside a collapsed subtree keeps the
/// new task hidden alongside it.
pub fn add_task(
    list: &mut TaskList,
    title: String,
    parent: Option<TaskId>,
    position: InsertPosition,
    focus: bool,
) -> Result<TaskId, TaskError> {
    let parent_hidden = match parent {
        Some(parent_id) if list.is_visible(parent_id) => false,
        Some(parent_id) if list.contains(parent_id) => true,
        Some(parent_id) => return Err(TaskError::NotFound(parent_id)),
        None => false,
    };

    let now = now_millis();
    let id = list.next_id();
    let mut task = Task::new(id, title, now);
    task.parent = parent;
    task.priority = list.preferences.default_priority;
    if let Some(tag) = &list.preferences.default_tag {
        task.tags = vec![tag.clone()];
    }

    if let Some(parent_id) = parent {
        if parent_hidden {
            if let Some(p) = list.hidden.iter_mut().find(|t| t.id == parent_id) {
                p.expand = true;
            }
        } else {
            expand_in_place(list, parent_id)?;
        }
    }

    if parent_hidden {
        task.hidden = true;
        list.hidden.push(task);
    } else {
        let after_idx = match position {
            InsertPosition::After(after_id) => list.visible.iter().position(|t| t.id == after_id),
            InsertPosition::Bottom => None,
        };
        match after_idx {
            Some(idx) => list.visible.insert(idx + 1, task),
            None => list.visible.push(task),
        }
    }
    list.last_id = list.last_id.max(id);

    if focus {
        list.focus_id = Some(id);
    }
    tracing::debug!(id, ?parent, "added task");
    Ok(id)
}

/// Merge `patch` into a visible task. Collapsed tasks are not editable.
pub fn update_task(list: &mut TaskList, id: TaskId, patch: &TaskPatch) -> Result<(), TaskError> {
    let task = list.visible_task_mut(id).ok_or(TaskError::NotFound(id))?;
    patch.apply(task);
    task.touch(now_millis());
    tracing::debug!(id, "updated task");
    Ok(())
}

/// Remove a task with its whole subtree, shown or collapsed.
/// Returns the removed ids.
pub fn remove_task(list: &mut TaskList, id: TaskId) -> Result<Vec<TaskId>, TaskError> {
    if !list.contains(id) {
        return Err(TaskError::NotFound(id));
    }
    let ids = descendant_closure(id, list.all_tasks())?;
    let doomed: HashSet<TaskId> = ids.iter().copied().collect();
    list.visible.retain(|t| !doomed.contains(&t.id));
    list.hidden.retain(|t| !doomed.contains(&t.id));
    if list.focus_id.is_some_and(|f| doomed.contains(&f)) {
        list.focus_id = None;
    }
    tracing::debug!(id, removed = ids.len(), "removed task");
    Ok(ids)
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// Move `task_id` to directly after `target_id`, as its sibling or child.
///
/// Both tasks must be visible. Moving a task onto itself does nothing;
/// moving it under its own descendant is rejected.
pub fn move_task(
    list: &mut TaskList,
    task_id: TaskId,
    target_id: TaskId,
    edge: MoveEdge,
) -> Result<(), TaskError> {
    if !list.is_visible(task_id) {
        return Err(TaskError::NotFound(task_id));
    }
    if !list.is_visible(target_id) {
        return Err(TaskError::NotFound(target_id));
    }
    if task_id == target_id {
        return Ok(());
    }
    if descendant_closure(task_id, list.all_tasks())?.contains(&target_id) {
        tracing::warn!(task = task_id, target = target_id, "rejected move under own descendant");
        return Err(TaskError::InvalidMove {
            task: task_id,
            target: target_id,
        });
    }
    if edge == MoveEdge::Child {
        expand_in_place(list, target_id)?;
    }

    let source_idx = list
        .visible
        .iter()
        .position(|t| t.id == task_id)
        .ok_or(TaskError::NotFound(task_id))?;
    let mut source = list.visible.remove(source_idx);
    source.touch(now_millis());

    let Some(target_idx) = list.visible.iter().position(|t| t.id == target_id) else {
        source.parent = None;
        list.visible.push(source);
        return Ok(());
    };
    source.parent = match edge {
        MoveEdge::Child => Some(target_id),
        MoveEdge::Sibling => list.visible[target_idx].parent,
    };
    list.visible.insert(target_idx + 1, source);
    tracing::debug!(task = task_id, target = target_id, ?edge, "moved task");
    Ok(())
}

// ---------------------------------------------------------------------------
// Expand / collapse
// ---------------------------------------------------------------------------

/// Expand or collapse a visible task.
///
/// Collapsing moves every visible descendant into the hidden collection.
/// Expanding brings back the descendants that are not still under another
/// collapsed task, so a collapse/expand round trip restores the same rows in
/// the same order.
pub fn toggle_expand(list: &mut TaskList, id: TaskId, expand: bool) -> Result<(), TaskError> {
    if !list.is_visible(id) {
        return Err(TaskError::NotFound(id));
    }
    if expand {
        expand_in_place(list, id)?;
    } else {
        let ids: HashSet<TaskId> = strict_descendants(id, &list.visible)?.into_iter().collect();
        let (moved, kept): (Vec<Task>, Vec<Task>) = std::mem::take(&mut list.visible)
            .into_iter()
            .partition(|t| ids.contains(&t.id));
        list.visible = kept;
        list.hidden.extend(moved.into_iter().map(|mut t| {
            t.hidden = true;
            t
        }));
        if let Some(task) = list.visible_task_mut(id) {
            task.expand = false;
        }
        if list.focus_id.is_some_and(|f| ids.contains(&f)) {
            list.focus_id = Some(id);
        }
    }
    tracing::debug!(id, expand, "toggled expand");
    Ok(())
}

/// Set `expand` on a visible task and reveal its collapsed descendants
fn expand_in_place(list: &mut TaskList, id: TaskId) -> Result<(), TaskError> {
    let reveal = revealable(list, id)?;
    if let Some(task) = list.visible_task_mut(id) {
        task.expand = true;
    }
    if reveal.is_empty() {
        return Ok(());
    }
    let (moved, kept): (Vec<Task>, Vec<Task>) = std::mem::take(&mut list.hidden)
        .into_iter()
        .partition(|t| reveal.contains(&t.id));
    list.hidden = kept;
    list.visible.extend(moved.into_iter().map(|mut t| {
        t.hidden = false;
        t
    }));
    Ok(())
}

/// Hidden descendants of `id` reachable without passing a collapsed task
fn revealable(list: &TaskList, id: TaskId) -> Result<HashSet<TaskId>, TaskError> {
    let mut children: HashMap<TaskId, Vec<&Task>> = HashMap::new();
    for task in &list.hidden {
        if let Some(parent) = task.parent {
            children.entry(parent).or_default().push(task);
        }
    }
    let mut reveal = HashSet::new();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        for child in children.get(&current).into_iter().flatten() {
            if child.id == id || !reveal.insert(child.id) {
                return Err(TaskError::CorruptHierarchy(child.id));
            }
            if child.expand {
                stack.push(child.id);
            }
        }
    }
    Ok(reveal)
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Set `completed` on a visible task and cascade it to every descendant,
/// collapsed ones included. Returns the ids that were updated.
pub fn toggle_completed(
    list: &mut TaskList,
    id: TaskId,
    checked: bool,
) -> Result<Vec<TaskId>, TaskError> {
    if !list.is_visible(id) {
        return Err(TaskError::NotFound(id));
    }
    let ids = descendant_closure(id, list.all_tasks())?;
    let targets: HashSet<TaskId> = ids.iter().copied().collect();
    let now = now_millis();
    for task in list.visible.iter_mut().chain(list.hidden.iter_mut()) {
        if targets.contains(&task.id) {
            task.completed = checked;
            task.touch(now);
        }
    }
    tracing::debug!(id, checked, cascaded = ids.len() - 1, "toggled completed");
    Ok(ids)
}

// ---------------------------------------------------------------------------
// List-level fields
// ---------------------------------------------------------------------------

pub fn set_focus(list: &mut TaskList, id: Option<TaskId>) {
    list.focus_id = id;
}

/// Replace the tag catalog wholesale. Validation belongs to the editor.
pub fn update_tag_catalog(list: &mut TaskList, tags: Vec<String>) {
    list.tag_catalog = tags;
}

pub fn update_preferences(list: &mut TaskList, patch: &PreferencesPatch) {
    let prefs = &mut list.preferences;
    if let Some(v) = patch.confirm_before_delete {
        prefs.confirm_before_delete = v;
    }
    if let Some(v) = patch.confirm_incomplete_subtasks {
        prefs.confirm_incomplete_subtasks = v;
    }
    if let Some(v) = patch.default_priority {
        prefs.default_priority = v;
    }
    if let Some(v) = &patch.default_tag {
        prefs.default_tag = v.clone().filter(|t| !t.is_empty());
    }
}

// ---------------------------------------------------------------------------
// Batch copy (library → list)
// ---------------------------------------------------------------------------

/// Copy the subtree rooted at `source_id` from `source` into `dest`.
///
/// Copies get fresh ids with parent links remapped, `completed` cleared and
/// new timestamps; the copied root becomes a root in `dest`. Copies under a
/// collapsed copied ancestor land in `dest.hidden`. A one-shot source is
/// removed from `source` afterwards; a recurring one stays as a template.
/// Returns the new ids, root first.
pub fn batch_copy_subtree(
    source: &mut TaskList,
    dest: &mut TaskList,
    source_id: TaskId,
) -> Result<Vec<TaskId>, TaskError> {
    let root = source.task(source_id).ok_or(TaskError::NotFound(source_id))?;
    let consume = root.repeat_type == crate::model::task::RepeatType::OneShot;
    let ids = descendant_closure(source_id, source.all_tasks())?;

    let mut next = dest.next_id();
    let mut id_map: HashMap<TaskId, TaskId> = HashMap::new();
    for old in &ids {
        id_map.insert(*old, next);
        next += 1;
    }

    let now = now_millis();
    // Pre-order guarantees a parent's placement is decided before its children
    let mut under_collapsed: HashMap<TaskId, bool> = HashMap::new();
    let mut new_ids = Vec::with_capacity(ids.len());
    for old in &ids {
        let Some(original) = source.task(*old) else {
            continue;
        };
        let mut copy = original.clone();
        copy.id = id_map[old];
        copy.parent = if *old == source_id {
            None
        } else {
            original.parent.and_then(|p| id_map.get(&p).copied())
        };
        copy.completed = false;
        copy.create_time = now;
        copy.update_time = now;

        let hide = match original.parent {
            Some(p) if *old != source_id => {
                let parent_expanded = source.task(p).is_some_and(|t| t.expand);
                under_collapsed.get(&p).copied().unwrap_or(false) || !parent_expanded
            }
            _ => false,
        };
        under_collapsed.insert(*old, hide);
        copy.hidden = hide;
        new_ids.push(copy.id);
        if hide {
            dest.hidden.push(copy);
        } else {
            dest.visible.push(copy);
        }
    }
    dest.last_id = dest.last_id.max(next - 1);

    if consume {
        remove_task(source, source_id)?;
    }
    tracing::debug!(source_id, copied = new_ids.len(), consume, "copied subtree");
    Ok(new_ids)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{Priority, RepeatType};
    use pretty_assertions::assert_eq;

    fn ids(tasks: &[Task]) -> Vec<TaskId> {
        tasks.iter().map(|t| t.id).collect()
    }

    fn add(list: &mut TaskList, title: &str, parent: Option<TaskId>) -> TaskId {
        add_task(list, title.into(), parent, InsertPosition::Bottom, false).unwrap()
    }

    /// 1 > 2 > 3, plus root 4
    fn chain() -> TaskList {
        let mut list = TaskList::default();
        add(&mut list, "one", None);
        add(&mut list, "two", Some(1));
        add(&mut list, "three", Some(2));
        add(&mut list, "four", None);
        list
    }

    // --- add ---

    #[test]
    fn test_add_root_then_child_expands_parent() {
        let mut list = TaskList::default();
        let first = add(&mut list, "Buy milk", None);
        assert_eq!(first, 1);
        assert_eq!(ids(&list.visible), vec![1]);
        assert!(!list.visible[0].expand);

        let second = add(&mut list, "2% milk", Some(1));
        assert_eq!(second, 2);
        assert_eq!(list.visible[1].parent, Some(1));
        assert!(list.visible[0].expand);
        assert_eq!(ids(&list.visible), vec![1, 2]);
    }

    #[test]
    fn test_add_uses_preference_defaults() {
        let mut list = TaskList::default();
        list.preferences.default_priority = Priority::Low;
        list.preferences.default_tag = Some("work".into());
        let id = add(&mut list, "t", None);
        let task = list.visible_task(id).unwrap();
        assert_eq!(task.priority, Priority::Low);
        assert_eq!(task.tags, vec!["work"]);
        assert_eq!(task.repeat_type, RepeatType::OneShot);
        assert!(!task.completed);
    }

    #[test]
    fn test_add_after_sibling_inserts_adjacent_and_focuses() {
        let mut list = TaskList::default();
        add(&mut list, "a", None);
        add(&mut list, "b", None);
        let id = add_task(&mut list, "c".into(), None, InsertPosition::After(1), true).unwrap();
        assert_eq!(ids(&list.visible), vec![1, 3, 2]);
        assert_eq!(list.focus_id, Some(id));
    }

    #[test]
    fn test_add_after_unknown_sibling_appends() {
        let mut list = TaskList::default();
        add(&mut list, "a", None);
        add_task(&mut list, "b".into(), None, InsertPosition::After(77), false).unwrap();
        assert_eq!(ids(&list.visible), vec![1, 2]);
    }

    #[test]
    fn test_add_under_missing_parent_is_rejected() {
        let mut list = TaskList::default();
        let before = list.clone();
        let result = add_task(&mut list, "x".into(), Some(9), InsertPosition::Bottom, false);
        assert_eq!(result, Err(TaskError::NotFound(9)));
        assert_eq!(list, before);
    }

    #[test]
    fn test_add_under_collapsed_parent_reveals_existing_children() {
        let mut list = chain();
        toggle_expand(&mut list, 1, false).unwrap();
        assert_eq!(ids(&list.hidden), vec![2, 3]);

        let id = add(&mut list, "new", Some(1));
        assert!(list.hidden.is_empty());
        assert_eq!(ids(&list.visible), vec![1, 4, 2, 3, id]);
    }

    #[test]
    fn test_add_under_hidden_parent_stays_hidden() {
        let mut list = chain();
        toggle_expand(&mut list, 1, false).unwrap();
        let id = add(&mut list, "deep", Some(2));
        assert!(list.hidden.iter().any(|t| t.id == id));
        assert!(!list.is_visible(id));
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let mut list = TaskList::default();
        add(&mut list, "a", None);
        add(&mut list, "b", None);
        remove_task(&mut list, 2).unwrap();
        assert_eq!(add(&mut list, "c", None), 3);
    }

    // --- update ---

    #[test]
    fn test_update_merges_and_bumps_time() {
        let mut list = chain();
        list.visible[0].update_time = 0;
        update_task(&mut list, 1, &TaskPatch::title("renamed")).unwrap();
        let task = list.visible_task(1).unwrap();
        assert_eq!(task.title, "renamed");
        assert!(task.update_time > 0);
    }

    #[test]
    fn test_update_hidden_task_is_not_found() {
        let mut list = chain();
        toggle_expand(&mut list, 1, false).unwrap();
        let before = list.clone();
        assert_eq!(
            update_task(&mut list, 2, &TaskPatch::title("x")),
            Err(TaskError::NotFound(2))
        );
        assert_eq!(list, before);
    }

    // --- remove ---

    #[test]
    fn test_remove_cascades_to_descendants_only() {
        let mut list = chain();
        let removed = remove_task(&mut list, 2).unwrap();
        assert_eq!(removed, vec![2, 3]);
        assert_eq!(ids(&list.visible), vec![1, 4]);
    }

    #[test]
    fn test_remove_purges_collapsed_subtree() {
        let mut list = chain();
        toggle_expand(&mut list, 1, false).unwrap();
        remove_task(&mut list, 1).unwrap();
        assert_eq!(ids(&list.visible), vec![4]);
        assert!(list.hidden.is_empty());
    }

    #[test]
    fn test_remove_clears_focus_inside_subtree() {
        let mut list = chain();
        set_focus(&mut list, Some(3));
        remove_task(&mut list, 2).unwrap();
        assert_eq!(list.focus_id, None);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut list = chain();
        let before = list.clone();
        assert_eq!(remove_task(&mut list, 99), Err(TaskError::NotFound(99)));
        assert_eq!(list, before);
    }

    // --- move ---

    #[test]
    fn test_move_sibling_reorders_roots() {
        let mut list = TaskList::default();
        add(&mut list, "a", None);
        add(&mut list, "b", None);

        move_task(&mut list, 2, 1, MoveEdge::Sibling).unwrap();
        assert_eq!(ids(&list.visible), vec![1, 2]);

        move_task(&mut list, 1, 2, MoveEdge::Sibling).unwrap();
        assert_eq!(ids(&list.visible), vec![2, 1]);
        assert_eq!(list.visible[1].parent, None);
    }

    #[test]
    fn test_move_child_reparents_and_expands_target() {
        let mut list = chain();
        move_task(&mut list, 4, 3, MoveEdge::Child).unwrap();
        let moved = list.visible_task(4).unwrap();
        assert_eq!(moved.parent, Some(3));
        assert!(list.visible_task(3).unwrap().expand);
        assert_eq!(ids(&list.visible), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_move_sibling_adopts_target_parent() {
        let mut list = chain();
        move_task(&mut list, 4, 3, MoveEdge::Sibling).unwrap();
        assert_eq!(list.visible_task(4).unwrap().parent, Some(2));
    }

    #[test]
    fn test_move_under_own_descendant_is_rejected() {
        let mut list = TaskList::default();
        add(&mut list, "a", None);
        add(&mut list, "b", Some(1));
        let before = list.clone();
        assert_eq!(
            move_task(&mut list, 1, 2, MoveEdge::Child),
            Err(TaskError::InvalidMove { task: 1, target: 2 })
        );
        assert_eq!(list, before);
    }

    #[test]
    fn test_move_onto_itself_is_noop() {
        let mut list = chain();
        let before = list.clone();
        move_task(&mut list, 2, 2, MoveEdge::Child).unwrap();
        assert_eq!(list, before);
    }

    #[test]
    fn test_move_hidden_task_is_not_found() {
        let mut list = chain();
        toggle_expand(&mut list, 1, false).unwrap();
        assert_eq!(
            move_task(&mut list, 3, 4, MoveEdge::Sibling),
            Err(TaskError::NotFound(3))
        );
    }

    #[test]
    fn test_move_as_child_of_collapsed_target_reveals_its_children() {
        let mut list = chain();
        toggle_expand(&mut list, 1, false).unwrap();
        move_task(&mut list, 4, 1, MoveEdge::Child).unwrap();
        assert!(list.hidden.is_empty());
        assert_eq!(list.visible_task(4).unwrap().parent, Some(1));
        assert_eq!(list.visible[1].id, 4);
    }

    #[test]
    fn test_moved_collapsed_task_keeps_hidden_children() {
        let mut list = chain();
        toggle_expand(&mut list, 2, false).unwrap();
        move_task(&mut list, 2, 4, MoveEdge::Child).unwrap();
        assert_eq!(ids(&list.hidden), vec![3]);
        assert_eq!(list.hidden[0].parent, Some(2));
        assert!(!list.visible_task(2).unwrap().expand);
    }

    // --- expand / collapse ---

    #[test]
    fn test_collapse_then_expand_restores_descendants() {
        let mut list = chain();
        toggle_expand(&mut list, 1, false).unwrap();
        assert_eq!(ids(&list.visible), vec![1, 4]);
        assert_eq!(ids(&list.hidden), vec![2, 3]);
        assert!(list.hidden.iter().all(|t| t.hidden));

        toggle_expand(&mut list, 1, true).unwrap();
        assert_eq!(ids(&list.visible), vec![1, 4, 2, 3]);
        assert!(list.hidden.is_empty());
    }

    #[test]
    fn test_expand_skips_grandchildren_under_collapsed_child() {
        let mut list = chain();
        toggle_expand(&mut list, 2, false).unwrap();
        toggle_expand(&mut list, 1, false).unwrap();
        assert_eq!(ids(&list.hidden), vec![3, 2]);

        toggle_expand(&mut list, 1, true).unwrap();
        assert_eq!(ids(&list.visible), vec![1, 4, 2]);
        assert_eq!(ids(&list.hidden), vec![3]);
    }

    #[test]
    fn test_collapse_moves_focus_to_collapsed_task() {
        let mut list = chain();
        set_focus(&mut list, Some(3));
        toggle_expand(&mut list, 1, false).unwrap();
        assert_eq!(list.focus_id, Some(1));
    }

    #[test]
    fn test_expand_unknown_is_noop() {
        let mut list = chain();
        let before = list.clone();
        assert_eq!(toggle_expand(&mut list, 42, true), Err(TaskError::NotFound(42)));
        assert_eq!(list, before);
    }

    // --- completion ---

    #[test]
    fn test_complete_cascades_to_all_descendants() {
        let mut list = chain();
        list.visible[2].completed = true;
        toggle_expand(&mut list, 2, false).unwrap();
        let changed = toggle_completed(&mut list, 1, true).unwrap();
        assert_eq!(changed, vec![1, 2, 3]);
        assert!(list.all_tasks().filter(|t| t.id != 4).all(|t| t.completed));
        assert!(!list.task(4).unwrap().completed);

        toggle_completed(&mut list, 2, false).unwrap();
        assert!(!list.task(3).unwrap().completed);
        assert!(list.task(1).unwrap().completed);
    }

    // --- list-level ---

    #[test]
    fn test_preferences_patch_updates_only_given_fields() {
        let mut list = TaskList::default();
        update_preferences(
            &mut list,
            &PreferencesPatch {
                confirm_before_delete: Some(true),
                default_tag: Some(Some("life".into())),
                ..Default::default()
            },
        );
        assert!(list.preferences.confirm_before_delete);
        assert!(list.preferences.confirm_incomplete_subtasks);
        assert_eq!(list.preferences.default_tag.as_deref(), Some("life"));

        update_preferences(
            &mut list,
            &PreferencesPatch {
                default_tag: Some(None),
                ..Default::default()
            },
        );
        assert_eq!(list.preferences.default_tag, None);
    }

    #[test]
    fn test_tag_catalog_is_replaced() {
        let mut list = TaskList::default();
        update_tag_catalog(&mut list, vec!["a".into()]);
        assert_eq!(list.tag_catalog, vec!["a"]);
    }

    // --- batch copy ---

    #[test]
    fn test_copy_one_shot_consumes_source() {
        let mut library = chain();
        let mut todo = TaskList::default();
        add(&mut todo, "existing", None);
        library.visible[0].completed = true;

        let new_ids = batch_copy_subtree(&mut library, &mut todo, 1).unwrap();
        assert_eq!(new_ids, vec![2, 3, 4]);
        assert_eq!(ids(&todo.visible), vec![1, 2, 3, 4]);
        assert_eq!(todo.visible[1].parent, None);
        assert_eq!(todo.visible[2].parent, Some(2));
        assert_eq!(todo.visible[3].parent, Some(3));
        assert!(todo.visible.iter().all(|t| !t.completed));
        assert_eq!(ids(&library.visible), vec![4]);
    }

    #[test]
    fn test_copy_recurring_keeps_template() {
        let mut library = chain();
        library.visible[0].repeat_type = RepeatType::Recurring;
        let mut todo = TaskList::default();
        batch_copy_subtree(&mut library, &mut todo, 1).unwrap();
        batch_copy_subtree(&mut library, &mut todo, 1).unwrap();
        assert_eq!(library.len(), 4);
        assert_eq!(ids(&todo.visible), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_copy_of_collapsed_template_keeps_children_hidden() {
        let mut library = chain();
        library.visible[0].repeat_type = RepeatType::Recurring;
        toggle_expand(&mut library, 1, false).unwrap();
        let mut todo = TaskList::default();
        batch_copy_subtree(&mut library, &mut todo, 1).unwrap();
        assert_eq!(ids(&todo.visible), vec![1]);
        assert_eq!(ids(&todo.hidden), vec![2, 3]);
        assert!(!todo.visible[0].expand);
    }

    #[test]
    fn test_copy_unknown_is_noop() {
        let mut library = chain();
        let mut todo = TaskList::default();
        assert_eq!(
            batch_copy_subtree(&mut library, &mut todo, 50),
            Err(TaskError::NotFound(50))
        );
        assert!(todo.is_empty());
    }
}
