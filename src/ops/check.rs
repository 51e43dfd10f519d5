use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::model::list::TaskList;
use crate::model::task::TaskId;

/// Structured result from `tf check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// A structural problem in a task list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckError {
    /// The same id appears more than once across visible and hidden
    DuplicateId { task_id: TaskId },
    /// A parent pointer names a task that does not exist
    DanglingParent { task_id: TaskId, parent: TaskId },
    /// Following parent pointers from this task loops back to it
    ParentCycle { task_id: TaskId },
    /// A hidden task with no collapsed ancestor
    HiddenWithoutCollapsedAncestor { task_id: TaskId },
    /// A visible task below a collapsed or hidden parent
    VisibleUnderCollapsed { task_id: TaskId },
}

/// A non-critical issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckWarning {
    /// The focused id is not a visible task
    StaleFocus { task_id: TaskId },
    /// The `hidden` flag disagrees with the collection holding the task
    HiddenFlagMismatch { task_id: TaskId },
}

/// Validate the visible/hidden partition and the parent links of a list.
///
/// This is a read-only operation.
pub fn check_list(list: &TaskList) -> CheckResult {
    let mut result = CheckResult::default();

    let mut seen = HashSet::new();
    for task in list.all_tasks() {
        if !seen.insert(task.id) {
            result.errors.push(CheckError::DuplicateId { task_id: task.id });
        }
    }

    let parents: HashMap<TaskId, Option<TaskId>> =
        list.all_tasks().map(|t| (t.id, t.parent)).collect();
    let expanded: HashMap<TaskId, bool> = list.all_tasks().map(|t| (t.id, t.expand)).collect();
    let visible: HashSet<TaskId> = list.visible.iter().map(|t| t.id).collect();

    for task in list.all_tasks() {
        if let Some(parent) = task.parent
            && !parents.contains_key(&parent)
        {
            result.errors.push(CheckError::DanglingParent {
                task_id: task.id,
                parent,
            });
            continue;
        }
        if on_cycle(task.id, &parents) {
            result.errors.push(CheckError::ParentCycle { task_id: task.id });
            continue;
        }

        let should_hide = task.parent.is_some_and(|p| {
            !expanded.get(&p).copied().unwrap_or(true) || !visible.contains(&p)
        });
        let is_visible = visible.contains(&task.id);
        if is_visible && should_hide {
            result
                .errors
                .push(CheckError::VisibleUnderCollapsed { task_id: task.id });
        } else if !is_visible && !should_hide {
            result
                .errors
                .push(CheckError::HiddenWithoutCollapsedAncestor { task_id: task.id });
        }
        if task.hidden == is_visible {
            result
                .warnings
                .push(CheckWarning::HiddenFlagMismatch { task_id: task.id });
        }
    }

    if let Some(focus) = list.focus_id
        && !visible.contains(&focus)
    {
        result.warnings.push(CheckWarning::StaleFocus { task_id: focus });
    }

    result.valid = result.errors.is_empty();
    result
}

fn on_cycle(id: TaskId, parents: &HashMap<TaskId, Option<TaskId>>) -> bool {
    let mut current = parents.get(&id).copied().flatten();
    let mut steps = 0;
    while let Some(p) = current {
        if p == id {
            return true;
        }
        steps += 1;
        if steps > parents.len() {
            // Looping above this task, not through it
            return false;
        }
        current = parents.get(&p).copied().flatten();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Task;
    use crate::ops::task_ops::{InsertPosition, add_task, toggle_expand};

    fn task(id: TaskId, parent: Option<TaskId>) -> Task {
        let mut t = Task::new(id, String::new(), 0);
        t.parent = parent;
        t
    }

    #[test]
    fn test_lists_built_by_operations_are_valid() {
        let mut list = TaskList::default();
        add_task(&mut list, "a".into(), None, InsertPosition::Bottom, true).unwrap();
        add_task(&mut list, "b".into(), Some(1), InsertPosition::Bottom, false).unwrap();
        add_task(&mut list, "c".into(), Some(2), InsertPosition::Bottom, false).unwrap();
        toggle_expand(&mut list, 2, false).unwrap();
        toggle_expand(&mut list, 1, false).unwrap();

        let result = check_list(&list);
        assert!(result.valid, "{:?}", result.errors);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_detects_dangling_parent_and_duplicates() {
        let list = TaskList {
            visible: vec![task(1, None), task(2, Some(9))],
            hidden: vec![task(1, None)],
            ..Default::default()
        };
        let result = check_list(&list);
        assert!(!result.valid);
        assert!(result.errors.contains(&CheckError::DuplicateId { task_id: 1 }));
        assert!(result.errors.contains(&CheckError::DanglingParent {
            task_id: 2,
            parent: 9
        }));
    }

    #[test]
    fn test_detects_cycle() {
        let list = TaskList {
            visible: vec![task(1, Some(2)), task(2, Some(1))],
            ..Default::default()
        };
        let result = check_list(&list);
        assert!(result.errors.contains(&CheckError::ParentCycle { task_id: 1 }));
        assert!(result.errors.contains(&CheckError::ParentCycle { task_id: 2 }));
    }

    #[test]
    fn test_detects_broken_partition() {
        let mut parent = task(1, None);
        parent.expand = false;
        let mut open = task(3, None);
        open.expand = true;
        let list = TaskList {
            visible: vec![parent, task(2, Some(1)), open],
            hidden: vec![task(4, Some(3))],
            focus_id: Some(4),
            ..Default::default()
        };
        let result = check_list(&list);
        assert!(result.errors.contains(&CheckError::VisibleUnderCollapsed { task_id: 2 }));
        assert!(
            result
                .errors
                .contains(&CheckError::HiddenWithoutCollapsedAncestor { task_id: 4 })
        );
        assert!(result.warnings.contains(&CheckWarning::StaleFocus { task_id: 4 }));
    }
}
