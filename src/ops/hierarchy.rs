use std::collections::{HashMap, HashSet};

use crate::model::task::{Task, TaskId};

use super::task_ops::TaskError;

/// A task together with its children, in sibling order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskNode {
    pub task: Task,
    pub children: Vec<TaskNode>,
}

impl TaskNode {
    pub fn id(&self) -> TaskId {
        self.task.id
    }
}

/// Build the display forest from a flat task sequence.
///
/// Tasks are stored flat with a `parent` pointer; this is the only place the
/// shape of the hierarchy is assembled for display.
/// Roots and children keep the relative order they have in `tasks`. A task
/// whose parent is not in `tasks` is left out, as are tasks on a parent cycle
/// (neither is reachable from a root).
pub fn build_tree(tasks: &[Task]) -> Vec<TaskNode> {
    let mut children: HashMap<TaskId, Vec<&Task>> = HashMap::new();
    let mut roots = Vec::new();
    for task in tasks {
        match task.parent {
            None => roots.push(task),
            Some(parent) => children.entry(parent).or_default().push(task),
        }
    }
    roots
        .into_iter()
        .map(|task| attach(task, &children))
        .collect()
}

fn attach(task: &Task, children: &HashMap<TaskId, Vec<&Task>>) -> TaskNode {
    TaskNode {
        task: task.clone(),
        children: children
            .get(&task.id)
            .map(|kids| kids.iter().map(|kid| attach(kid, children)).collect())
            .unwrap_or_default(),
    }
}

/// Pre-order ids of a forest (the arrow-key navigation order)
pub fn collect_ids(forest: &[TaskNode]) -> Vec<TaskId> {
    let mut ids = Vec::new();
    for node in forest {
        collect_into(node, &mut ids);
    }
    ids
}

fn collect_into(node: &TaskNode, ids: &mut Vec<TaskId>) {
    ids.push(node.id());
    for child in &node.children {
        collect_into(child, ids);
    }
}

/// A forest node flattened with its nesting depth, in pre-order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatNode<'a> {
    pub node: &'a TaskNode,
    pub depth: usize,
}

/// Flatten a forest in pre-order, recording each node's depth
pub fn flatten(forest: &[TaskNode]) -> Vec<FlatNode<'_>> {
    fn walk<'a>(nodes: &'a [TaskNode], depth: usize, out: &mut Vec<FlatNode<'a>>) {
        for node in nodes {
            out.push(FlatNode { node, depth });
            walk(&node.children, depth + 1, out);
        }
    }
    let mut out = Vec::new();
    walk(forest, 0, &mut out);
    out
}

/// `id` plus every task whose parent chain reaches `id`, in pre-order.
///
/// Runs an explicit worklist over a children index built once per call.
/// Reaching an id twice means the parent links contain a cycle; that is
/// reported as [`TaskError::CorruptHierarchy`] instead of looping.
pub fn descendant_closure<'a, I>(id: TaskId, tasks: I) -> Result<Vec<TaskId>, TaskError>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut children: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
    for task in tasks {
        if let Some(parent) = task.parent {
            children.entry(parent).or_default().push(task.id);
        }
    }

    let mut order = Vec::new();
    let mut seen = HashSet::new();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        if !seen.insert(current) {
            tracing::error!(task = current, root = id, "cycle in task hierarchy");
            return Err(TaskError::CorruptHierarchy(current));
        }
        order.push(current);
        if let Some(kids) = children.get(&current) {
            // Reverse so the first child is visited first
            stack.extend(kids.iter().rev());
        }
    }
    Ok(order)
}

/// Strict descendants of `id` (the closure without `id` itself)
pub fn strict_descendants<'a, I>(id: TaskId, tasks: I) -> Result<Vec<TaskId>, TaskError>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut ids = descendant_closure(id, tasks)?;
    ids.remove(0);
    Ok(ids)
}
