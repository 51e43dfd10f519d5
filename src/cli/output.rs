use serde::Serialize;

use crate::model::list::{ListKind, Preferences, TaskList};
use crate::model::task::{Priority, RepeatType, Task, TaskId};
use crate::ops::hierarchy::{TaskNode, build_tree};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: TaskId,
    pub title: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<TaskId>,
    pub expand: bool,
    pub priority: Priority,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    pub repeat_type: RepeatType,
    pub create_time: i64,
    pub update_time: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct TaskListJson {
    pub list: ListKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_id: Option<TaskId>,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct IdsJson {
    pub ids: Vec<TaskId>,
}

#[derive(Serialize)]
pub struct PrefsJson<'a> {
    pub preferences: &'a Preferences,
    pub tags: &'a [String],
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

fn task_fields(task: &Task, subtasks: Vec<TaskJson>) -> TaskJson {
    TaskJson {
        id: task.id,
        title: task.title.clone(),
        completed: task.completed,
        parent: task.parent,
        expand: task.expand,
        priority: task.priority,
        tags: task.tags.clone(),
        remark: task.remark.clone(),
        repeat_type: task.repeat_type,
        create_time: task.create_time,
        update_time: task.update_time,
        subtasks,
    }
}

pub fn node_to_json(node: &TaskNode) -> TaskJson {
    task_fields(&node.task, node.children.iter().map(node_to_json).collect())
}

/// A single task without its subtasks
pub fn task_to_json(task: &Task) -> TaskJson {
    task_fields(task, Vec::new())
}

/// The forest to print: visible tasks only, or every task with `all`
pub fn list_forest(list: &TaskList, all: bool) -> Vec<TaskNode> {
    if all {
        let tasks: Vec<Task> = list.all_tasks().cloned().collect();
        build_tree(&tasks)
    } else {
        build_tree(&list.visible)
    }
}

pub fn list_to_json(kind: ListKind, list: &TaskList, all: bool) -> TaskListJson {
    TaskListJson {
        list: kind,
        focus_id: list.focus_id,
        tasks: list_forest(list, all).iter().map(node_to_json).collect(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Format a single task as a one-line summary
pub fn format_task_line(task: &Task, collapsed_children: usize) -> String {
    let check = if task.completed { 'x' } else { ' ' };
    let tags_str = if task.tags.is_empty() {
        String::new()
    } else {
        format!(
            " {}",
            task.tags
                .iter()
                .map(|t| format!("#{}", t))
                .collect::<Vec<_>>()
                .join(" ")
        )
    };
    let folded = if collapsed_children > 0 {
        format!(" (+{})", collapsed_children)
    } else {
        String::new()
    };
    format!(
        "[{}] {} {} {}{}{}",
        check,
        task.id,
        task.priority.marker(),
        task.title,
        tags_str,
        folded
    )
}

/// Format a node with its children, indented
pub fn format_task_tree(list: &TaskList, node: &TaskNode, indent: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let prefix = "  ".repeat(indent);
    let focus = if list.focus_id == Some(node.id()) { ">" } else { " " };
    let collapsed = if node.task.expand || !node.children.is_empty() {
        0
    } else {
        list.all_tasks()
            .filter(|t| t.parent == Some(node.id()))
            .count()
    };
    lines.push(format!(
        "{}{}{}",
        focus,
        prefix,
        format_task_line(&node.task, collapsed)
    ));
    for child in &node.children {
        lines.extend(format_task_tree(list, child, indent + 1));
    }
    lines
}

/// Format a whole list
pub fn format_list(kind: ListKind, list: &TaskList, all: bool) -> Vec<String> {
    let mut lines = vec![format!("== {} ==", kind)];
    let forest = list_forest(list, all);
    if forest.is_empty() {
        lines.push("(empty)".to_string());
    }
    for node in &forest {
        lines.extend(format_task_tree(list, node, 0));
    }
    lines
}

/// Format detailed task view
pub fn format_task_detail(list: &TaskList, task: &Task) -> Vec<String> {
    let mut lines = Vec::new();
    let check = if task.completed { 'x' } else { ' ' };
    lines.push(format!("[{}] {} {}", check, task.id, task.title));

    if let Some(parent) = task.parent {
        lines.push(format!("parent: {}", parent));
    }
    lines.push(format!("priority: {}", task.priority.as_str()));
    if !task.tags.is_empty() {
        lines.push(format!(
            "tags: {}",
            task.tags
                .iter()
                .map(|t| format!("#{}", t))
                .collect::<Vec<_>>()
                .join(" ")
        ));
    }
    lines.push(format!("repeat: {}", task.repeat_type.as_str()));
    lines.push(format!("created: {}", format_millis(task.create_time)));
    lines.push(format!("updated: {}", format_millis(task.update_time)));
    if !list.is_visible(task.id) {
        lines.push("hidden: yes".to_string());
    }
    if let Some(remark) = &task.remark {
        lines.push("remark:".to_string());
        for line in remark.lines() {
            lines.push(format!("  {}", line));
        }
    }

    let children: Vec<&Task> = list
        .all_tasks()
        .filter(|t| t.parent == Some(task.id))
        .collect();
    if !children.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "subtasks{}:",
            if task.expand { "" } else { " (collapsed)" }
        ));
        for child in children {
            lines.push(format!("  {}", format_task_line(child, 0)));
        }
    }
    lines
}

fn format_millis(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ms.to_string())
}

/// Format the preferences listing
pub fn format_prefs(list: &TaskList) -> Vec<String> {
    let p = &list.preferences;
    vec![
        format!("confirm_before_delete: {}", p.confirm_before_delete),
        format!("confirm_incomplete_subtasks: {}", p.confirm_incomplete_subtasks),
        format!("default_priority: {}", p.default_priority.as_str()),
        format!(
            "default_tag: {}",
            p.default_tag.as_deref().unwrap_or("(none)")
        ),
    ]
}
