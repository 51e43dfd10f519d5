use serde::{Deserialize, Serialize};

use super::task::{Priority, Task, TaskId};

/// Which list instance an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    #[default]
    Todo,
    Library,
}

impl ListKind {
    pub fn other(self) -> ListKind {
        match self {
            ListKind::Todo => ListKind::Library,
            ListKind::Library => ListKind::Todo,
        }
    }
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListKind::Todo => write!(f, "Todo"),
            ListKind::Library => write!(f, "Library"),
        }
    }
}

/// One selectable priority with its display label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityOption {
    pub label: String,
    pub value: Priority,
}

/// Per-list user preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Ask before deleting a task
    #[serde(default)]
    pub confirm_before_delete: bool,
    /// Ask before completing a task that still has incomplete subtasks
    #[serde(default = "default_true")]
    pub confirm_incomplete_subtasks: bool,
    #[serde(default)]
    pub default_priority: Priority,
    #[serde(default)]
    pub default_tag: Option<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            confirm_before_delete: false,
            confirm_incomplete_subtasks: true,
            default_priority: Priority::High,
            default_tag: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Partial update for [`Preferences`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferencesPatch {
    pub confirm_before_delete: Option<bool>,
    pub confirm_incomplete_subtasks: Option<bool>,
    pub default_priority: Option<Priority>,
    /// `Some(None)` clears the default tag
    pub default_tag: Option<Option<String>>,
}

impl PreferencesPatch {
    pub fn is_empty(&self) -> bool {
        self.confirm_before_delete.is_none()
            && self.confirm_incomplete_subtasks.is_none()
            && self.default_priority.is_none()
            && self.default_tag.is_none()
    }
}

pub fn default_tag_catalog() -> Vec<String> {
    ["work", "study", "life", "fun"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn default_priority_catalog() -> Vec<PriorityOption> {
    vec![
        PriorityOption {
            label: "High".into(),
            value: Priority::High,
        },
        PriorityOption {
            label: "Medium".into(),
            value: Priority::Medium,
        },
        PriorityOption {
            label: "Low".into(),
            value: Priority::Low,
        },
    ]
}

/// The canonical state of one task list.
///
/// `visible` and `hidden` partition the task set: a task sits in `hidden`
/// exactly when some ancestor is collapsed. Sibling order is the relative
/// order of same-parent tasks within whichever collection holds them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    #[serde(default)]
    pub visible: Vec<Task>,
    #[serde(default)]
    pub hidden: Vec<Task>,
    #[serde(default)]
    pub focus_id: Option<TaskId>,
    #[serde(default = "default_tag_catalog")]
    pub tag_catalog: Vec<String>,
    #[serde(default = "default_priority_catalog")]
    pub priority_catalog: Vec<PriorityOption>,
    #[serde(default)]
    pub preferences: Preferences,
    /// Highest id ever handed out, so deleted ids are not reused
    #[serde(default)]
    pub last_id: TaskId,
}

impl Default for TaskList {
    fn default() -> Self {
        TaskList {
            visible: Vec::new(),
            hidden: Vec::new(),
            focus_id: None,
            tag_catalog: default_tag_catalog(),
            priority_catalog: default_priority_catalog(),
            preferences: Preferences::default(),
            last_id: 0,
        }
    }
}

impl TaskList {
    /// Visible task by id
    pub fn visible_task(&self, id: TaskId) -> Option<&Task> {
        self.visible.iter().find(|t| t.id == id)
    }

    pub fn visible_task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.visible.iter_mut().find(|t| t.id == id)
    }

    /// Task by id from either collection
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.all_tasks().find(|t| t.id == id)
    }

    pub fn is_visible(&self, id: TaskId) -> bool {
        self.visible.iter().any(|t| t.id == id)
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.task(id).is_some()
    }

    /// Every task, visible first, then hidden
    pub fn all_tasks(&self) -> impl Iterator<Item = &Task> {
        self.visible.iter().chain(self.hidden.iter())
    }

    pub fn len(&self) -> usize {
        self.visible.len() + self.hidden.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty() && self.hidden.is_empty()
    }

    /// Whether the task has any children, shown or collapsed
    pub fn has_children(&self, id: TaskId) -> bool {
        self.all_tasks().any(|t| t.parent == Some(id))
    }

    /// The id the next created task receives
    pub fn next_id(&self) -> TaskId {
        let max = self.all_tasks().map(|t| t.id).max().unwrap_or(0);
        max.max(self.last_id) + 1
    }

    /// Number of ancestors of a task (0 = root). Stops at a missing parent.
    pub fn depth(&self, id: TaskId) -> usize {
        let mut depth = 0;
        let mut current = self.task(id).and_then(|t| t.parent);
        while let Some(parent_id) = current {
            depth += 1;
            if depth > self.len() {
                break;
            }
            current = self.task(parent_id).and_then(|t| t.parent);
        }
        depth
    }
}
