use serde::{Deserialize, Serialize};

/// Task identifier, unique within one task list
pub type TaskId = u64;

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    High,
    Medium,
    Low,
}

impl Priority {
    /// Single-character marker used in compact listings
    pub fn marker(self) -> char {
        match self {
            Priority::High => '!',
            Priority::Medium => '~',
            Priority::Low => '.',
        }
    }

    /// Parse a priority name (`high`, `medium`, `low`, or the first letter)
    pub fn parse(s: &str) -> Option<Priority> {
        match s.to_ascii_lowercase().as_str() {
            "high" | "h" => Some(Priority::High),
            "medium" | "med" | "m" => Some(Priority::Medium),
            "low" | "l" => Some(Priority::Low),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// Whether a library task is a reusable template or is consumed when promoted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatType {
    Recurring,
    #[default]
    OneShot,
}

impl RepeatType {
    pub fn parse(s: &str) -> Option<RepeatType> {
        match s.to_ascii_lowercase().as_str() {
            "recurring" | "repeat" => Some(RepeatType::Recurring),
            "one-shot" | "oneshot" | "once" => Some(RepeatType::OneShot),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RepeatType::Recurring => "recurring",
            RepeatType::OneShot => "one-shot",
        }
    }
}

/// One node in the task hierarchy. Children point at their parent by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    /// Parent task id (`None` = root)
    #[serde(default)]
    pub parent: Option<TaskId>,
    /// Whether children are shown
    #[serde(default)]
    pub expand: bool,
    /// Advisory only; visibility is decided by which collection holds the task
    #[serde(default)]
    pub hidden: bool,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub create_time: i64,
    #[serde(default)]
    pub update_time: i64,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    #[serde(default)]
    pub repeat_type: RepeatType,
}

impl Task {
    /// Create a fresh root task stamped with `now`
    pub fn new(id: TaskId, title: String, now: i64) -> Self {
        Task {
            id,
            title,
            completed: false,
            parent: None,
            expand: false,
            hidden: false,
            create_time: now,
            update_time: now,
            priority: Priority::default(),
            tags: Vec::new(),
            remark: None,
            repeat_type: RepeatType::default(),
        }
    }

    /// Refresh the update timestamp
    pub fn touch(&mut self, now: i64) {
        self.update_time = now;
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Partial update for the user-editable fields of a task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
    /// `Some(None)` clears the remark
    pub remark: Option<Option<String>>,
    pub repeat_type: Option<RepeatType>,
}

impl TaskPatch {
    pub fn title(title: impl Into<String>) -> Self {
        TaskPatch {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.priority.is_none()
            && self.tags.is_none()
            && self.remark.is_none()
            && self.repeat_type.is_none()
    }

    /// Merge the patch into `task`. Tags are de-duplicated keeping first occurrence.
    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(tags) = &self.tags {
            task.tags = dedup_tags(tags);
        }
        if let Some(remark) = &self.remark {
            task.remark = remark.clone().filter(|r| !r.is_empty());
        }
        if let Some(repeat_type) = self.repeat_type {
            task.repeat_type = repeat_type;
        }
    }
}

/// Strip `#` prefixes, drop empties and duplicates, keep order
pub fn dedup_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().trim_start_matches('#');
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}
