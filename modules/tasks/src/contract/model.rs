use chrono::NaiveDateTime;

/// Placeholder for a field the assistant could not extract.
pub const SENTINEL: &str = "F";

/// Editable task fields as entered by a user or extracted by the assistant.
///
/// Values are kept as text; an empty string or [`SENTINEL`] means "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFields {
    pub task_title: String,
    pub description: String,
    pub priority: String,
    pub time_required: String,
    pub schedule_date: String,
    pub schedule_from: String,
    pub schedule_to: String,
    pub tag: String,
}

/// A stored task.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub task_title: String,
    pub description: String,
    pub priority: String,
    pub time_required: String,
    pub schedule_date: String,
    pub schedule_from: String,
    pub schedule_to: String,
    pub tag: String,
    pub review: Option<String>,
    pub completed: bool,
    pub created_at: NaiveDateTime,
}

impl Task {
    pub fn fields(&self) -> TaskFields {
        TaskFields {
            task_title: self.task_title.clone(),
            description: self.description.clone(),
            priority: self.priority.clone(),
            time_required: self.time_required.clone(),
            schedule_date: self.schedule_date.clone(),
            schedule_from: self.schedule_from.clone(),
            schedule_to: self.schedule_to.clone(),
            tag: self.tag.clone(),
        }
    }
}

/// Result of running the field checks over a [`TaskFields`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub warnings: Vec<String>,
    /// Input with trimmed schedule/time values and the bucket rule applied.
    pub normalized: TaskFields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analytics {
    pub completion_rate: i64,
    pub priority_distribution: Vec<LabelCount>,
    pub tag_distribution: Vec<LabelCount>,
    pub total_tasks: i64,
    pub completed_tasks: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub index: usize,
    pub task_title: String,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub created: Vec<Task>,
    pub failed: Vec<BatchFailure>,
}
