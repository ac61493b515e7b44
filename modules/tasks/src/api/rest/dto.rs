use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::contract::model::{
    Analytics, BatchFailure, BatchOutcome, LabelCount, Task, TaskFields, ValidationReport,
};

pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Accept strings, numbers and booleans as text; `null` becomes empty.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

/// Task fields as posted by the browser or produced by the assistant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFieldsDto {
    #[serde(default, deserialize_with = "lenient_string")]
    pub task_title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub priority: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub time_required: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub schedule_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub schedule_from: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub schedule_to: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tag: String,
}

impl From<TaskFieldsDto> for TaskFields {
    fn from(d: TaskFieldsDto) -> Self {
        Self {
            task_title: d.task_title,
            description: d.description,
            priority: d.priority,
            time_required: d.time_required,
            schedule_date: d.schedule_date,
            schedule_from: d.schedule_from,
            schedule_to: d.schedule_to,
            tag: d.tag,
        }
    }
}

impl From<TaskFields> for TaskFieldsDto {
    fn from(f: TaskFields) -> Self {
        Self {
            task_title: f.task_title,
            description: f.description,
            priority: f.priority,
            time_required: f.time_required,
            schedule_date: f.schedule_date,
            schedule_from: f.schedule_from,
            schedule_to: f.schedule_to,
            tag: f.tag,
        }
    }
}

/// Parse a `task` payload. `None` for anything but a non-empty object.
pub fn task_fields_from_value(value: Option<Value>) -> Option<TaskFields> {
    match value {
        Some(Value::Object(map)) if !map.is_empty() => {
            serde_json::from_value::<TaskFieldsDto>(Value::Object(map))
                .ok()
                .map(TaskFields::from)
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskReq {
    #[serde(default)]
    pub task: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchReq {
    #[serde(default)]
    pub tasks: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewReq {
    #[serde(default)]
    pub review: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarQuery {
    pub month: Option<String>,
    pub year: Option<String>,
}

impl CalendarQuery {
    /// `(month, year)` when both parse and the month is 1..=12.
    pub fn parsed(&self) -> Option<(u32, i32)> {
        let month = self.month.as_deref()?.trim().parse::<u32>().ok()?;
        let year = self.year.as_deref()?.trim().parse::<i32>().ok()?;
        (1..=12).contains(&month).then_some((month, year))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskDto {
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
    pub created_at: String,
}

impl From<Task> for TaskDto {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            user_id: t.user_id,
            task_title: t.task_title,
            description: t.description,
            priority: t.priority,
            time_required: t.time_required,
            schedule_date: t.schedule_date,
            schedule_from: t.schedule_from,
            schedule_to: t.schedule_to,
            tag: t.tag,
            review: t.review,
            completed: t.completed,
            created_at: t.created_at.format(CREATED_AT_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskBody {
    pub task: TaskDto,
}

#[derive(Debug, Serialize)]
pub struct TaskListBody {
    pub tasks: Vec<TaskDto>,
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageTaskBody {
    pub message: &'static str,
    pub task: TaskDto,
}

/// Validation answer; `success` mirrors `is_valid` and the status is always 200.
#[derive(Debug, Serialize)]
pub struct ValidateResp {
    pub success: bool,
    pub warnings: Vec<String>,
    pub task: TaskFieldsDto,
}

impl From<ValidationReport> for ValidateResp {
    fn from(r: ValidationReport) -> Self {
        Self {
            success: r.is_valid,
            warnings: r.warnings,
            task: r.normalized.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchFailureDto {
    pub index: usize,
    pub task_title: String,
    pub warnings: Vec<String>,
}

impl From<BatchFailure> for BatchFailureDto {
    fn from(f: BatchFailure) -> Self {
        Self {
            index: f.index,
            task_title: f.task_title,
            warnings: f.warnings,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchBody {
    pub created: Vec<TaskDto>,
    pub failed: Vec<BatchFailureDto>,
}

impl From<BatchOutcome> for BatchBody {
    fn from(o: BatchOutcome) -> Self {
        Self {
            created: o.created.into_iter().map(TaskDto::from).collect(),
            failed: o.failed.into_iter().map(BatchFailureDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PriorityCountDto {
    pub priority: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct TagCountDto {
    pub tag: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsDto {
    pub completion_rate: i64,
    pub priority_distribution: Vec<PriorityCountDto>,
    pub tag_distribution: Vec<TagCountDto>,
    pub total_tasks: i64,
    pub completed_tasks: i64,
}

impl From<Analytics> for AnalyticsDto {
    fn from(a: Analytics) -> Self {
        Self {
            completion_rate: a.completion_rate,
            priority_distribution: a
                .priority_distribution
                .into_iter()
                .map(|LabelCount { label, count }| PriorityCountDto {
                    priority: label,
                    count,
                })
                .collect(),
            tag_distribution: a
                .tag_distribution
                .into_iter()
                .map(|LabelCount { label, count }| TagCountDto { tag: label, count })
                .collect(),
            total_tasks: a.total_tasks,
            completed_tasks: a.completed_tasks,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsBody {
    pub analytics: AnalyticsDto,
}
