use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tasks::{validate_task, Task, TaskFields, TasksApi, ValidationReport, SENTINEL};
use tracing::{debug, info, instrument};

use crate::contract::client::LlmClient;
use crate::domain::{error::AssistantError, extraction, prompts};

pub const CREATE_TASK: &str = "CREATE_TASK";
pub const MODIFY_TASK: &str = "MODIFY_TASK";
pub const ADD_REVIEW: &str = "ADD_REVIEW";

pub const NO_TASKS_SUMMARY: &str = "Example summary: You don't have any tasks scheduled for today. Great job staying organized!";

pub type Clock = fn() -> NaiveDateTime;

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Classified input plus the validated field extraction.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub intent: String,
    pub report: ValidationReport,
}

#[derive(Debug, Clone)]
pub enum AssistantReply {
    Create(Extraction),
    Modify {
        intent: String,
        task_title: String,
    },
    Review {
        intent: String,
        task_title: String,
        scheduled_date: String,
    },
}

#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Title(String),
    Proposal { original: Task, proposed: Task },
}

fn required<'a>(value: &'a str, message: &'static str) -> Result<&'a str, AssistantError> {
    let value = value.trim();
    if value.is_empty() {
        Err(AssistantError::MissingInput(message))
    } else {
        Ok(value)
    }
}

fn with_fields(mut task: Task, f: TaskFields) -> Task {
    task.task_title = f.task_title;
    task.description = f.description;
    task.priority = f.priority;
    task.time_required = f.time_required;
    task.schedule_date = f.schedule_date;
    task.schedule_from = f.schedule_from;
    task.schedule_to = f.schedule_to;
    task.tag = f.tag;
    task
}

/// Natural-language flows on top of the model and the task store.
pub struct Service {
    llm: Arc<dyn LlmClient>,
    tasks: Arc<dyn TasksApi>,
    clock: Clock,
}

impl Service {
    pub fn new(llm: Arc<dyn LlmClient>, tasks: Arc<dyn TasksApi>) -> Self {
        Self {
            llm,
            tasks,
            clock: local_now,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn today(&self) -> String {
        (self.clock)().format(prompts::SHORT_DATE).to_string()
    }

    async fn ask(&self, prompt: &str) -> Result<String, AssistantError> {
        Ok(self.llm.complete(prompt).await?.trim().to_string())
    }

    async fn classify(&self, prompt: &str) -> Result<String, AssistantError> {
        Ok(self.ask(prompt).await?.to_uppercase())
    }

    async fn extract(&self, text: &str) -> Result<ValidationReport, AssistantError> {
        let raw = self.ask(&prompts::extract_task(text, (self.clock)())).await?;
        let fields = extraction::task_fields(&extraction::json_block(&raw));
        Ok(validate_task(&fields))
    }

    async fn extract_title(&self, query: &str) -> Result<String, AssistantError> {
        self.ask(&prompts::extract_title(query)).await
    }

    /// Classify a dictated note and extract task fields from it.
    #[instrument(skip_all)]
    pub async fn process_voice(&self, text: &str) -> Result<Extraction, AssistantError> {
        let text = required(text, "Text input is required")?;
        let intent = self.classify(&prompts::classify_voice(text)).await?;
        let report = self.extract(text).await?;
        debug!(%intent, is_valid = report.is_valid, "voice input processed");
        Ok(Extraction { intent, report })
    }

    #[instrument(skip_all)]
    pub async fn assist(&self, prompt: &str) -> Result<AssistantReply, AssistantError> {
        let prompt = required(prompt, "Prompt is required")?;
        let intent = self.classify(&prompts::classify_assistant(prompt)).await?;
        info!(%intent, "assistant prompt classified");

        match intent.as_str() {
            CREATE_TASK => {
                let report = self.extract(prompt).await?;
                Ok(AssistantReply::Create(Extraction { intent, report }))
            }
            MODIFY_TASK => {
                let task_title = self.extract_title(prompt).await?;
                Ok(AssistantReply::Modify { intent, task_title })
            }
            ADD_REVIEW => {
                let raw = self
                    .ask(&prompts::identify_review_target(prompt, (self.clock)()))
                    .await?;
                let found = extraction::json_block(&raw);
                let task_title = match extraction::field(&found, "task_title") {
                    t if t == SENTINEL => String::new(),
                    t => t,
                };
                let scheduled_date = match extraction::field(&found, "scheduled_date") {
                    d if d == SENTINEL || d.is_empty() => self.today(),
                    d => d,
                };
                Ok(AssistantReply::Review {
                    intent,
                    task_title,
                    scheduled_date,
                })
            }
            _ => Err(AssistantError::UnrecognizedIntent { intent }),
        }
    }

    /// Find the task an update request refers to and propose the new values.
    #[instrument(skip(self, query))]
    pub async fn search_task(
        &self,
        user_id: i64,
        query: &str,
        title_only: bool,
    ) -> Result<SearchOutcome, AssistantError> {
        let query = required(query, "Search query is required")?;
        let title = self.extract_title(query).await?;
        if title_only {
            return Ok(SearchOutcome::Title(title));
        }

        let original = self
            .tasks
            .find_by_title(user_id, &title)
            .await?
            .ok_or(AssistantError::NoMatchingTask)?;

        let raw = self
            .ask(&prompts::parse_update(query, (self.clock)()))
            .await?;
        let updates = extraction::json_block(&raw);
        let proposed = extraction::overlay(&original.fields(), &updates);
        Ok(SearchOutcome::Proposal {
            proposed: with_fields(original.clone(), proposed),
            original,
        })
    }

    /// Locate a task by title and date and draft a review for it from `prompt`.
    #[instrument(skip(self, prompt))]
    pub async fn draft_review(
        &self,
        user_id: i64,
        title: &str,
        date: &str,
        prompt: &str,
    ) -> Result<(Task, String), AssistantError> {
        const MESSAGE: &str = "Task title and date are required";
        let title = required(title, MESSAGE)?;
        let date = required(date, MESSAGE)?;

        let task = self
            .tasks
            .find_by_title_and_date(user_id, title, date)
            .await?
            .ok_or(AssistantError::NoMatchingTask)?;
        let review = extraction::strip_quotes(&self.ask(&prompts::write_review(prompt)).await?);
        Ok((task, review))
    }

    /// Overwrite a task with fields confirmed by the user.
    #[instrument(skip(self, fields))]
    pub async fn apply_update(
        &self,
        user_id: i64,
        task_id: i64,
        fields: TaskFields,
    ) -> Result<Task, AssistantError> {
        required(&fields.task_title, "Task title is required")?;
        let task = self
            .tasks
            .overwrite_checked(user_id, task_id, fields)
            .await?;
        info!(task_id, "task updated from assistant");
        Ok(task)
    }

    pub async fn daily_summary(&self, user_id: i64) -> Result<String, AssistantError> {
        let today = self.tasks.tasks_on_date(user_id, &self.today()).await?;
        if today.is_empty() {
            return Ok(NO_TASKS_SUMMARY.to_string());
        }
        self.ask(&prompts::daily_summary(&today)).await
    }

    /// Send `prompt` to the model unchanged.
    pub async fn passthrough(&self, prompt: &str) -> Result<String, AssistantError> {
        let prompt = required(prompt, "Prompt is required")?;
        self.ask(prompt).await
    }
}
