use serde::{Deserialize, Serialize};
use tasks::api::rest::dto::{TaskDto, TaskFieldsDto};

use crate::domain::service::Extraction;

#[derive(Debug, Deserialize)]
pub struct VoiceReq {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct PromptReq {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchReq {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub extract_title_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchDateReq {
    #[serde(default)]
    pub task_title: String,
    #[serde(default)]
    pub schedule_date: String,
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractionBody {
    pub intent: String,
    pub task_data: TaskFieldsDto,
    pub is_valid: bool,
    pub warnings: Vec<String>,
}

impl From<Extraction> for ExtractionBody {
    fn from(e: Extraction) -> Self {
        Self {
            intent: e.intent,
            task_data: e.report.normalized.into(),
            is_valid: e.report.is_valid,
            warnings: e.report.warnings,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModifyBody {
    pub intent: String,
    pub task_title: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReviewTargetBody {
    pub intent: String,
    pub task_title: String,
    pub scheduled_date: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TitleBody {
    pub task_title: String,
}

#[derive(Debug, Serialize)]
pub struct ProposalBody {
    pub original_task: TaskDto,
    pub proposed_updates: TaskDto,
}

#[derive(Debug, Serialize)]
pub struct DraftReviewBody {
    pub task: TaskDto,
    pub review: String,
}

#[derive(Debug, Serialize)]
pub struct UpdatedBody {
    pub message: &'static str,
    pub task: TaskDto,
}

#[derive(Debug, Serialize)]
pub struct SummaryBody {
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct ResponseBody {
    pub response: String,
}
