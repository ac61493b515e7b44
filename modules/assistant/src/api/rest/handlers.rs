use std::sync::Arc;

use accounts::CurrentUser;
use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
};
use modkit::{ApiFailure, ApiJson, ApiResult, ApiSuccess};
use tasks::api::rest::dto::{task_fields_from_value, TaskReq};
use tracing::{error, warn};

use crate::api::rest::dto::{
    DraftReviewBody, ExtractionBody, ModifyBody, PromptReq, ProposalBody, ResponseBody,
    ReviewTargetBody, SearchDateReq, SearchReq, SummaryBody, TitleBody, UpdatedBody, VoiceReq,
};
use crate::domain::{
    error::AssistantError,
    service::{AssistantReply, SearchOutcome, Service},
};

pub async fn process_voice(
    Extension(svc): Extension<Arc<Service>>,
    _user: CurrentUser,
    ApiJson(req): ApiJson<VoiceReq>,
) -> ApiResult<ExtractionBody> {
    let extraction = svc.process_voice(&req.text).await.map_err(map_error)?;
    Ok(ApiSuccess::ok(extraction.into()))
}

pub async fn llm_assistant(
    Extension(svc): Extension<Arc<Service>>,
    _user: CurrentUser,
    ApiJson(req): ApiJson<PromptReq>,
) -> Result<Response, ApiFailure> {
    let reply = svc.assist(&req.prompt).await.map_err(map_error)?;
    Ok(match reply {
        AssistantReply::Create(extraction) => {
            ApiSuccess::ok(ExtractionBody::from(extraction)).into_response()
        }
        AssistantReply::Modify { intent, task_title } => ApiSuccess::ok(ModifyBody {
            intent,
            task_title,
            message: "Please confirm the task title:",
        })
        .into_response(),
        AssistantReply::Review {
            intent,
            task_title,
            scheduled_date,
        } => ApiSuccess::ok(ReviewTargetBody {
            intent,
            task_title,
            scheduled_date,
            message: "Please confirm the task title and scheduled date:",
        })
        .into_response(),
    })
}

pub async fn search_task(
    Extension(svc): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiJson(req): ApiJson<SearchReq>,
) -> Result<Response, ApiFailure> {
    let outcome = svc
        .search_task(user.id, &req.query, req.extract_title_only)
        .await
        .map_err(map_error)?;
    Ok(match outcome {
        SearchOutcome::Title(task_title) => ApiSuccess::ok(TitleBody { task_title }).into_response(),
        SearchOutcome::Proposal { original, proposed } => ApiSuccess::ok(ProposalBody {
            original_task: original.into(),
            proposed_updates: proposed.into(),
        })
        .into_response(),
    })
}

pub async fn search_task_date(
    Extension(svc): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiJson(req): ApiJson<SearchDateReq>,
) -> ApiResult<DraftReviewBody> {
    let (task, review) = svc
        .draft_review(user.id, &req.task_title, &req.schedule_date, &req.prompt)
        .await
        .map_err(map_error)?;
    Ok(ApiSuccess::ok(DraftReviewBody {
        task: task.into(),
        review,
    }))
}

pub async fn update_from_assistant(
    Extension(svc): Extension<Arc<Service>>,
    user: CurrentUser,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<TaskReq>,
) -> ApiResult<UpdatedBody> {
    let fields = task_fields_from_value(req.task)
        .ok_or_else(|| ApiFailure::bad_request("Task data is required"))?;
    let task = svc
        .apply_update(user.id, id, fields)
        .await
        .map_err(map_error)?;
    Ok(ApiSuccess::ok(UpdatedBody {
        message: "Task updated successfully",
        task: task.into(),
    }))
}

pub async fn task_summary(
    Extension(svc): Extension<Arc<Service>>,
    user: CurrentUser,
) -> ApiResult<SummaryBody> {
    let summary = svc.daily_summary(user.id).await.map_err(map_error)?;
    Ok(ApiSuccess::ok(SummaryBody { summary }))
}

/// Free-form prompt. Model failures answer 500 with an `error` field.
pub async fn prompt(
    Extension(svc): Extension<Arc<Service>>,
    _user: CurrentUser,
    ApiJson(req): ApiJson<PromptReq>,
) -> ApiResult<ResponseBody> {
    match svc.passthrough(&req.prompt).await {
        Ok(response) => Ok(ApiSuccess::ok(ResponseBody { response })),
        Err(AssistantError::Llm(e)) => {
            warn!(error = %e, "prompt passthrough failed");
            Err(ApiFailure::new(StatusCode::INTERNAL_SERVER_ERROR, "LLM request failed")
                .with_field("error", e.to_string()))
        }
        Err(e) => Err(map_error(e)),
    }
}

fn map_error(e: AssistantError) -> ApiFailure {
    match e {
        AssistantError::MissingInput(message) => ApiFailure::bad_request(message),
        AssistantError::UnrecognizedIntent { intent } => {
            ApiFailure::unprocessable("Unrecognized intent").with_field("intent", intent)
        }
        AssistantError::NoMatchingTask | AssistantError::TaskNotFound => {
            ApiFailure::not_found(e.to_string())
        }
        AssistantError::Rejected { message } => ApiFailure::unprocessable(message),
        AssistantError::Llm(inner) => {
            warn!(error = %inner, "LLM call failed");
            ApiFailure::bad_gateway(inner.to_string())
        }
        AssistantError::Internal { .. } => {
            error!(error = %e, "assistant request failed");
            ApiFailure::internal()
        }
    }
}
