use std::sync::Arc;

use accounts::CurrentUser;
use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use modkit::{ApiFailure, ApiJson, ApiResult, ApiSuccess};
use tracing::{error, info};

use crate::api::rest::dto::{
    task_fields_from_value, AnalyticsBody, BatchBody, BatchReq, CalendarQuery, MessageBody,
    MessageTaskBody, ReviewReq, TaskBody, TaskDto, TaskListBody, TaskReq, ValidateResp,
};
use crate::contract::model::TaskFields;
use crate::domain::{error::DomainError, service::Service, validation::validate_task};

const TASK_REQUIRED: &str = "Task data is required";
const NOT_FOUND: &str = "Task not found";
const NOT_FOUND_OR_FORBIDDEN: &str = "Task not found or not authorized";

fn required_fields(req: TaskReq) -> Result<TaskFields, ApiFailure> {
    task_fields_from_value(req.task).ok_or_else(|| ApiFailure::bad_request(TASK_REQUIRED))
}

pub async fn list_tasks(
    Extension(svc): Extension<Arc<Service>>,
    user: CurrentUser,
) -> ApiResult<TaskListBody> {
    let tasks = svc
        .list_tasks(user.id)
        .await
        .map_err(|e| map_domain_error(e, NOT_FOUND))?;
    Ok(ApiSuccess::ok(TaskListBody {
        tasks: tasks.into_iter().map(TaskDto::from).collect(),
    }))
}

pub async fn get_task(
    Extension(svc): Extension<Arc<Service>>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<TaskBody> {
    let task = svc
        .get_task(user.id, id)
        .await
        .map_err(|e| map_domain_error(e, NOT_FOUND))?;
    Ok(ApiSuccess::ok(TaskBody { task: task.into() }))
}

/// Dry run of the field checks. Open to anonymous callers.
/// Dry run: a missing or empty task is validated as an empty field set.
pub async fn validate(ApiJson(req): ApiJson<TaskReq>) -> Json<ValidateResp> {
    let fields = task_fields_from_value(req.task).unwrap_or_default();
    Json(validate_task(&fields).into())
}

pub async fn create_task(
    Extension(svc): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiJson(req): ApiJson<TaskReq>,
) -> ApiResult<TaskBody> {
    let fields = required_fields(req)?;
    let task = svc
        .create_task(user.id, fields)
        .await
        .map_err(|e| map_domain_error(e, NOT_FOUND))?;
    info!(user_id = user.id, task_id = task.id, "task created via REST");
    Ok(ApiSuccess::created(TaskBody { task: task.into() }))
}

pub async fn update_task(
    Extension(svc): Extension<Arc<Service>>,
    user: CurrentUser,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<TaskReq>,
) -> ApiResult<TaskBody> {
    let fields = required_fields(req)?;
    let task = svc
        .update_task(user.id, id, fields)
        .await
        .map_err(|e| map_domain_error(e, NOT_FOUND_OR_FORBIDDEN))?;
    Ok(ApiSuccess::ok(TaskBody { task: task.into() }))
}

pub async fn add_review(
    Extension(svc): Extension<Arc<Service>>,
    user: CurrentUser,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<ReviewReq>,
) -> ApiResult<MessageBody> {
    svc.add_review(user.id, id, req.review.as_deref().unwrap_or_default())
        .await
        .map_err(|e| map_domain_error(e, NOT_FOUND_OR_FORBIDDEN))?;
    Ok(ApiSuccess::ok(MessageBody {
        message: "Review added successfully",
    }))
}

pub async fn toggle_complete(
    Extension(svc): Extension<Arc<Service>>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<MessageTaskBody> {
    let task = svc
        .toggle_complete(user.id, id)
        .await
        .map_err(|e| map_domain_error(e, NOT_FOUND_OR_FORBIDDEN))?;
    Ok(ApiSuccess::ok(MessageTaskBody {
        message: "Task status updated",
        task: task.into(),
    }))
}

pub async fn delete_task(
    Extension(svc): Extension<Arc<Service>>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<MessageBody> {
    svc.delete_task(user.id, id)
        .await
        .map_err(|e| map_domain_error(e, NOT_FOUND_OR_FORBIDDEN))?;
    Ok(ApiSuccess::ok(MessageBody {
        message: "Task deleted successfully",
    }))
}

pub async fn create_batch(
    Extension(svc): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiJson(req): ApiJson<BatchReq>,
) -> ApiResult<BatchBody> {
    let tasks = req
        .tasks
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiFailure::bad_request(TASK_REQUIRED))?;
    let batch = tasks
        .into_iter()
        .map(|v| task_fields_from_value(Some(v)).unwrap_or_default())
        .collect();
    let outcome = svc
        .create_batch(user.id, batch)
        .await
        .map_err(|e| map_domain_error(e, NOT_FOUND))?;
    Ok(ApiSuccess::ok(outcome.into()))
}

pub async fn analytics(
    Extension(svc): Extension<Arc<Service>>,
    user: CurrentUser,
) -> ApiResult<AnalyticsBody> {
    let analytics = svc
        .analytics(user.id)
        .await
        .map_err(|e| map_domain_error(e, NOT_FOUND))?;
    Ok(ApiSuccess::ok(AnalyticsBody {
        analytics: analytics.into(),
    }))
}

pub async fn calendar(
    Extension(svc): Extension<Arc<Service>>,
    user: CurrentUser,
    Query(q): Query<CalendarQuery>,
) -> ApiResult<TaskListBody> {
    let (month, year) = q
        .parsed()
        .ok_or_else(|| ApiFailure::bad_request("Month and year are required"))?;
    let tasks = svc
        .calendar(user.id, month, year)
        .await
        .map_err(|e| map_domain_error(e, NOT_FOUND))?;
    Ok(ApiSuccess::ok(TaskListBody {
        tasks: tasks.into_iter().map(TaskDto::from).collect(),
    }))
}

fn map_domain_error(e: DomainError, not_found: &str) -> ApiFailure {
    match e {
        DomainError::TitleRequired | DomainError::ReviewRequired => {
            ApiFailure::bad_request(e.to_string())
        }
        DomainError::TaskNotFound { .. } => ApiFailure::not_found(not_found),
        DomainError::ValidationFailed { warnings } => {
            ApiFailure::unprocessable("Task has validation warnings").with_warnings(warnings)
        }
        DomainError::UpdateRejected { message } => ApiFailure::unprocessable(message),
        DomainError::Database { .. } => {
            error!(error = %e, "tasks request failed");
            ApiFailure::internal()
        }
    }
}
