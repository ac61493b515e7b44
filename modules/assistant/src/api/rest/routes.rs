use std::sync::Arc;

use accounts::SessionsApi;
use axum::{
    routing::{get, post, put},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::domain::service::Service;

pub fn register_routes(
    router: Router,
    service: Arc<Service>,
    sessions: Arc<dyn SessionsApi>,
) -> anyhow::Result<Router> {
    let api = Router::new()
        .route("/api/process-voice", post(handlers::process_voice))
        .route("/api/llm-assistant", post(handlers::llm_assistant))
        .route("/api/search-task", post(handlers::search_task))
        .route("/api/search-task-date", post(handlers::search_task_date))
        .route(
            "/api/tasks/{id}/update-from-assistant",
            put(handlers::update_from_assistant),
        )
        .route(
            "/api/task-summary",
            get(handlers::task_summary).post(handlers::prompt),
        )
        .layer(Extension(service))
        .layer(Extension(sessions));

    Ok(router.merge(api))
}
