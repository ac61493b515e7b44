use std::sync::Arc;

use accounts::SessionsApi;
use axum::{
    routing::{get, post},
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
        .route(
            "/api/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route("/api/tasks/batch", post(handlers::create_batch))
        .route(
            "/api/tasks/{id}",
            get(handlers::get_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .route("/api/tasks/{id}/review", post(handlers::add_review))
        .route("/api/tasks/{id}/complete", post(handlers::toggle_complete))
        .route("/api/validate-task", post(handlers::validate))
        .route("/api/analytics", get(handlers::analytics))
        .route("/api/calendar-tasks", get(handlers::calendar))
        .layer(Extension(service))
        .layer(Extension(sessions));

    Ok(router.merge(api))
}
