use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::contract::client::SessionsApi;
use crate::domain::service::Service;

pub fn register_routes(
    router: Router,
    service: Arc<Service>,
    sessions: Arc<dyn SessionsApi>,
) -> anyhow::Result<Router> {
    let api = Router::new()
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login))
        .route("/logout", get(handlers::logout).post(handlers::logout))
        .route("/api/me", get(handlers::me))
        .layer(Extension(service))
        .layer(Extension(sessions));

    Ok(router.merge(api))
}
