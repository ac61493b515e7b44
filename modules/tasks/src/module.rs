use std::sync::Arc;

use accounts::SessionsApi;
use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use axum::Router;
use modkit::{DbModule, Module, ModuleCtx, RestfulModule};

use crate::contract::client::TasksApi;
use crate::domain::service::Service;
use crate::gateways::local::TasksLocalClient;
use crate::infra::storage::TasksRepo;

pub const MODULE_NAME: &str = "tasks";

/// Owns the `tasks` table and publishes [`TasksApi`].
#[derive(Default)]
pub struct TasksModule {
    service: ArcSwapOption<Service>,
}

impl TasksModule {
    pub fn new() -> Self {
        Self::default()
    }

    fn service(&self) -> anyhow::Result<Arc<Service>> {
        self.service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("{MODULE_NAME} module is not initialized"))
    }
}

#[async_trait]
impl Module for TasksModule {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        let db = ctx.db_required()?;
        let service = Arc::new(Service::new(TasksRepo::new(db.pool().clone())));
        self.service.store(Some(service.clone()));

        ctx.client_hub()
            .register::<dyn TasksApi>(Arc::new(TasksLocalClient::new(service)));
        tracing::info!("tasks module initialized");
        Ok(())
    }
}

#[async_trait]
impl DbModule for TasksModule {
    async fn migrate(&self, db: &modkit_db::DbHandle) -> anyhow::Result<()> {
        db.run_migrations(sqlx::migrate!("./migrations")).await?;
        Ok(())
    }
}

impl RestfulModule for TasksModule {
    fn register_rest(&self, ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router> {
        let sessions = ctx.client_hub().get::<dyn SessionsApi>()?;
        crate::api::rest::routes::register_routes(router, self.service()?, sessions)
    }
}
