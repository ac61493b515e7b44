use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use axum::Router;
use modkit::{DbModule, Module, ModuleCtx, RestfulModule, StatefulModule};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::AccountsConfig;
use crate::contract::client::SessionsApi;
use crate::domain::{service::Service, sessions::SessionStore};
use crate::gateways::local::SessionsLocalClient;
use crate::infra::storage::UsersRepo;

pub const MODULE_NAME: &str = "accounts";

/// Owns the `users` table and the session store, publishes [`SessionsApi`].
#[derive(Default)]
pub struct AccountsModule {
    service: ArcSwapOption<Service>,
    purge_interval: Mutex<Duration>,
    purge_task: Mutex<Option<JoinHandle<()>>>,
}

impl AccountsModule {
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
impl Module for AccountsModule {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        let cfg = ctx.module_config::<AccountsConfig>();
        let db = ctx.db_required()?;

        let sessions = Arc::new(SessionStore::new(Duration::from_secs(cfg.session_ttl_secs)));
        let service = Arc::new(Service::new(
            UsersRepo::new(db.pool().clone()),
            sessions,
            cfg.secure_cookies,
        ));
        self.service.store(Some(service.clone()));
        *self.purge_interval.lock() = Duration::from_secs(cfg.purge_interval_secs.max(1));

        ctx.client_hub()
            .register::<dyn SessionsApi>(Arc::new(SessionsLocalClient::new(service)));
        tracing::info!(
            session_ttl_secs = cfg.session_ttl_secs,
            "accounts module initialized"
        );
        Ok(())
    }
}

#[async_trait]
impl DbModule for AccountsModule {
    async fn migrate(&self, db: &modkit_db::DbHandle) -> anyhow::Result<()> {
        db.run_migrations(sqlx::migrate!("./migrations")).await?;
        Ok(())
    }
}

impl RestfulModule for AccountsModule {
    fn register_rest(&self, ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router> {
        let sessions = ctx.client_hub().get::<dyn SessionsApi>()?;
        crate::api::rest::routes::register_routes(router, self.service()?, sessions)
    }
}

#[async_trait]
impl StatefulModule for AccountsModule {
    /// Sweeps expired sessions in the background until cancelled.
    async fn start(&self, cancel: CancellationToken) -> anyhow::Result<()> {
        let service = self.service()?;
        let every = *self.purge_interval.lock();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(every) => {
                        let purged = service.purge_expired_sessions();
                        if purged > 0 {
                            tracing::debug!(purged, "expired sessions removed");
                        }
                    }
                }
            }
        });
        *self.purge_task.lock() = Some(handle);
        Ok(())
    }

    async fn stop(&self, _cancel: CancellationToken) -> anyhow::Result<()> {
        let handle = self.purge_task.lock().take();
        if let Some(handle) = handle {
            handle.abort();
        }
        Ok(())
    }
}
