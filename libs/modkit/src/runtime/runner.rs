//! Drives a [`ModuleRegistry`] through its full lifecycle.
//!
//! One base [`ModuleCtx`](crate::ModuleCtx) is built up front and reused by every
//! phase, so the client hub and cancellation token are shared by all modules.

use crate::context::{ConfigProvider, ModuleCtxBuilder};
use crate::registry::ModuleRegistry;
use crate::runtime::shutdown;
use std::{future::Future, pin::Pin, sync::Arc};
use tokio_util::sync::CancellationToken;

pub enum DbOptions {
    /// Modules get no database; `ModuleCtx::db_required()` fails.
    None,
    /// A connected handle shared by all modules; migrations run against it.
    Handle(Arc<modkit_db::DbHandle>),
}

pub enum ShutdownOptions {
    /// SIGINT / SIGTERM.
    Signals,
    /// Caller-owned token.
    Token(CancellationToken),
    /// Shut down when the future completes.
    Future(Pin<Box<dyn Future<Output = ()> + Send>>),
}

pub struct RunOptions {
    pub registry: ModuleRegistry,
    pub modules_cfg: Arc<dyn ConfigProvider>,
    pub db: DbOptions,
    pub shutdown: ShutdownOptions,
}

/// init → migrate → rest → start → wait → stop.
pub async fn run(opts: RunOptions) -> anyhow::Result<()> {
    let RunOptions {
        registry,
        modules_cfg,
        db,
        shutdown,
    } = opts;

    let cancel = match &shutdown {
        ShutdownOptions::Token(t) => t.clone(),
        _ => CancellationToken::new(),
    };

    match shutdown {
        ShutdownOptions::Signals => {
            let c = cancel.clone();
            tokio::spawn(async move {
                if let Err(e) = shutdown::wait_for_shutdown().await {
                    tracing::warn!(error = %e, "signal handler failed; falling back to ctrl_c");
                    let _ = tokio::signal::ctrl_c().await;
                }
                c.cancel();
            });
        }
        ShutdownOptions::Future(waiter) => {
            let c = cancel.clone();
            tokio::spawn(async move {
                waiter.await;
                tracing::info!("shutdown: external future completed");
                c.cancel();
            });
        }
        ShutdownOptions::Token(_) => {}
    }

    let mut builder = ModuleCtxBuilder::new(cancel.clone()).with_config_provider(modules_cfg);
    if let DbOptions::Handle(handle) = &db {
        builder = builder.with_db(handle.clone());
    }
    let base_ctx = builder.build();
    tracing::info!(modules = ?registry.names(), "starting modules");

    tracing::info!("phase: init");
    registry.run_init_phase(&base_ctx).await?;

    if let DbOptions::Handle(handle) = &db {
        tracing::info!("phase: db");
        registry.run_db_phase(handle).await?;
    }

    tracing::info!("phase: rest");
    registry.run_rest_phase(&base_ctx, axum::Router::new())?;

    tracing::info!("phase: start");
    if let Err(e) = registry.run_start_phase(cancel.clone()).await {
        cancel.cancel();
        registry.run_stop_phase(cancel).await;
        return Err(e.into());
    }

    cancel.cancelled().await;

    tracing::info!("phase: stop");
    registry.run_stop_phase(cancel).await;
    Ok(())
}
