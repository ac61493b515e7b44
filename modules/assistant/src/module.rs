use std::sync::Arc;

use accounts::SessionsApi;
use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use axum::Router;
use modkit::{Module, ModuleCtx, RestfulModule};
use tasks::TasksApi;

use crate::config::AssistantConfig;
use crate::contract::client::LlmClient;
use crate::domain::service::Service;
use crate::infra::llm::GeminiClient;

pub const MODULE_NAME: &str = "assistant";

/// LLM-backed assistant endpoints. Uses Gemini unless a client is supplied.
#[derive(Default)]
pub struct AssistantModule {
    llm: Option<Arc<dyn LlmClient>>,
    service: ArcSwapOption<Service>,
}

impl AssistantModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_llm(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm: Some(llm),
            service: ArcSwapOption::empty(),
        }
    }

    fn service(&self) -> anyhow::Result<Arc<Service>> {
        self.service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("{MODULE_NAME} module is not initialized"))
    }
}

#[async_trait]
impl Module for AssistantModule {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        let llm = match &self.llm {
            Some(llm) => llm.clone(),
            None => {
                let cfg = ctx.module_config::<AssistantConfig>();
                let gemini = GeminiClient::new(&cfg)?;
                if gemini.has_api_key() {
                    tracing::info!(model = %cfg.model, "assistant using Gemini");
                } else {
                    tracing::warn!(
                        "no Gemini API key configured; assistant endpoints will answer 502"
                    );
                }
                Arc::new(gemini)
            }
        };

        let tasks = ctx.client_hub().get::<dyn TasksApi>()?;
        self.service.store(Some(Arc::new(Service::new(llm, tasks))));
        Ok(())
    }
}

impl RestfulModule for AssistantModule {
    fn register_rest(&self, ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router> {
        let sessions = ctx.client_hub().get::<dyn SessionsApi>()?;
        crate::api::rest::routes::register_routes(router, self.service()?, sessions)
    }
}
