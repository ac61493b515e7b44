use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{client::SessionsApi, model::SessionUser};
use crate::domain::service::Service;

/// In-process [`SessionsApi`] backed by the accounts service.
pub struct SessionsLocalClient {
    service: Arc<Service>,
}

impl SessionsLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl SessionsApi for SessionsLocalClient {
    async fn resolve(&self, token: &str) -> Option<SessionUser> {
        self.service.resolve_session(token)
    }
}
