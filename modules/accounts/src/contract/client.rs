use async_trait::async_trait;

use crate::contract::model::SessionUser;

/// Session lookup for modules that need to authenticate requests.
#[async_trait]
pub trait SessionsApi: Send + Sync {
    /// The user owning `token`, or `None` when the session is unknown or expired.
    async fn resolve(&self, token: &str) -> Option<SessionUser>;
}
