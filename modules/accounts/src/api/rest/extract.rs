use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts, RequestPartsExt};
use modkit::ApiFailure;
use tower_cookies::{cookie::SameSite, Cookie, Cookies};

use crate::contract::client::SessionsApi;

pub const SESSION_COOKIE: &str = "taskmind_session";

/// HttpOnly session cookie scoped to the whole site.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Cookie that tells the browser to drop the session cookie.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

/// The authenticated caller.
///
/// Requires `Extension<Arc<dyn SessionsApi>>` on the route and the cookie
/// manager layer on the router; rejects with 401 otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiFailure;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(sessions) = parts.extensions.get::<Arc<dyn SessionsApi>>().cloned() else {
            tracing::error!("SessionsApi extension missing on an authenticated route");
            return Err(ApiFailure::internal());
        };

        let cookies = parts.extract::<Cookies>().await.map_err(|(_, msg)| {
            tracing::error!(error = msg, "cookie manager layer missing");
            ApiFailure::internal()
        })?;

        let token = cookies
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_owned())
            .ok_or_else(ApiFailure::unauthorized)?;

        let user = sessions
            .resolve(&token)
            .await
            .ok_or_else(ApiFailure::unauthorized)?;

        Ok(CurrentUser {
            id: user.id,
            email: user.email,
        })
    }
}
