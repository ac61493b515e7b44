use std::sync::Arc;

use axum::Extension;
use modkit::{ApiFailure, ApiJson, ApiResult, ApiSuccess};
use tower_cookies::Cookies;
use tracing::error;

use crate::api::rest::dto::{Ack, CredentialsReq, MeDto, MessageDto, UserDto};
use crate::api::rest::extract::{removal_cookie, session_cookie, CurrentUser, SESSION_COOKIE};
use crate::domain::{error::AccountsError, service::Service};

/// Create an account and start a session for it.
pub async fn signup(
    Extension(svc): Extension<Arc<Service>>,
    cookies: Cookies,
    ApiJson(req): ApiJson<CredentialsReq>,
) -> ApiResult<Ack> {
    let outcome = svc
        .signup(
            req.email.as_deref().unwrap_or_default(),
            req.password.as_deref().unwrap_or_default(),
        )
        .await
        .map_err(map_domain_error)?;
    cookies.add(session_cookie(outcome.token, svc.secure_cookies()));
    Ok(ApiSuccess::ok(Ack {}))
}

pub async fn login(
    Extension(svc): Extension<Arc<Service>>,
    cookies: Cookies,
    ApiJson(req): ApiJson<CredentialsReq>,
) -> ApiResult<Ack> {
    let outcome = svc
        .login(
            req.email.as_deref().unwrap_or_default(),
            req.password.as_deref().unwrap_or_default(),
        )
        .await
        .map_err(map_domain_error)?;
    cookies.add(session_cookie(outcome.token, svc.secure_cookies()));
    Ok(ApiSuccess::ok(Ack {}))
}

/// Always succeeds, even without a session.
pub async fn logout(
    Extension(svc): Extension<Arc<Service>>,
    cookies: Cookies,
) -> ApiResult<MessageDto> {
    if let Some(c) = cookies.get(SESSION_COOKIE) {
        svc.logout(c.value());
    }
    cookies.remove(removal_cookie());
    Ok(ApiSuccess::ok(MessageDto {
        message: "Logged out",
    }))
}

pub async fn me(user: CurrentUser) -> ApiResult<MeDto> {
    Ok(ApiSuccess::ok(MeDto {
        user: UserDto {
            id: user.id,
            email: user.email,
        },
    }))
}

fn map_domain_error(e: AccountsError) -> ApiFailure {
    match e {
        AccountsError::MissingCredentials => ApiFailure::bad_request(e.to_string()),
        AccountsError::EmailAlreadyExists { .. } => ApiFailure::conflict(e.to_string()),
        AccountsError::InvalidCredentials => ApiFailure::new(
            axum::http::StatusCode::UNAUTHORIZED,
            "Invalid credentials",
        ),
        AccountsError::Hashing { .. } | AccountsError::Database { .. } => {
            error!(error = %e, "accounts request failed");
            ApiFailure::internal()
        }
    }
}
