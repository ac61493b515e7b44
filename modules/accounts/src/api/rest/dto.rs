use serde::{Deserialize, Serialize};

use crate::contract::model::SessionUser;

/// Body of `/signup` and `/login`. Missing fields are reported by the service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsReq {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ack {}

#[derive(Debug, Clone, Serialize)]
pub struct MessageDto {
    pub message: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    pub id: i64,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeDto {
    pub user: UserDto,
}

impl From<SessionUser> for UserDto {
    fn from(u: SessionUser) -> Self {
        Self {
            id: u.id,
            email: u.email,
        }
    }
}
