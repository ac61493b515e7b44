//! User accounts: signup, login, logout and cookie sessions.
//!
//! Other modules authenticate requests through the [`CurrentUser`] extractor,
//! which resolves the session cookie against the [`SessionsApi`] published in
//! the client hub.

pub mod api;
pub mod config;
pub mod contract;
pub mod domain;
pub mod gateways;
pub mod infra;
mod module;

pub use api::rest::extract::{CurrentUser, SESSION_COOKIE};
pub use config::AccountsConfig;
pub use contract::{client::SessionsApi, model::SessionUser};
pub use module::{AccountsModule, MODULE_NAME};
