//! # ModKit
//!
//! Small module runtime used by the TaskMind server. Feature modules implement
//! [`Module`] plus any of the optional capabilities ([`DbModule`], [`RestfulModule`],
//! [`RestHostModule`], [`StatefulModule`]) and are registered explicitly with a
//! [`RegistryBuilder`]. The runner drives them through the phases
//! init → migrate → REST wiring → start → (wait) → stop.
//!
//! Modules talk to each other only through trait objects published in the
//! [`ClientHub`].

pub use anyhow::Result;
pub use async_trait::async_trait;

pub mod api;
pub mod client_hub;
pub mod context;
pub mod contracts;
pub mod http;
pub mod registry;
pub mod runtime;

pub use api::envelope::{ApiFailure, ApiResult, ApiSuccess};
pub use api::extract::ApiJson;
pub use client_hub::{ClientHub, ClientHubError};
pub use context::{ConfigProvider, ModuleCtx, ModuleCtxBuilder};
pub use contracts::*;
pub use http::client::TracedClient;
pub use registry::{ModuleEntry, ModuleRegistry, RegistryBuilder, RegistryError};
pub use runtime::{run, DbOptions, RunOptions, ShutdownOptions};
