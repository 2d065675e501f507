//! Circulation Desk Workflow Client
//!
//! Client-side orchestration of the borrow/reservation lifecycle for a
//! library management system: verification gating, state transitions, and
//! the operator's check-out/check-in queues. The authority for all state is
//! a remote HTTPS JSON REST API; this crate holds transient, read-mostly
//! copies and issues single-shot transition calls.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod models;
pub mod remote;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared by the screens of an embedding client
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Wire the full client from configuration.
    pub fn from_config(config: AppConfig) -> AppResult<Self> {
        let http = remote::HttpClient::new(&config.api, &config.auth)?;
        let services = services::Services::new(remote::RemoteApi::new(http));

        Ok(Self {
            config: Arc::new(config),
            services: Arc::new(services),
        })
    }
}
