//! Error types for the circulation desk client

use reqwest::StatusCode;
use thiserror::Error;

use crate::models::status::{CirculationAction, CirculationStatus};

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Code does not match: expected ISBN {expected}, got {entered}")]
    IsbnMismatch { expected: String, entered: String },

    #[error("Invalid transition: {action} is not allowed from {from}")]
    InvalidTransition {
        from: CirculationStatus,
        action: CirculationAction,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Remote API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl AppError {
    /// Whether the operator can recover by correcting input and resubmitting,
    /// without any remote state having changed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::IsbnMismatch { .. }
                | AppError::InvalidTransition { .. }
        )
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
