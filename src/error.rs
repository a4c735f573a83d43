// SPDX-License-Identifier: MIT

//! Application error types with stable error codes for the request layer.

use crate::db::StoreError;

/// Core error type. The embedding request layer maps these onto its wire
/// format via [`AppError::code`].
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("No workouts configured for this user")]
    NoWorkoutsConfigured,

    #[error("Already at the beginning")]
    AlreadyAtStart,

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::NoWorkoutsConfigured => "no_workouts_configured",
            AppError::AlreadyAtStart => "already_at_start",
            AppError::Validation(_) => "bad_request",
            AppError::Store(_) => "storage_error",
            AppError::Internal(_) => "internal_error",
        }
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, AppError>;
