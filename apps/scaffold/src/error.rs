use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use db_infra::DbInfraError;
use thiserror::Error;
use tracing::error;

use crate::web::envelope;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Database unavailable: {detail}")]
    DbUnavailable { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn db_unavailable(detail: impl Into<String>) -> Self {
        Self::DbUnavailable {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::DbUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Internal details stay in the logs.
    fn public_message(&self) -> &str {
        match self {
            AppError::Config { .. } => "Service is misconfigured",
            AppError::DbUnavailable { .. } => "Database is unavailable",
            AppError::Internal { .. } => "Internal server error",
        }
    }
}

impl From<DbInfraError> for AppError {
    fn from(e: DbInfraError) -> Self {
        match e {
            DbInfraError::Config { message } => AppError::config(message),
            DbInfraError::UnsupportedDriver { .. } | DbInfraError::NotImplemented { .. } => {
                AppError::config(e.to_string())
            }
            DbInfraError::Connection { .. }
            | DbInfraError::NotInitialized
            | DbInfraError::Probe { .. } => AppError::db_unavailable(e.to_string()),
            DbInfraError::Migration { .. } => AppError::internal(e.to_string()),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        if status.is_server_error() {
            error!("request_failed status={} err={}", status.as_u16(), self);
        }
        envelope::error::<()>(status, self.public_message(), None)
    }
}
