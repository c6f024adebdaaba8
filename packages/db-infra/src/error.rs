use thiserror::Error;

/// Errors raised by the connection lifecycle.
///
/// `Clone` because the registry stores the outcome of its single
/// initialization attempt and hands the same error to every caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DbInfraError {
    #[error("Configuration error: {message}")]
    Config { message: String },
    #[error("unsupported driver: {driver}")]
    UnsupportedDriver { driver: String },
    #[error("driver not implemented: {driver}")]
    NotImplemented { driver: String },
    #[error("failed to connect to {driver}: {message}")]
    Connection { driver: String, message: String },
    #[error("Migration error: {message}")]
    Migration { message: String },
    #[error("database is not initialized; call initialize() first")]
    NotInitialized,
    #[error("database ping failed: {message}")]
    Probe { message: String },
}

impl DbInfraError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn connection(driver: &str, cause: impl std::fmt::Display) -> Self {
        Self::Connection {
            driver: driver.to_string(),
            message: cause.to_string(),
        }
    }

    pub fn migration(cause: impl std::fmt::Display) -> Self {
        Self::Migration {
            message: cause.to_string(),
        }
    }

    pub fn probe(cause: impl std::fmt::Display) -> Self {
        Self::Probe {
            message: cause.to_string(),
        }
    }

    /// Startup-phase errors end the process; probe-phase errors are reported
    /// as a degraded status and the process keeps serving.
    pub fn is_startup_fatal(&self) -> bool {
        !matches!(self, Self::Probe { .. } | Self::NotInitialized)
    }
}
