use std::env;

use crate::error::AppError;

pub const APP_HOST: &str = "APP_HOST";
pub const APP_PORT: &str = "APP_PORT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// HTTP bind address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// `APP_HOST` / `APP_PORT`, falling back to `0.0.0.0:8080`.
    pub fn from_env() -> Result<Self, AppError> {
        let host = env::var(APP_HOST)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match env::var(APP_PORT) {
            Ok(raw) if !raw.trim().is_empty() => parse_port(&raw)?,
            _ => DEFAULT_PORT,
        };

        Ok(Self { host, port })
    }
}

fn parse_port(raw: &str) -> Result<u16, AppError> {
    match raw.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(AppError::config(format!(
            "{APP_PORT} must be a valid port number, got '{raw}'"
        ))),
        Ok(port) => Ok(port),
    }
}
