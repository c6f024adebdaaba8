use std::env;
use std::fmt;

use crate::error::DbInfraError;

pub const DB_DRIVER: &str = "DB_DRIVER";
pub const DB_HOST: &str = "DB_HOST";
pub const DB_PORT: &str = "DB_PORT";
pub const DB_DATABASE: &str = "DB_DATABASE";
pub const DB_USERNAME: &str = "DB_USERNAME";
pub const DB_PASSWORD: &str = "DB_PASSWORD";

/// Connection parameters, read once at startup and never mutated.
///
/// Only `driver` is mandatory here. Whether an empty host, port or database is
/// acceptable depends on the driver and is checked when connecting.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct DriverConfig {
    pub driver: String,
    pub host: String,
    pub port: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl DriverConfig {
    pub fn new(driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            ..Self::default()
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = port.into();
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Load from the process environment (`DB_DRIVER`, `DB_HOST`, `DB_PORT`,
    /// `DB_DATABASE`, `DB_USERNAME`, `DB_PASSWORD`).
    pub fn from_env() -> Result<Self, DbInfraError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same rules as [`DriverConfig::from_env`] over an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DbInfraError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let driver = must_var(&lookup, DB_DRIVER)?;

        Ok(Self {
            driver,
            host: opt_var(&lookup, DB_HOST),
            port: opt_var(&lookup, DB_PORT),
            database: opt_var(&lookup, DB_DATABASE),
            username: opt_var(&lookup, DB_USERNAME),
            password: opt_var(&lookup, DB_PASSWORD),
        })
    }
}

// Keep the password out of logs and panic messages.
impl fmt::Debug for DriverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverConfig")
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &if self.password.is_empty() { "" } else { "***" })
            .finish()
    }
}

/// Required variable; unset and blank are both configuration errors.
fn must_var<F>(lookup: &F, name: &str) -> Result<String, DbInfraError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        Some(_) => Err(DbInfraError::config(format!(
            "Required environment variable '{name}' is empty"
        ))),
        None => Err(DbInfraError::config(format!(
            "Required environment variable '{name}' is not set"
        ))),
    }
}

fn opt_var<F>(lookup: &F, name: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).unwrap_or_default()
}
