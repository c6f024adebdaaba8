use std::fmt;

use tracing::{debug, warn};

use crate::error::DbInfraError;
use crate::infra::db::registry::Database;

/// Database reachability as reported to callers of the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbStatus {
    Connected,
    NotConnected,
}

impl DbStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DbStatus::Connected => "Connected",
            DbStatus::NotConnected => "Not Connected",
        }
    }
}

impl fmt::Display for DbStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one liveness probe. Produced fresh on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub reachable: bool,
    pub detail: String,
    pub error: Option<DbInfraError>,
}

impl HealthStatus {
    fn connected() -> Self {
        Self {
            reachable: true,
            detail: "connected".to_string(),
            error: None,
        }
    }

    fn not_connected(error: DbInfraError) -> Self {
        Self {
            reachable: false,
            detail: format!("not connected: {error}"),
            error: Some(error),
        }
    }

    pub fn status(&self) -> DbStatus {
        if self.reachable {
            DbStatus::Connected
        } else {
            DbStatus::NotConnected
        }
    }
}

/// Ping the registry's handle.
///
/// A missing handle or a failed ping is reported, not repaired: the registry
/// is left untouched and no reconnect is attempted.
pub async fn check(db: &Database) -> HealthStatus {
    let handle = match db.get() {
        Ok(handle) => handle,
        Err(e) => {
            warn!("probe=unavailable err={}", e);
            return HealthStatus::not_connected(e);
        }
    };

    match handle.ping().await {
        Ok(()) => {
            debug!("probe=ok engine={}", handle.engine());
            HealthStatus::connected()
        }
        Err(e) => {
            warn!("probe=failed engine={} err={}", handle.engine(), e);
            HealthStatus::not_connected(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::db::DriverConfig;
    use crate::infra::db::registry::RegistryState;

    #[test]
    fn test_status_strings() {
        assert_eq!(DbStatus::Connected.to_string(), "Connected");
        assert_eq!(DbStatus::NotConnected.to_string(), "Not Connected");
    }

    #[tokio::test]
    async fn test_check_before_initialize_reports_not_connected() {
        let db = Database::with_config(DriverConfig::new("sqlite").with_database(":memory:"));

        let status = check(&db).await;

        assert!(!status.reachable);
        assert_eq!(status.status(), DbStatus::NotConnected);
        assert_eq!(status.error, Some(DbInfraError::NotInitialized));
        // Probing must not trigger initialization
        assert_eq!(db.state(), RegistryState::Uninitialized);
    }

    #[tokio::test]
    async fn test_check_after_initialize_reports_connected() {
        let db = Database::with_config(DriverConfig::new("sqlite").with_database(":memory:"));
        db.initialize().await.unwrap();

        let status = check(&db).await;

        assert!(status.reachable);
        assert_eq!(status.status(), DbStatus::Connected);
        assert_eq!(status.error, None);
    }
}
