//! Database-backed health repository.

use std::sync::Arc;

use async_trait::async_trait;
use db_infra::{check, Database, HealthStatus};

use crate::repos::health::HealthRepo;

/// Probes the shared [`Database`] registry on every call.
#[derive(Debug, Clone)]
pub struct HealthRepoDb {
    db: Arc<Database>,
}

impl HealthRepoDb {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HealthRepo for HealthRepoDb {
    async fn check_database(&self) -> HealthStatus {
        check(&self.db).await
    }
}

#[cfg(test)]
mod tests {
    use db_infra::{DbStatus, DriverConfig};

    use super::*;

    #[tokio::test]
    async fn test_uninitialized_registry_reports_not_connected() {
        let db = Arc::new(Database::with_config(
            DriverConfig::new("sqlite").with_database(":memory:"),
        ));
        let repo = HealthRepoDb::new(db);

        assert_eq!(repo.check_database().await.status(), DbStatus::NotConnected);
    }

    #[tokio::test]
    async fn test_initialized_registry_reports_connected() {
        let db = Arc::new(Database::with_config(
            DriverConfig::new("sqlite").with_database(":memory:"),
        ));
        db.initialize().await.unwrap();
        let repo = HealthRepoDb::new(db);

        assert_eq!(repo.check_database().await.status(), DbStatus::Connected);
    }
}
