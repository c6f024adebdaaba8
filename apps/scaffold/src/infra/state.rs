use std::sync::Arc;

use db_infra::{Database, DriverConfig};
use tracing::info;

use crate::adapters::health_db::HealthRepoDb;
use crate::error::AppError;
use crate::repos::health::HealthRepo;
use crate::services::health::HealthService;
use crate::state::app_state::AppState;

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    db: Option<Arc<Database>>,
    health_repo: Option<Arc<dyn HealthRepo>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            db: None,
            health_repo: None,
        }
    }

    /// Use an existing registry instead of reading `DB_*` from the environment.
    pub fn with_database(mut self, db: Arc<Database>) -> Self {
        self.db = Some(db);
        self
    }

    pub fn with_db_config(self, cfg: DriverConfig) -> Self {
        self.with_database(Arc::new(Database::with_config(cfg)))
    }

    /// Replace the registry-backed health repository.
    pub fn with_health_repo(mut self, repo: Arc<dyn HealthRepo>) -> Self {
        self.health_repo = Some(repo);
        self
    }

    /// Initialize the registry (config, connect, migrate) and wire the health stack.
    pub async fn build(self) -> Result<AppState, AppError> {
        let db = self.db.unwrap_or_else(|| Arc::new(Database::from_env()));

        db.initialize().await?;
        info!("state=ready db_state={:?}", db.state());

        let repo: Arc<dyn HealthRepo> = match self.health_repo {
            Some(repo) => repo,
            None => Arc::new(HealthRepoDb::new(Arc::clone(&db))),
        };

        Ok(AppState::new(db, HealthService::new(repo)))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
