use std::sync::Arc;

use db_infra::Database;

use crate::services::health::HealthService;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Process-wide database registry
    pub db: Arc<Database>,
    pub health: Arc<HealthService>,
}

impl AppState {
    pub fn new(db: Arc<Database>, health: HealthService) -> Self {
        Self {
            db,
            health: Arc::new(health),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").field("db", &self.db).finish_non_exhaustive()
    }
}
