//! Health domain service.

use std::sync::Arc;

use db_infra::DbStatus;
use tracing::warn;

use crate::repos::health::HealthRepo;

/// Outcome of one health check, ready for the route to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub database: DbStatus,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.database == DbStatus::Connected
    }
}

pub struct HealthService {
    repo: Arc<dyn HealthRepo>,
}

impl HealthService {
    pub fn new(repo: Arc<dyn HealthRepo>) -> Self {
        Self { repo }
    }

    pub async fn check_health(&self) -> HealthReport {
        let status = self.repo.check_database().await;
        if !status.reachable {
            warn!("health=degraded database=\"{}\"", status.detail);
        }
        HealthReport {
            database: status.status(),
        }
    }
}
