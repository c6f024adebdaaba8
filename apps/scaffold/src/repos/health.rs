use async_trait::async_trait;
use db_infra::HealthStatus;

/// Reachability of the backing store.
#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn check_database(&self) -> HealthStatus;
}
