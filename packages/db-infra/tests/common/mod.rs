#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use db_infra::infra::db::DriverBootstrap;
use db_infra::{Bootstrap, DbHandle, DbInfraError, DriverConfig};
use tokio::sync::Notify;

#[ctor::ctor]
fn init_logging() {
    scaffold_test_support::logging::init();
}

pub fn sqlite_memory() -> DriverConfig {
    DriverConfig::new("sqlite").with_database(":memory:")
}

/// Counts connect attempts and delegates to the real driver bootstrap.
///
/// The delay widens the window in which concurrent callers pile up on the
/// first attempt.
pub struct CountingBootstrap {
    pub connects: AtomicUsize,
    pub migrations: AtomicUsize,
    delay: Duration,
}

impl CountingBootstrap {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            connects: AtomicUsize::new(0),
            migrations: AtomicUsize::new(0),
            delay,
        })
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn migrations(&self) -> usize {
        self.migrations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Bootstrap for CountingBootstrap {
    async fn connect(&self, cfg: &DriverConfig) -> Result<DbHandle, DbInfraError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        DriverBootstrap.connect(cfg).await
    }

    async fn migrate(&self, handle: &DbHandle) -> Result<(), DbInfraError> {
        self.migrations.fetch_add(1, Ordering::SeqCst);
        DriverBootstrap.migrate(handle).await
    }
}

/// Holds `connect` until the test releases it.
pub struct GatedBootstrap {
    pub entered: Notify,
    pub release: Notify,
}

impl GatedBootstrap {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entered: Notify::new(),
            release: Notify::new(),
        })
    }
}

#[async_trait]
impl Bootstrap for GatedBootstrap {
    async fn connect(&self, cfg: &DriverConfig) -> Result<DbHandle, DbInfraError> {
        self.entered.notify_one();
        self.release.notified().await;
        DriverBootstrap.connect(cfg).await
    }

    async fn migrate(&self, handle: &DbHandle) -> Result<(), DbInfraError> {
        DriverBootstrap.migrate(handle).await
    }
}
