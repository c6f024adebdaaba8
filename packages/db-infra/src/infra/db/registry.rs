use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::config::db::DriverConfig;
use crate::error::DbInfraError;
use crate::infra::db::factory;
use crate::infra::db::handle::DbHandle;
use crate::infra::db::migrate::run_migrations;

/// The connect and migrate steps run by [`Database::initialize`].
#[async_trait]
pub trait Bootstrap: Send + Sync {
    async fn connect(&self, cfg: &DriverConfig) -> Result<DbHandle, DbInfraError>;
    async fn migrate(&self, handle: &DbHandle) -> Result<(), DbInfraError>;
}

/// Production bootstrap: driver factory followed by the schema migrator.
#[derive(Debug, Default, Clone, Copy)]
pub struct DriverBootstrap;

#[async_trait]
impl Bootstrap for DriverBootstrap {
    async fn connect(&self, cfg: &DriverConfig) -> Result<DbHandle, DbInfraError> {
        factory::connect(cfg).await
    }

    async fn migrate(&self, handle: &DbHandle) -> Result<(), DbInfraError> {
        run_migrations(handle).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

/// Where the driver config comes from when `initialize` first runs.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    Env,
    Fixed(DriverConfig),
}

impl ConfigSource {
    fn load(&self) -> Result<DriverConfig, DbInfraError> {
        match self {
            ConfigSource::Env => DriverConfig::from_env(),
            ConfigSource::Fixed(cfg) => Ok(cfg.clone()),
        }
    }
}

/// Holder of the process's single database handle.
///
/// Construct one at startup and share it by reference (or `Arc`). The
/// load-config, connect and migrate sequence runs at most once; its outcome,
/// success or error, is what every `initialize` caller sees from then on.
pub struct Database {
    source: ConfigSource,
    bootstrap: Arc<dyn Bootstrap>,
    started: AtomicBool,
    outcome: OnceCell<Result<DbHandle, DbInfraError>>,
}

impl Database {
    /// Reads `DB_*` variables on first `initialize`.
    pub fn from_env() -> Self {
        Self::builder().build()
    }

    pub fn with_config(cfg: DriverConfig) -> Self {
        Self::builder().with_config(cfg).build()
    }

    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    /// Run the bootstrap sequence once. Concurrent first callers wait for the
    /// single in-flight attempt; later callers get the stored outcome. A failed
    /// attempt is never retried.
    pub async fn initialize(&self) -> Result<(), DbInfraError> {
        let outcome = self.outcome.get_or_init(|| self.bootstrap_once()).await;
        match outcome {
            Ok(_) => Ok(()),
            Err(e) => Err(e.clone()),
        }
    }

    /// The live handle. Only available once `initialize` has succeeded.
    pub fn get(&self) -> Result<&DbHandle, DbInfraError> {
        match self.outcome.get() {
            Some(Ok(handle)) => Ok(handle),
            _ => Err(DbInfraError::NotInitialized),
        }
    }

    pub fn state(&self) -> RegistryState {
        match self.outcome.get() {
            Some(Ok(_)) => RegistryState::Ready,
            Some(Err(_)) => RegistryState::Failed,
            None if self.started.load(Ordering::Acquire) => RegistryState::Initializing,
            None => RegistryState::Uninitialized,
        }
    }

    async fn bootstrap_once(&self) -> Result<DbHandle, DbInfraError> {
        self.started.store(true, Ordering::Release);
        info!("bootstrap=start pid={}", process::id());

        let result = self.run_bootstrap().await;
        match &result {
            Ok(handle) => info!("bootstrap=ready engine={}", handle.engine()),
            Err(e) => error!("bootstrap=failed err={}", e),
        }
        result
    }

    async fn run_bootstrap(&self) -> Result<DbHandle, DbInfraError> {
        let cfg = self.source.load()?;
        let handle = self.bootstrap.connect(&cfg).await?;
        info!("db=connected running_migrations=true");
        self.bootstrap.migrate(&handle).await?;
        Ok(handle)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("source", &self.source)
            .field("state", &self.state())
            .finish()
    }
}

pub struct DatabaseBuilder {
    source: ConfigSource,
    bootstrap: Arc<dyn Bootstrap>,
}

impl DatabaseBuilder {
    pub fn new() -> Self {
        Self {
            source: ConfigSource::Env,
            bootstrap: Arc::new(DriverBootstrap),
        }
    }

    pub fn with_config(mut self, cfg: DriverConfig) -> Self {
        self.source = ConfigSource::Fixed(cfg);
        self
    }

    pub fn with_source(mut self, source: ConfigSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: Arc<dyn Bootstrap>) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn build(self) -> Database {
        Database {
            source: self.source,
            bootstrap: self.bootstrap,
            started: AtomicBool::new(false),
            outcome: OnceCell::new(),
        }
    }
}

impl Default for DatabaseBuilder {
    fn default() -> Self {
        Self::new()
    }
}
