//! Database connection lifecycle shared by the service and the migration CLI:
//! environment config, driver selection, one-time initialization, migrations
//! and the liveness probe.

pub mod config;
pub mod error;
pub mod infra;

pub use config::db::DriverConfig;
pub use error::DbInfraError;
pub use infra::db::{
    check, connect, run_migrations, Bootstrap, Database, DbHandle, DbStatus, DriverKind,
    HealthStatus, RegistryState,
};

#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    scaffold_test_support::logging::init();
}
