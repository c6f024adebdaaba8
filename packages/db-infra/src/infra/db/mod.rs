pub mod driver;
pub mod factory;
pub mod handle;
pub mod migrate;
pub mod probe;
pub mod registry;

pub use driver::{sanitize_conn_spec, DriverKind};
pub use factory::connect;
pub use handle::DbHandle;
pub use migrate::{run_command, run_migrations};
pub use probe::{check, DbStatus, HealthStatus};
pub use registry::{Bootstrap, ConfigSource, Database, DatabaseBuilder, DriverBootstrap, RegistryState};
