use migration::{migrate, MigrationCommand, Migrator, MigratorTrait};
use tracing::info;

use crate::error::DbInfraError;
use crate::infra::db::handle::DbHandle;

/// Bring the schema up to date on a freshly opened handle.
///
/// Any failure is fatal to startup; the service must not serve requests
/// against an unmigrated schema.
pub async fn run_migrations(handle: &DbHandle) -> Result<(), DbInfraError> {
    run_command(handle, MigrationCommand::Up).await
}

pub async fn run_command(handle: &DbHandle, command: MigrationCommand) -> Result<(), DbInfraError> {
    let defined = Migrator::migrations().len();
    info!(
        "migrate=start engine={} command={:?} defined={}",
        handle.engine(),
        command,
        defined
    );

    match handle {
        DbHandle::Orm(conn) => {
            migrate(conn, command)
                .await
                .map_err(|e| DbInfraError::migration(format!("migration execution failed: {e}")))?;
        }
        // The migrator speaks SeaORM only; SQL Server handles can run an empty list and nothing else.
        DbHandle::SqlServer(_) => {
            if defined > 0 {
                return Err(DbInfraError::migration(format!(
                    "{defined} migration(s) defined but schema migrations are not supported on sqlserver"
                )));
            }
            info!("migrate=skipped engine=sqlserver reason=no_migrations_defined");
        }
    }

    info!("migrate=done");
    Ok(())
}
