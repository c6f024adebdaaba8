pub use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{DatabaseBackend, DatabaseConnection, Statement};

use std::str::FromStr;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    /// Ordered schema definitions applied at startup.
    /// Register new migrations here, oldest first.
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationCommand {
    Up,
    Down,
    Fresh,
    Reset,
    Refresh,
    Status,
}

impl FromStr for MigrationCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "fresh" => Ok(Self::Fresh),
            "reset" => Ok(Self::Reset),
            "refresh" => Ok(Self::Refresh),
            "status" => Ok(Self::Status),
            other => Err(format!(
                "Unknown command: {other}. Use: up | down | fresh | reset | refresh | status"
            )),
        }
    }
}

/// Run a migration command against an already-open connection.
/// Used by the startup path, the CLI and tests.
pub async fn migrate(db: &DatabaseConnection, command: MigrationCommand) -> Result<(), DbErr> {
    let before = get_db_diagnostics(db).await?;

    tracing::info!("▶ cmd={command:?}  backend={}", before.backend);
    tracing::info!("▶ connected to DB: {}", before.name);
    tracing::info!(
        "▶ BEFORE: runner has {} migration(s) defined, {} applied",
        before.defined_migrations_count,
        before.mig_count
    );

    let result = match command {
        MigrationCommand::Up => Migrator::up(db, None).await,
        MigrationCommand::Down => Migrator::down(db, None).await,
        MigrationCommand::Fresh => Migrator::fresh(db).await,
        MigrationCommand::Reset => Migrator::reset(db).await,
        MigrationCommand::Refresh => Migrator::refresh(db).await,
        MigrationCommand::Status => Migrator::status(db).await,
    };

    match result {
        Ok(()) => {
            if !matches!(command, MigrationCommand::Status) {
                let after = get_db_diagnostics(db).await?;
                tracing::info!(
                    "▶ AFTER: runner has {} migration(s) defined, {} applied",
                    after.defined_migrations_count,
                    after.mig_count
                );
            }
            tracing::info!("✅ {command:?} OK for {}", before.backend);
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ {command:?} failed for {}: {e}", before.backend);
            Err(e)
        }
    }
}

#[derive(Debug)]
struct DbDiagnostics {
    backend: String,
    name: String,
    mig_count: usize,
    defined_migrations_count: usize,
}

async fn get_db_diagnostics(db: &DatabaseConnection) -> Result<DbDiagnostics, DbErr> {
    let backend = db.get_database_backend();

    let name_query = match backend {
        DatabaseBackend::Postgres => "SELECT current_database() AS name",
        DatabaseBackend::MySql => "SELECT DATABASE() AS name",
        _ => "SELECT file AS name FROM pragma_database_list WHERE name = 'main'",
    };

    let name = match db
        .query_one(Statement::from_string(backend, name_query.to_string()))
        .await?
    {
        Some(row) => match row.try_get::<Option<String>>("", "name") {
            Ok(Some(name)) if !name.is_empty() => name,
            // SQLite reports an empty file name for in-memory databases
            Ok(_) if backend == DatabaseBackend::Sqlite => ":memory:".to_string(),
            _ => "<unknown>".to_string(),
        },
        None => "<unknown>".to_string(),
    };

    let mig_count = count_applied_migrations(db).await.unwrap_or(0);

    Ok(DbDiagnostics {
        backend: format!("{backend:?}"),
        name,
        mig_count,
        defined_migrations_count: Migrator::migrations().len(),
    })
}

/// Number of applied migrations, or 0 when the bookkeeping table does not exist yet.
pub async fn count_applied_migrations(db: &DatabaseConnection) -> Result<usize, DbErr> {
    match Migrator::get_applied_migrations(db).await {
        Ok(migrations) => Ok(migrations.len()),
        Err(DbErr::Exec(_)) => Ok(0),
        Err(e) => Err(e),
    }
}

/// Name of the latest applied migration, if any.
pub async fn get_latest_migration_version(
    db: &DatabaseConnection,
) -> Result<Option<String>, DbErr> {
    match Migrator::get_applied_migrations(db).await {
        Ok(migrations) => Ok(migrations.last().map(|m| m.name().to_string())),
        Err(DbErr::Exec(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use sea_orm_migration::sea_orm::{ConnectOptions, Database};

    use super::*;

    async fn memory_db() -> DatabaseConnection {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.min_connections(1).max_connections(1).sqlx_logging(false);
        Database::connect(opt).await.expect("open in-memory sqlite")
    }

    #[test]
    fn command_parses_case_insensitively() {
        assert_eq!("UP".parse::<MigrationCommand>(), Ok(MigrationCommand::Up));
        assert_eq!(
            " status ".parse::<MigrationCommand>(),
            Ok(MigrationCommand::Status)
        );
        let err = "sideways".parse::<MigrationCommand>().unwrap_err();
        assert!(err.contains("sideways"));
    }

    #[tokio::test]
    async fn up_on_empty_list_leaves_nothing_applied() {
        let db = memory_db().await;

        migrate(&db, MigrationCommand::Up).await.unwrap();

        assert_eq!(count_applied_migrations(&db).await.unwrap(), 0);
        assert_eq!(get_latest_migration_version(&db).await.unwrap(), None);
    }

    #[tokio::test]
    async fn up_is_idempotent() {
        let db = memory_db().await;

        migrate(&db, MigrationCommand::Up).await.unwrap();
        migrate(&db, MigrationCommand::Up).await.unwrap();
        migrate(&db, MigrationCommand::Status).await.unwrap();

        assert_eq!(
            count_applied_migrations(&db).await.unwrap(),
            Migrator::migrations().len()
        );
    }
}
