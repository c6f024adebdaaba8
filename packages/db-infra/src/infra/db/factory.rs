use std::str::FromStr;

use sea_orm::{SqlxMySqlConnector, SqlxPostgresConnector, SqlxSqliteConnector};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlPoolOptions};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::Connection;
use tiberius::{AuthMethod, Config as TdsConfig};
use tokio::net::TcpStream;
use tokio_util::compat::TokioAsyncWriteCompatExt;
use tracing::{info, trace};

use crate::config::db::DriverConfig;
use crate::error::DbInfraError;
use crate::infra::db::driver::{sanitize_conn_spec, DriverKind, SQLITE_MEMORY};
use crate::infra::db::handle::DbHandle;

const POOL_MAX: u32 = 10;

/// Open a database handle for `cfg`.
///
/// Unknown kinds, placeholder kinds and invalid fields fail before any I/O.
/// Failures while opening are reported as `Connection`.
pub async fn connect(cfg: &DriverConfig) -> Result<DbHandle, DbInfraError> {
    let kind = cfg.kind()?;
    let spec = kind.conn_spec(cfg)?;
    info!(
        "db=connecting driver={} spec={}",
        kind,
        sanitize_conn_spec(&spec)
    );

    let handle = match kind {
        DriverKind::MySql => open_mysql(&spec).await?,
        DriverKind::Postgres => open_postgres(&spec).await?,
        DriverKind::Sqlite => open_sqlite(cfg, &spec).await?,
        DriverKind::SqlServer => open_sql_server(kind, cfg).await?,
        DriverKind::Redis | DriverKind::Mongo => {
            return Err(DbInfraError::NotImplemented {
                driver: kind.name().to_string(),
            })
        }
    };

    info!("db=connected driver={} engine={}", kind, handle.engine());
    Ok(handle)
}

// Networked pools are opened lazily after one direct connection succeeds, so
// an unreachable server fails fast with its own error instead of the pool's
// acquire timeout.
async fn open_postgres(spec: &str) -> Result<DbHandle, DbInfraError> {
    let driver = DriverKind::Postgres.name();
    let opts = PgConnectOptions::from_str(spec)
        .map_err(|e| DbInfraError::config(format!("invalid Postgres connection options: {e}")))?;

    let first = PgConnection::connect_with(&opts)
        .await
        .map_err(|e| DbInfraError::connection(driver, e))?;
    first
        .close()
        .await
        .map_err(|e| DbInfraError::connection(driver, e))?;

    let pool = PgPoolOptions::new()
        .max_connections(POOL_MAX)
        .connect_lazy_with(opts);
    trace!("db=postgres pool=lazy max={}", POOL_MAX);

    Ok(DbHandle::Orm(SqlxPostgresConnector::from_sqlx_postgres_pool(pool)))
}

async fn open_mysql(spec: &str) -> Result<DbHandle, DbInfraError> {
    let driver = DriverKind::MySql.name();
    let opts = MySqlConnectOptions::from_str(spec)
        .map_err(|e| DbInfraError::config(format!("invalid MySQL connection options: {e}")))?;

    let first = MySqlConnection::connect_with(&opts)
        .await
        .map_err(|e| DbInfraError::connection(driver, e))?;
    first
        .close()
        .await
        .map_err(|e| DbInfraError::connection(driver, e))?;

    let pool = MySqlPoolOptions::new()
        .max_connections(POOL_MAX)
        .connect_lazy_with(opts);
    trace!("db=mysql pool=lazy max={}", POOL_MAX);

    Ok(DbHandle::Orm(SqlxMySqlConnector::from_sqlx_mysql_pool(pool)))
}

async fn open_sqlite(cfg: &DriverConfig, spec: &str) -> Result<DbHandle, DbInfraError> {
    let driver = DriverKind::Sqlite.name();
    let in_memory = cfg.database == SQLITE_MEMORY;

    let connect_opts = SqliteConnectOptions::from_str(spec)
        .map_err(|e| DbInfraError::config(format!("invalid SQLite connection options: {e}")))?
        .create_if_missing(true)
        .foreign_keys(true);

    // Every in-memory connection is its own database, so pin the pool to one
    // connection that never idles out.
    let pool_opts = if in_memory {
        SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(POOL_MAX)
    };

    let pool = pool_opts
        .connect_with(connect_opts)
        .await
        .map_err(|e| DbInfraError::connection(driver, e))?;
    trace!("db=sqlite pool=ready in_memory={}", in_memory);

    Ok(DbHandle::Orm(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool)))
}

async fn open_sql_server(kind: DriverKind, cfg: &DriverConfig) -> Result<DbHandle, DbInfraError> {
    let driver = kind.name();

    let port = kind.port(cfg)?;
    let mut config = TdsConfig::new();
    config.host(&cfg.host);
    config.port(port);
    config.database(&cfg.database);
    config.authentication(AuthMethod::sql_server(&cfg.username, &cfg.password));
    config.trust_cert();

    let tcp = TcpStream::connect((cfg.host.as_str(), port))
        .await
        .map_err(|e| DbInfraError::connection(driver, e))?;
    tcp.set_nodelay(true)
        .map_err(|e| DbInfraError::connection(driver, e))?;

    let client = tiberius::Client::connect(config, tcp.compat_write())
        .await
        .map_err(|e| DbInfraError::connection(driver, e))?;
    Ok(DbHandle::sql_server(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_driver_fails_without_io() {
        // Host points nowhere routable; an attempted connect would surface as
        // `Connection`, not `UnsupportedDriver`.
        let cfg = DriverConfig::new("oracle")
            .with_host("192.0.2.1")
            .with_database("app");
        let err = connect(&cfg).await.unwrap_err();
        assert_eq!(
            err,
            DbInfraError::UnsupportedDriver {
                driver: "oracle".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_placeholder_drivers_are_not_implemented() {
        for driver in ["redis", "mongo"] {
            let cfg = DriverConfig::new(driver).with_host("localhost");
            let err = connect(&cfg).await.unwrap_err();
            assert_eq!(
                err,
                DbInfraError::NotImplemented {
                    driver: driver.to_string()
                }
            );
        }
    }

    #[tokio::test]
    async fn test_invalid_config_fails_before_connecting() {
        let cfg = DriverConfig::new("postgres").with_database("app");
        let err = connect(&cfg).await.unwrap_err();
        assert!(matches!(err, DbInfraError::Config { .. }));
    }

    #[tokio::test]
    async fn test_sqlite_memory_connects_and_pings() {
        let cfg = DriverConfig::new("sqlite").with_database(SQLITE_MEMORY);
        let handle = connect(&cfg).await.unwrap();
        assert_eq!(handle.engine(), "sqlite");
        handle.ping().await.unwrap();
    }
}
