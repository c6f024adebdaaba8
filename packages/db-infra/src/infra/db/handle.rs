use std::fmt;
use std::sync::Arc;

use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection};
use tiberius::Client;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::compat::Compat;

use crate::error::DbInfraError;

pub type SqlServerClient = Client<Compat<TcpStream>>;

/// A live database session or pool. Clones share the same underlying resource.
#[derive(Clone)]
pub enum DbHandle {
    /// MySQL, Postgres and SQLite through SeaORM's sqlx pools.
    Orm(DatabaseConnection),
    /// SQL Server through a single tiberius client. Queries need `&mut`,
    /// so concurrent users take turns on the mutex.
    SqlServer(Arc<Mutex<SqlServerClient>>),
}

impl DbHandle {
    pub fn sql_server(client: SqlServerClient) -> Self {
        DbHandle::SqlServer(Arc::new(Mutex::new(client)))
    }

    /// Engine name for logs and diagnostics.
    pub fn engine(&self) -> &'static str {
        match self {
            DbHandle::Orm(conn) => match conn.get_database_backend() {
                DatabaseBackend::MySql => "mysql",
                DatabaseBackend::Postgres => "postgresql",
                _ => "sqlite",
            },
            DbHandle::SqlServer(_) => "sqlserver",
        }
    }

    /// SeaORM connection, when this handle has one.
    pub fn orm(&self) -> Option<&DatabaseConnection> {
        match self {
            DbHandle::Orm(conn) => Some(conn),
            DbHandle::SqlServer(_) => None,
        }
    }

    /// Minimal round trip to the server. Never reconnects.
    pub async fn ping(&self) -> Result<(), DbInfraError> {
        match self {
            DbHandle::Orm(conn) => conn.ping().await.map_err(DbInfraError::probe),
            DbHandle::SqlServer(client) => {
                let mut client = client.lock().await;
                let stream = client
                    .simple_query("SELECT 1")
                    .await
                    .map_err(DbInfraError::probe)?;
                stream.into_row().await.map_err(DbInfraError::probe)?;
                Ok(())
            }
        }
    }
}

impl From<DatabaseConnection> for DbHandle {
    fn from(conn: DatabaseConnection) -> Self {
        DbHandle::Orm(conn)
    }
}

impl fmt::Debug for DbHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DbHandle").field(&self.engine()).finish()
    }
}
