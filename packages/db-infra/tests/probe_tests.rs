mod common;

use common::sqlite_memory;
use db_infra::{check, Database, DbInfraError, DbStatus, DriverConfig, RegistryState};

#[tokio::test]
async fn check_leaves_ready_registry_untouched() {
    let db = Database::with_config(sqlite_memory());
    db.initialize().await.unwrap();

    for _ in 0..3 {
        assert_eq!(check(&db).await.status(), DbStatus::Connected);
    }
    assert_eq!(db.state(), RegistryState::Ready);
}

#[tokio::test]
async fn check_on_file_database_reports_connected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("health.db");

    let db = Database::with_config(
        DriverConfig::new("sqlite").with_database(path.to_string_lossy().to_string()),
    );
    db.initialize().await.unwrap();

    let status = check(&db).await;
    assert!(status.reachable, "detail: {}", status.detail);
}

#[tokio::test]
async fn severed_pool_reports_not_connected() {
    let db = Database::with_config(sqlite_memory());
    db.initialize().await.unwrap();

    // Clones share the pool, so closing one severs the registry's handle too.
    let conn = db.get().unwrap().orm().unwrap().clone();
    conn.close().await.unwrap();

    let status = check(&db).await;
    assert_eq!(status.status(), DbStatus::NotConnected);
    assert!(matches!(status.error, Some(DbInfraError::Probe { .. })));
    // No reconnect and no state change
    assert_eq!(db.state(), RegistryState::Ready);
}

#[tokio::test]
async fn check_after_failed_initialize_reports_not_connected() {
    let db = Database::with_config(DriverConfig::new("redis").with_host("localhost"));
    db.initialize().await.unwrap_err();

    let status = check(&db).await;
    assert!(!status.reachable);
    assert_eq!(status.error, Some(DbInfraError::NotInitialized));
    assert_eq!(db.state(), RegistryState::Failed);
}
