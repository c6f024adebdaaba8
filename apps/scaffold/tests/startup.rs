mod common;

use std::env;

use db_infra::config::db::{DB_DATABASE, DB_DRIVER, DB_HOST};
use scaffold::infra::state::build_state;
use scaffold::AppError;
use serial_test::serial;

fn clear_db_env() {
    for name in [DB_DRIVER, DB_HOST, DB_DATABASE] {
        env::remove_var(name);
    }
}

#[tokio::test]
#[serial]
async fn missing_driver_aborts_startup() {
    clear_db_env();

    let err = build_state().build().await.unwrap_err();
    assert!(matches!(err, AppError::Config { .. }), "got {err:?}");
}

#[tokio::test]
#[serial]
async fn sqlite_file_from_env_starts() {
    clear_db_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scaffold.db");
    env::set_var(DB_DRIVER, "sqlite");
    env::set_var(DB_DATABASE, path.to_string_lossy().to_string());

    let state = build_state().build().await.expect("state from env");
    assert!(state.health.check_health().await.is_healthy());
    assert!(path.exists());

    clear_db_env();
}

#[tokio::test]
#[serial]
async fn mongo_from_env_is_not_implemented() {
    clear_db_env();
    env::set_var(DB_DRIVER, "mongo");
    env::set_var(DB_HOST, "localhost");

    let err = build_state().build().await.unwrap_err();
    match err {
        AppError::Config { detail } => assert!(detail.contains("not implemented"), "{detail}"),
        other => panic!("expected config error, got {other:?}"),
    }

    clear_db_env();
}
