use std::path::PathBuf;
use std::process;

use clap::Parser;
use db_infra::infra::db::driver::SQLITE_MEMORY;
use db_infra::infra::db::run_command;
use db_infra::{connect, DbInfraError, DriverConfig, DriverKind};
use migration::MigrationCommand;
use tracing::info;

#[derive(Parser)]
#[command(name = "migration-cli")]
#[command(about = "Schema migration tool for the scaffold database (reads DB_* variables)")]
struct Args {
    /// Migration command to run: up | down | fresh | reset | refresh | status
    command: String,

    /// Env file to load before reading DB_* variables
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout)
        .without_time()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_env_filter("migration=info,db_infra=info,sqlx=warn")
        .init();

    // Help exits 0, usage errors exit 2
    let args = Args::try_parse().unwrap_or_else(|e| e.exit());

    let loaded = match &args.env_file {
        Some(path) => dotenvy::from_path(path).map(|_| path.clone()),
        None => dotenvy::dotenv(),
    };
    match loaded {
        Ok(path) => info!("env=loaded file={}", path.display()),
        Err(e) if e.not_found() && args.env_file.is_none() => {}
        Err(e) => {
            eprintln!("Failed to load env file: {e}");
            process::exit(2);
        }
    }

    let command = match args.command.parse::<MigrationCommand>() {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{e}");
            process::exit(2);
        }
    };

    if let Err(e) = run(command).await {
        eprintln!("Migration failed: {e}");
        process::exit(1);
    }
}

async fn run(command: MigrationCommand) -> Result<(), DbInfraError> {
    let cfg = DriverConfig::from_env()?;

    // Each CLI run would get a fresh in-memory database, so migrating one is pointless.
    if cfg.kind()? == DriverKind::Sqlite && cfg.database == SQLITE_MEMORY {
        return Err(DbInfraError::config(
            "SQLite in-memory databases are not supported for CLI operations; use a file path",
        ));
    }

    let handle = connect(&cfg).await?;
    run_command(&handle, command).await
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;

    #[test]
    fn test_missing_command_is_usage_error() {
        let err = Args::try_parse_from(["migration"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_help_exits_cleanly() {
        let err = Args::try_parse_from(["migration", "--help"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert_eq!(err.exit_code(), 0);
    }

    #[test]
    fn test_env_file_flag() {
        let args = Args::try_parse_from(["migration", "status", "--env-file", "ops/.env"]).unwrap();
        assert_eq!(args.command, "status");
        assert_eq!(args.env_file, Some(PathBuf::from("ops/.env")));
        assert_eq!(
            args.command.parse::<MigrationCommand>().unwrap(),
            MigrationCommand::Status
        );
    }
}
