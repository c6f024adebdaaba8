use std::process;

use actix_web::{web, App, HttpServer};
use scaffold::infra::state::build_state;
use scaffold::{routes, telemetry};
use scaffold::{ServerConfig, StructuredLogger};
use tracing::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    match dotenvy::dotenv() {
        Ok(path) => info!("env=loaded file={}", path.display()),
        Err(e) if e.not_found() => info!("env=skipped reason=no_dotenv_file"),
        Err(e) => {
            error!("env=invalid err={}", e);
            process::exit(1);
        }
    }

    let server = match ServerConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("startup=failed err={}", e);
            process::exit(1);
        }
    };

    // Config, connect and migrate all happen here; any failure aborts startup.
    let app_state = match build_state().build().await {
        Ok(state) => state,
        Err(e) => {
            error!("startup=failed err={}", e);
            process::exit(1);
        }
    };

    info!("server=starting host={} port={}", server.host, server.port);

    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(StructuredLogger)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((server.host.as_str(), server.port))
    .inspect_err(|e| error!("startup=failed err=\"bind failed: {}\"", e))?
    .run()
    .await
}
