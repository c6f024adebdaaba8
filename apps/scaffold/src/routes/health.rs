use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::app_state::AppState;
use crate::web::envelope;

pub const MSG_HEALTHY: &str = "All services are healthy";
pub const MSG_DEGRADED: &str = "One or more services are unavailable";
const SERVICE_RUNNING: &str = "Running";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthData {
    pub service_status: String,
    pub database_status: String,
}

async fn health(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let report = app_state.health.check_health().await;

    let data = HealthData {
        service_status: SERVICE_RUNNING.to_string(),
        database_status: report.database.to_string(),
    };

    if report.is_healthy() {
        Ok(envelope::success(StatusCode::OK, MSG_HEALTHY, data))
    } else {
        Ok(envelope::error(
            StatusCode::SERVICE_UNAVAILABLE,
            MSG_DEGRADED,
            Some(data),
        ))
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}
