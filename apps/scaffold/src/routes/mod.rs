use actix_web::web;

pub mod health;

/// Register every application route. Used by `main.rs` and by tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check routes: /api/health
    cfg.service(web::scope("/api").configure(health::configure_routes));
}
