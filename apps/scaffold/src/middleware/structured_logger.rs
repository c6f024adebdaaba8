use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::Error as ActixError;
use futures_util::future::LocalBoxFuture;
use tracing::{error, info, warn};

/// How a finished request is reported. A 503 means a dependency is down
/// (the health endpoint's degraded answer), not a server fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    ClientError,
    Degraded,
    ServerError,
}

impl Outcome {
    pub fn of(status: StatusCode) -> Self {
        if status == StatusCode::SERVICE_UNAVAILABLE {
            Outcome::Degraded
        } else if status.is_server_error() {
            Outcome::ServerError
        } else if status.is_client_error() {
            Outcome::ClientError
        } else {
            Outcome::Ok
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::ClientError => "client_error",
            Outcome::Degraded => "degraded",
            Outcome::ServerError => "server_error",
        }
    }
}

/// Request logging: one `http=done` line per request.
pub struct StructuredLogger;

impl<S, B> Transform<S, ServiceRequest> for StructuredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = StructuredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StructuredLoggerMiddleware { service }))
    }
}

pub struct StructuredLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for StructuredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let line = format!("method={} path={}", req.method(), req.path());
        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;

            let status = match &result {
                Ok(res) => res.status(),
                Err(err) => err.as_response_error().status_code(),
            };
            let outcome = Outcome::of(status);
            let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

            match outcome {
                Outcome::ServerError => error!(
                    "http=done {line} status={} outcome={} elapsed_ms={elapsed_ms:.2}",
                    status.as_u16(),
                    outcome.as_str()
                ),
                Outcome::Degraded | Outcome::ClientError => warn!(
                    "http=done {line} status={} outcome={} elapsed_ms={elapsed_ms:.2}",
                    status.as_u16(),
                    outcome.as_str()
                ),
                Outcome::Ok => info!(
                    "http=done {line} status={} outcome={} elapsed_ms={elapsed_ms:.2}",
                    status.as_u16(),
                    outcome.as_str()
                ),
            }

            result
        })
    }
}
