//! Uniform JSON body shared by every endpoint:
//! `{"status": "success"|"error", "message": ..., "data": ...}`.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: EnvelopeStatus,
    pub message: String,
    /// Omitted from the body when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status: EnvelopeStatus::Error,
            message: message.into(),
            data,
        }
    }

    pub fn respond(&self, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(self)
    }
}

pub fn success<T: Serialize>(status: StatusCode, message: impl Into<String>, data: T) -> HttpResponse {
    Envelope::success(message, data).respond(status)
}

pub fn error<T: Serialize>(
    status: StatusCode,
    message: impl Into<String>,
    details: Option<T>,
) -> HttpResponse {
    Envelope::error(message, details).respond(status)
}
