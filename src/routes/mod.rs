//! JSON handlers of the HTTP API.

use actix_web::HttpResponse;
use chrono::{NaiveDateTime, Utc};
use serde_json::json;

use crate::services::ServiceError;

pub mod auth;
pub mod availability;
pub mod bookings;
pub mod catalog;
pub mod customers;
pub mod holidays;
pub mod invoices;
pub mod locations;
pub mod loyalty;
pub mod merchants;
pub mod public;
pub mod staff;
pub mod staff_blocks;

/// Current instant in UTC, as stored in the database.
pub(crate) fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Map a service failure onto its HTTP status with a `{"error": ...}` body.
///
/// `context` only appears in the log line written for server errors.
pub(crate) fn error_response(err: ServiceError, context: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => {
            HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))
        }
        ServiceError::InvalidCredentials(message) => {
            HttpResponse::Unauthorized().json(json!({ "error": message }))
        }
        ServiceError::Forbidden(message) => {
            HttpResponse::Forbidden().json(json!({ "error": message }))
        }
        ServiceError::NotFound => HttpResponse::NotFound().json(json!({ "error": "Not found" })),
        ServiceError::Form(message) => HttpResponse::BadRequest().json(json!({ "error": message })),
        ServiceError::Conflict { message, conflicts } => {
            HttpResponse::Conflict().json(json!({ "error": message, "conflicts": conflicts }))
        }
        ServiceError::Locked(message) => {
            HttpResponse::Locked().json(json!({ "error": message }))
        }
        err @ (ServiceError::Repository(_) | ServiceError::Internal(_)) => {
            log::error!("{context}: {err}");
            HttpResponse::InternalServerError().json(json!({ "error": "Internal server error" }))
        }
    }
}
