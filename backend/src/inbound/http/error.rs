//! HTTP adapter mapping for domain and dispatch errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn failures into consistent JSON bodies and status codes.
//! Fatal errors are redacted before they leave the process.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{DispatchError, Error, ErrorCode, PolicyDenial};

/// Response header carrying the request's trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        if self.code().is_fatal() {
            error!(message = self.message(), trace_id = ?self.trace_id(), "request failed");
        }
        builder.json(self.redacted())
    }
}

/// Domain error equivalent of a dispatch outcome.
pub fn dispatch_error_body(error: &DispatchError) -> Error {
    match error {
        DispatchError::Denied(PolicyDenial::Anonymous) => {
            Error::unauthorized("authentication required")
        }
        DispatchError::Denied(denial @ PolicyDenial::NotHost { .. }) => {
            Error::forbidden(denial.to_string())
        }
        DispatchError::Failed(error) => error.clone(),
    }
}

impl ResponseError for DispatchError {
    fn status_code(&self) -> StatusCode {
        status_for(dispatch_error_body(self).code())
    }

    fn error_response(&self) -> HttpResponse {
        dispatch_error_body(self).error_response()
    }
}
