use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;
use serde::{Deserialize, Serialize};

use crate::error::EnquiryError;

pub mod enquiries;

/// The only error body shape the API ever returns.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Map a service failure onto an HTTP response.
///
/// Store failures are logged with full detail and surface as a 500 carrying
/// only the fixed per-endpoint `fallback` string.
pub(crate) fn error_response(err: EnquiryError, fallback: &'static str) -> Response {
    let (status, message) = match err {
        EnquiryError::Validation(message) => (StatusCode::BAD_REQUEST, message),
        EnquiryError::NotFound => (StatusCode::NOT_FOUND, "Enquiry not found".to_owned()),
        EnquiryError::Store(err) => {
            error!("{fallback}: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, fallback.to_owned())
        }
    };

    (status, Json(ErrorBody { error: message })).into_response()
}
