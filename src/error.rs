//! Error taxonomy shared across the store and service layers

use thiserror::Error;

/// Every failure the enquiry operations can produce.
///
/// Handlers map these onto HTTP statuses: `Validation` → 400,
/// `NotFound` → 404, `Store` → 500 with a genericized message.
#[derive(Debug, Error)]
pub enum EnquiryError {
    #[error("{0}")]
    Validation(String),

    #[error("Enquiry not found")]
    NotFound,

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl EnquiryError {
    pub fn validation(message: impl Into<String>) -> Self {
        EnquiryError::Validation(message.into())
    }
}
