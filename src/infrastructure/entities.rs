//! Database entities

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Pipeline state of an enquiry, stored as snake_case TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum EnquiryStatus {
    #[default]
    New,
    Contacted,
    Interested,
    NotInterested,
    Converted,
}

#[derive(Debug, Clone, FromRow)]
pub struct Enquiry {
    pub id: i64,
    pub uname: String,
    pub email: String,
    pub mobile: String,
    pub status: EnquiryStatus,
    pub contacted: bool,
    pub followup_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub submission_datetime: DateTime<Utc>,
}

/// Validated input for the public submission insert.
#[derive(Debug, Clone)]
pub struct NewEnquiry {
    pub uname: String,
    pub email: String,
    pub mobile: String,
}

/// Full-replace payload: every mutable column is rewritten.
#[derive(Debug, Clone)]
pub struct EnquiryUpdate {
    pub uname: String,
    pub email: String,
    pub mobile: String,
    pub contacted: bool,
    pub followup_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub status: EnquiryStatus,
}
