//! DI "Interfaces"

use crate::error::EnquiryError;
use crate::infrastructure::entities;
use crate::infrastructure::entities::EnquiryStatus;
use crate::infrastructure::query::ListParams;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Map, Value};

/// A full-replace request as received from the API, before validation.
///
/// The three required fields arrive as options so that an absent field and
/// an empty field fail validation the same way.
#[derive(Debug, Clone, Default)]
pub struct ReplaceRequest {
    pub uname: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub contacted: bool,
    pub followup_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub status: EnquiryStatus,
}

#[async_trait]
pub trait EnquiryService: Send + Sync {
    /// Lists enquiries for the given filter/sort/search parameters.
    async fn list(&self, params: ListParams) -> Result<Vec<entities::Enquiry>, EnquiryError>;

    /// Fetches a single enquiry.
    ///
    /// Returns `NotFound` if no record matches the id.
    async fn get(&self, id: i64) -> Result<entities::Enquiry, EnquiryError>;

    /// Records a public form submission.
    ///
    /// Fails with `Validation` if any of name/email/mobile is absent or
    /// empty. The created record always has status `new` and contacted
    /// false, whatever the submitter sent.
    async fn create(
        &self,
        uname: Option<String>,
        email: Option<String>,
        mobile: Option<String>,
    ) -> Result<entities::Enquiry, EnquiryError>;

    /// Rewrites all mutable columns of an enquiry.
    ///
    /// Unsupplied optional fields collapse to their empty representation;
    /// there is no partial preservation on this path.
    async fn replace(
        &self,
        id: i64,
        request: ReplaceRequest,
    ) -> Result<entities::Enquiry, EnquiryError>;

    /// Updates exactly the supplied columns.
    ///
    /// Fails with `Validation` on an empty map, an unrecognized column
    /// name, or a malformed value.
    async fn patch(
        &self,
        id: i64,
        fields: Map<String, Value>,
    ) -> Result<entities::Enquiry, EnquiryError>;

    /// Deletes an enquiry, returning its id. Irreversible.
    async fn delete(&self, id: i64) -> Result<i64, EnquiryError>;
}
