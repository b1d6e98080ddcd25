//! Infrastructure traits, used for DI on higher levels

use crate::error::EnquiryError;
use crate::infrastructure::entities;
use crate::infrastructure::query::ListParams;
use async_trait::async_trait;
use serde_json::Map;
use serde_json::Value;

#[async_trait]
pub trait EnquiryRepository: Send + Sync {
    /// List enquiries honoring the given filter/sort/search parameters.
    async fn list(&self, params: &ListParams) -> Result<Vec<entities::Enquiry>, EnquiryError>;

    async fn find(&self, id: i64) -> Result<entities::Enquiry, EnquiryError>;

    /// Insert a new enquiry with status `new` and all three timestamps set
    /// to the same captured instant. Returns the row with its assigned id.
    async fn create(&self, enquiry: entities::NewEnquiry)
        -> Result<entities::Enquiry, EnquiryError>;

    /// Rewrite every mutable column of the identified enquiry.
    async fn replace(
        &self,
        id: i64,
        update: entities::EnquiryUpdate,
    ) -> Result<entities::Enquiry, EnquiryError>;

    /// Update exactly the supplied columns, plus `updated_at`.
    async fn patch(
        &self,
        id: i64,
        fields: &Map<String, Value>,
    ) -> Result<entities::Enquiry, EnquiryError>;

    /// Remove the identified enquiry, returning its id.
    async fn delete(&self, id: i64) -> Result<i64, EnquiryError>;
}
