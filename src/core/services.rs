//! Implementations for the service the app needs.
//!

use crate::core::traits::{EnquiryService, ReplaceRequest};
use crate::error::EnquiryError;
use crate::infrastructure::entities::{Enquiry, EnquiryUpdate, NewEnquiry};
use crate::infrastructure::query::ListParams;
use crate::infrastructure::traits::EnquiryRepository;
use async_trait::async_trait;
use di::{Ref, injectable};
use serde_json::{Map, Value};

const REQUIRED_FIELDS_MESSAGE: &str = "Name, email, and mobile are required fields";

/// Treat absent and whitespace-only the same way the submission form does.
fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[injectable(EnquiryService)]
pub struct MyEnquiryService {
    repo: Ref<dyn EnquiryRepository>,
}

#[async_trait]
impl EnquiryService for MyEnquiryService {
    async fn list(&self, params: ListParams) -> Result<Vec<Enquiry>, EnquiryError> {
        self.repo.list(&params).await
    }

    async fn get(&self, id: i64) -> Result<Enquiry, EnquiryError> {
        self.repo.find(id).await
    }

    async fn create(
        &self,
        uname: Option<String>,
        email: Option<String>,
        mobile: Option<String>,
    ) -> Result<Enquiry, EnquiryError> {
        let (Some(uname), Some(email), Some(mobile)) =
            (required(uname), required(email), required(mobile))
        else {
            return Err(EnquiryError::validation(REQUIRED_FIELDS_MESSAGE));
        };

        self.repo
            .create(NewEnquiry {
                uname,
                email,
                mobile,
            })
            .await
    }

    async fn replace(&self, id: i64, request: ReplaceRequest) -> Result<Enquiry, EnquiryError> {
        let (Some(uname), Some(email), Some(mobile)) = (
            required(request.uname),
            required(request.email),
            required(request.mobile),
        ) else {
            return Err(EnquiryError::validation(REQUIRED_FIELDS_MESSAGE));
        };

        self.repo
            .replace(
                id,
                EnquiryUpdate {
                    uname,
                    email,
                    mobile,
                    contacted: request.contacted,
                    followup_date: request.followup_date,
                    notes: request.notes,
                    status: request.status,
                },
            )
            .await
    }

    async fn patch(
        &self,
        id: i64,
        fields: Map<String, Value>,
    ) -> Result<Enquiry, EnquiryError> {
        if fields.is_empty() {
            return Err(EnquiryError::validation("No fields provided for update"));
        }

        self.repo.patch(id, &fields).await
    }

    async fn delete(&self, id: i64) -> Result<i64, EnquiryError> {
        self.repo.delete(id).await
    }
}
