//! Enquiry endpoints
//!
//! The admin surface lives under `/api/admin/enquiries`; the public form
//! submission endpoint under `/api/enquire`.

use crate::api::error_response;
use crate::core::traits::EnquiryService;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use di_axum::Inject;
use serde_json::{Map, Value};

pub fn admin_router() -> Router {
    Router::new().route("/", get(list_enquiries)).route(
        "/:id",
        get(get_enquiry)
            .put(replace_enquiry)
            .patch(patch_enquiry)
            .delete(delete_enquiry),
    )
}

pub fn public_router() -> Router {
    Router::new().route("/", post(create_enquiry))
}

async fn list_enquiries(
    Inject(enquiry_service): Inject<dyn EnquiryService>,
    Query(query): Query<schemas::ListQuery>,
) -> Response {
    match enquiry_service.list(query.into()).await {
        Ok(enquiries) => {
            let enquiries: Vec<schemas::Enquiry> =
                enquiries.into_iter().map(schemas::Enquiry::from).collect();
            (StatusCode::OK, Json(enquiries)).into_response()
        }
        Err(err) => error_response(err, "Failed to fetch enquiries"),
    }
}

async fn get_enquiry(
    Inject(enquiry_service): Inject<dyn EnquiryService>,
    Path(id): Path<i64>,
) -> Response {
    match enquiry_service.get(id).await {
        Ok(enquiry) => (StatusCode::OK, Json(schemas::Enquiry::from(enquiry))).into_response(),
        Err(err) => error_response(err, "Failed to fetch enquiry"),
    }
}

async fn replace_enquiry(
    Inject(enquiry_service): Inject<dyn EnquiryService>,
    Path(id): Path<i64>,
    Json(update): Json<schemas::UpdateEnquiry>,
) -> Response {
    match enquiry_service.replace(id, update.into()).await {
        Ok(enquiry) => (StatusCode::OK, Json(schemas::Enquiry::from(enquiry))).into_response(),
        Err(err) => error_response(err, "Failed to update enquiry"),
    }
}

async fn patch_enquiry(
    Inject(enquiry_service): Inject<dyn EnquiryService>,
    Path(id): Path<i64>,
    Json(fields): Json<Map<String, Value>>,
) -> Response {
    match enquiry_service.patch(id, fields).await {
        Ok(enquiry) => (StatusCode::OK, Json(schemas::Enquiry::from(enquiry))).into_response(),
        Err(err) => error_response(err, "Failed to update enquiry"),
    }
}

async fn delete_enquiry(
    Inject(enquiry_service): Inject<dyn EnquiryService>,
    Path(id): Path<i64>,
) -> Response {
    match enquiry_service.delete(id).await {
        Ok(id) => (
            StatusCode::OK,
            Json(schemas::DeleteResponse {
                message: "Enquiry deleted successfully".to_owned(),
                id,
            }),
        )
            .into_response(),
        Err(err) => error_response(err, "Failed to delete enquiry"),
    }
}

async fn create_enquiry(
    Inject(enquiry_service): Inject<dyn EnquiryService>,
    Json(submission): Json<schemas::NewEnquiry>,
) -> Response {
    match enquiry_service
        .create(submission.uname, submission.email, submission.mobile)
        .await
    {
        Ok(enquiry) => {
            (StatusCode::CREATED, Json(schemas::Enquiry::from(enquiry))).into_response()
        }
        Err(err) => error_response(err, "Failed to create enquiry"),
    }
}

pub mod schemas {
    use crate::core::traits::ReplaceRequest;
    use crate::infrastructure::entities;
    use crate::infrastructure::entities::EnquiryStatus;
    use crate::infrastructure::query::ListParams;
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct ListQuery {
        pub sort: Option<String>,
        pub direction: Option<String>,
        pub status: Option<String>,
        pub search: Option<String>,
    }

    impl From<ListQuery> for ListParams {
        fn from(query: ListQuery) -> Self {
            ListParams {
                sort: query.sort,
                direction: query.direction,
                status: query.status,
                search: query.search,
            }
        }
    }

    /// Public form submission. Fields are optional so missing and empty
    /// input share the 400 path instead of failing deserialization.
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct NewEnquiry {
        pub uname: Option<String>,
        pub email: Option<String>,
        pub mobile: Option<String>,
    }

    /// Full-replace body. Optional fields that are not supplied collapse
    /// to their empty representation; nothing is preserved from the
    /// previous row.
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct UpdateEnquiry {
        pub uname: Option<String>,
        pub email: Option<String>,
        pub mobile: Option<String>,
        #[serde(default)]
        pub contacted: bool,
        pub followup_date: Option<NaiveDate>,
        pub notes: Option<String>,
        #[serde(default)]
        pub status: EnquiryStatus,
    }

    impl From<UpdateEnquiry> for ReplaceRequest {
        fn from(update: UpdateEnquiry) -> Self {
            ReplaceRequest {
                uname: update.uname,
                email: update.email,
                mobile: update.mobile,
                contacted: update.contacted,
                followup_date: update.followup_date,
                notes: update.notes,
                status: update.status,
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
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

    impl From<entities::Enquiry> for Enquiry {
        fn from(enquiry: entities::Enquiry) -> Self {
            Enquiry {
                id: enquiry.id,
                uname: enquiry.uname,
                email: enquiry.email,
                mobile: enquiry.mobile,
                status: enquiry.status,
                contacted: enquiry.contacted,
                followup_date: enquiry.followup_date,
                notes: enquiry.notes,
                created_at: enquiry.created_at,
                updated_at: enquiry.updated_at,
                submission_datetime: enquiry.submission_datetime,
            }
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DeleteResponse {
        pub message: String,
        pub id: i64,
    }
}
