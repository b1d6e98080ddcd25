//! DB Repository abstractions

use crate::error::EnquiryError;
use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::entities::{Enquiry, EnquiryUpdate, NewEnquiry};
use crate::infrastructure::query::{self, ListParams, SqlParam};
use crate::infrastructure::traits::EnquiryRepository;
use async_trait::async_trait;
use chrono::Utc;
use di::{Ref, injectable};
use serde_json::{Map, Value};
use sqlx::Sqlite;
use sqlx::query::QueryAs;
use sqlx::sqlite::SqliteArguments;

type EnquiryQuery<'q> = QueryAs<'q, Sqlite, Enquiry, SqliteArguments<'q>>;

fn bind_param(query: EnquiryQuery<'_>, param: SqlParam) -> EnquiryQuery<'_> {
    match param {
        SqlParam::Text(value) => query.bind(value),
        SqlParam::Int(value) => query.bind(value),
        SqlParam::Real(value) => query.bind(value),
        SqlParam::Bool(value) => query.bind(value),
        SqlParam::Timestamp(value) => query.bind(value),
        SqlParam::Null => query.bind(None::<String>),
    }
}

#[injectable(EnquiryRepository)]
pub struct DbEnquiryRepository {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl EnquiryRepository for DbEnquiryRepository {
    async fn list(&self, params: &ListParams) -> Result<Vec<Enquiry>, EnquiryError> {
        let (sql, binds) = query::build_list_query(params);

        let mut query = sqlx::query_as::<_, Enquiry>(&sql);
        for param in binds {
            query = bind_param(query, param);
        }

        Ok(query.fetch_all(&**self.connection).await?)
    }

    async fn find(&self, id: i64) -> Result<Enquiry, EnquiryError> {
        sqlx::query_as("SELECT * FROM enquiries WHERE id = ?")
            .bind(id)
            .fetch_optional(&**self.connection)
            .await?
            .ok_or(EnquiryError::NotFound)
    }

    async fn create(&self, enquiry: NewEnquiry) -> Result<Enquiry, EnquiryError> {
        // created_at, updated_at and submission_datetime all take the same
        // captured instant at insert.
        let now = Utc::now();

        Ok(sqlx::query_as(
            "INSERT INTO enquiries (uname, email, mobile, status, created_at, updated_at, submission_datetime) \
             VALUES (?1, ?2, ?3, 'new', ?4, ?5, ?6) RETURNING *",
        )
        .bind(enquiry.uname)
        .bind(enquiry.email)
        .bind(enquiry.mobile)
        .bind(now)
        .bind(now)
        .bind(now)
        .fetch_one(&**self.connection)
        .await?)
    }

    async fn replace(&self, id: i64, update: EnquiryUpdate) -> Result<Enquiry, EnquiryError> {
        sqlx::query_as(
            "UPDATE enquiries SET \
                uname = ?1, \
                email = ?2, \
                mobile = ?3, \
                contacted = ?4, \
                followup_date = ?5, \
                notes = ?6, \
                status = ?7, \
                updated_at = ?8 \
             WHERE id = ?9 RETURNING *",
        )
        .bind(update.uname)
        .bind(update.email)
        .bind(update.mobile)
        .bind(update.contacted)
        .bind(update.followup_date)
        .bind(update.notes)
        .bind(update.status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&**self.connection)
        .await?
        .ok_or(EnquiryError::NotFound)
    }

    async fn patch(&self, id: i64, fields: &Map<String, Value>) -> Result<Enquiry, EnquiryError> {
        let (sql, binds) = query::build_patch_update(id, fields, Utc::now())?;

        let mut query = sqlx::query_as::<_, Enquiry>(&sql);
        for param in binds {
            query = bind_param(query, param);
        }

        query
            .fetch_optional(&**self.connection)
            .await?
            .ok_or(EnquiryError::NotFound)
    }

    async fn delete(&self, id: i64) -> Result<i64, EnquiryError> {
        let deleted: Option<(i64,)> =
            sqlx::query_as("DELETE FROM enquiries WHERE id = ? RETURNING id")
                .bind(id)
                .fetch_optional(&**self.connection)
                .await?;

        deleted.map(|row| row.0).ok_or(EnquiryError::NotFound)
    }
}
