//! Admin dashboard client
//!
//! Mirrors the store into local state: the cached result set, a loading
//! flag, the last error message, the active search/sort/filter selections,
//! and the edit modal's in-progress draft. Search re-fetches are debounced;
//! single-field updates are optimistic in the sense that the server's
//! returned truth is merged into the cache on success and the cache is
//! left untouched on failure.

use std::sync::Arc;
use std::time::Duration;

use log::error;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::api::ErrorBody;
use crate::api::enquiries::schemas::{DeleteResponse, Enquiry, UpdateEnquiry};

/// Quiet period after the last keystroke before a search fetch fires.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// The edit modal's in-progress form.
#[derive(Debug, Clone)]
pub struct EditDraft {
    pub id: i64,
    pub form: UpdateEnquiry,
}

#[derive(Debug, Clone)]
pub struct AdminState {
    pub enquiries: Vec<Enquiry>,
    pub loading: bool,
    pub error: Option<String>,
    pub search: String,
    pub sort_field: String,
    pub sort_direction: String,
    pub status_filter: String,
    pub edit_draft: Option<EditDraft>,
}

impl Default for AdminState {
    fn default() -> Self {
        AdminState {
            enquiries: Vec::new(),
            loading: false,
            error: None,
            search: String::new(),
            sort_field: "created_at".to_owned(),
            sort_direction: "desc".to_owned(),
            status_filter: "all".to_owned(),
            edit_draft: None,
        }
    }
}

#[derive(Clone)]
pub struct AdminClient {
    http: reqwest::Client,
    base_url: Arc<String>,
    state: Arc<Mutex<AdminState>>,
    pending_search: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl AdminClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        AdminClient {
            http: reqwest::Client::new(),
            base_url: Arc::new(base_url.into()),
            state: Arc::new(Mutex::new(AdminState::default())),
            pending_search: Arc::new(Mutex::new(None)),
        }
    }

    /// A point-in-time copy of the client state.
    pub async fn state(&self) -> AdminState {
        self.state.lock().await.clone()
    }

    /// Re-fetch the list with the current search/sort/filter selections.
    pub async fn refresh(&self) {
        let query = {
            let mut state = self.state.lock().await;
            state.loading = true;

            let mut query: Vec<(&'static str, String)> = vec![
                ("sort", state.sort_field.clone()),
                ("direction", state.sort_direction.clone()),
            ];
            if state.status_filter != "all" {
                query.push(("status", state.status_filter.clone()));
            }
            if !state.search.is_empty() {
                query.push(("search", state.search.clone()));
            }
            query
        };

        let result = self.fetch_list(&query).await;

        let mut state = self.state.lock().await;
        match result {
            Ok(enquiries) => {
                state.enquiries = enquiries;
                state.error = None;
            }
            Err(message) => {
                error!("Error fetching enquiries: {message}");
                state.error = Some(message);
            }
        }
        state.loading = false;
    }

    async fn fetch_list(&self, query: &[(&'static str, String)]) -> Result<Vec<Enquiry>, String> {
        let response = self
            .http
            .get(format!("{}/api/admin/enquiries", self.base_url))
            .query(query)
            .send()
            .await
            .map_err(|err| err.to_string())?;

        if !response.status().is_success() {
            return Err(error_message(response).await);
        }
        response.json().await.map_err(|err| err.to_string())
    }

    pub async fn set_sort(&self, field: &str, direction: &str) {
        {
            let mut state = self.state.lock().await;
            state.sort_field = field.to_owned();
            state.sort_direction = direction.to_owned();
        }
        self.refresh().await;
    }

    /// Header-click semantics: the active column flips direction, a new
    /// column is selected ascending.
    pub async fn toggle_sort(&self, field: &str) {
        {
            let mut state = self.state.lock().await;
            if state.sort_field == field {
                state.sort_direction = if state.sort_direction == "asc" {
                    "desc".to_owned()
                } else {
                    "asc".to_owned()
                };
            } else {
                state.sort_field = field.to_owned();
                state.sort_direction = "asc".to_owned();
            }
        }
        self.refresh().await;
    }

    pub async fn set_status_filter(&self, status: &str) {
        {
            let mut state = self.state.lock().await;
            state.status_filter = status.to_owned();
        }
        self.refresh().await;
    }

    /// Record a keystroke. The actual fetch is scheduled [`SEARCH_DEBOUNCE`]
    /// later and rescheduled if another keystroke arrives first, so only
    /// the final pending fetch after a quiet period executes.
    pub async fn set_search(&self, text: &str) {
        {
            let mut state = self.state.lock().await;
            state.search = text.to_owned();
        }

        let mut pending = self.pending_search.lock().await;
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let client = self.clone();
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(SEARCH_DEBOUNCE).await;
            client.refresh().await;
        }));
    }

    /// Optimistic single-field update (contacted toggle, status dropdown).
    ///
    /// On success the server's returned record replaces the cached one; on
    /// failure the cache is left at its pre-update value and the error is
    /// returned for the caller to surface.
    pub async fn set_field(&self, id: i64, key: &str, value: Value) -> Result<(), String> {
        let mut fields = Map::new();
        fields.insert(key.to_owned(), value);
        self.patch(id, fields).await
    }

    pub async fn toggle_contacted(&self, id: i64) -> Result<(), String> {
        let current = {
            let state = self.state.lock().await;
            state
                .enquiries
                .iter()
                .find(|enquiry| enquiry.id == id)
                .map(|enquiry| enquiry.contacted)
        }
        .ok_or_else(|| format!("No cached enquiry with id {id}"))?;

        self.set_field(id, "contacted", Value::Bool(!current)).await
    }

    async fn patch(&self, id: i64, fields: Map<String, Value>) -> Result<(), String> {
        let response = self
            .http
            .patch(format!("{}/api/admin/enquiries/{id}", self.base_url))
            .json(&fields)
            .send()
            .await
            .map_err(|err| err.to_string())?;

        if !response.status().is_success() {
            let message = error_message(response).await;
            error!("Error updating enquiry {id}: {message}");
            return Err(message);
        }

        let updated: Enquiry = response.json().await.map_err(|err| err.to_string())?;
        let mut state = self.state.lock().await;
        if let Some(slot) = state
            .enquiries
            .iter_mut()
            .find(|enquiry| enquiry.id == updated.id)
        {
            *slot = updated;
        }
        Ok(())
    }

    /// Copy a cached record into the edit modal's draft. Returns false if
    /// the record is not in the cache.
    pub async fn open_editor(&self, id: i64) -> bool {
        let mut state = self.state.lock().await;
        let Some(enquiry) = state
            .enquiries
            .iter()
            .find(|enquiry| enquiry.id == id)
            .cloned()
        else {
            return false;
        };

        state.edit_draft = Some(EditDraft {
            id,
            form: UpdateEnquiry {
                uname: Some(enquiry.uname),
                email: Some(enquiry.email),
                mobile: Some(enquiry.mobile),
                contacted: enquiry.contacted,
                followup_date: enquiry.followup_date,
                notes: enquiry.notes,
                status: enquiry.status,
            },
        });
        true
    }

    pub async fn cancel_edit(&self) {
        self.state.lock().await.edit_draft = None;
    }

    /// Apply a change to the open draft, if any.
    pub async fn modify_draft(&self, change: impl FnOnce(&mut UpdateEnquiry)) {
        if let Some(draft) = self.state.lock().await.edit_draft.as_mut() {
            change(&mut draft.form);
        }
    }

    /// Submit the edit modal as a full replace.
    ///
    /// On success the server's representation replaces the cached item and
    /// the draft is cleared; on failure the draft stays (the modal remains
    /// open) and the error is returned for the caller to surface.
    pub async fn save_edit(&self) -> Result<(), String> {
        let draft = self
            .state
            .lock()
            .await
            .edit_draft
            .clone()
            .ok_or_else(|| "No edit in progress".to_owned())?;

        let response = self
            .http
            .put(format!("{}/api/admin/enquiries/{}", self.base_url, draft.id))
            .json(&draft.form)
            .send()
            .await
            .map_err(|err| err.to_string())?;

        if !response.status().is_success() {
            let message = error_message(response).await;
            error!("Error updating enquiry {}: {message}", draft.id);
            return Err(message);
        }

        let updated: Enquiry = response.json().await.map_err(|err| err.to_string())?;
        let mut state = self.state.lock().await;
        if let Some(slot) = state
            .enquiries
            .iter_mut()
            .find(|enquiry| enquiry.id == updated.id)
        {
            *slot = updated;
        }
        state.edit_draft = None;
        Ok(())
    }

    /// Issue the delete and drop the record from the cache on success.
    ///
    /// Deletion is irreversible; the caller is expected to have taken the
    /// user's confirmation before calling this.
    pub async fn delete(&self, id: i64) -> Result<(), String> {
        let response = self
            .http
            .delete(format!("{}/api/admin/enquiries/{id}", self.base_url))
            .send()
            .await
            .map_err(|err| err.to_string())?;

        if !response.status().is_success() {
            let message = error_message(response).await;
            error!("Error deleting enquiry {id}: {message}");
            return Err(message);
        }

        let deleted: DeleteResponse = response.json().await.map_err(|err| err.to_string())?;
        let mut state = self.state.lock().await;
        state.enquiries.retain(|enquiry| enquiry.id != deleted.id);
        Ok(())
    }
}

async fn error_message(response: reqwest::Response) -> String {
    match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => "Request failed".to_owned(),
    }
}
