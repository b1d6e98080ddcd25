//! Admin client tests
//!
//! Drives the AdminClient against a real server on a random local port.
//!
//! Serialized because the server side shares the global test pool.

use axum::extract::Request;
use axum::http::Method;
use axum::middleware::Next;
use chrono::Utc;
use di::{Injectable, ServiceCollection};
use di_axum::RouterServiceProviderExtensions;
use enquiry_admin_api::{
    api,
    client::{AdminClient, SEARCH_DEBOUNCE},
    core::services::MyEnquiryService,
    infrastructure::database::DatabaseConnection,
    infrastructure::repositories::DbEnquiryRepository,
};
use serde_json::json;
use serial_test::serial;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

static TEST_DB_COUNTER: AtomicU32 = AtomicU32::new(0);

async fn setup_test_db() -> SqlitePool {
    let db_num = TEST_DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    let db_url = format!("sqlite:file:clientdb{}?mode=memory&cache=shared", db_num);

    let pool = SqlitePool::connect(&db_url).await.unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();
    DatabaseConnection::set_test_pool(pool.clone());
    pool
}

/// Serve the app on a random port; returns the base URL, the pool, and a
/// counter of list requests the server has seen.
async fn spawn_test_server() -> (String, SqlitePool, Arc<AtomicUsize>) {
    let pool = setup_test_db().await;

    let provider = ServiceCollection::new()
        .add(DatabaseConnection::transient())
        .add(DbEnquiryRepository::scoped())
        .add(MyEnquiryService::scoped())
        .build_provider()
        .unwrap();

    let list_requests = Arc::new(AtomicUsize::new(0));
    let counter = list_requests.clone();

    let app = axum::Router::new()
        .nest("/api/admin/enquiries", api::enquiries::admin_router())
        .nest("/api/enquire", api::enquiries::public_router())
        .layer(axum::middleware::from_fn(
            move |request: Request, next: Next| {
                let counter = counter.clone();
                async move {
                    if request.method() == Method::GET
                        && request.uri().path() == "/api/admin/enquiries"
                    {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                    next.run(request).await
                }
            },
        ))
        .with_provider(provider);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), pool, list_requests)
}

async fn insert_enquiry(pool: &SqlitePool, uname: &str, email: &str) -> i64 {
    let now = Utc::now();
    let row: (i64,) = sqlx::query_as(
        "INSERT INTO enquiries (uname, email, mobile, created_at, updated_at, submission_datetime) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(uname)
    .bind(email)
    .bind("5550000")
    .bind(now)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .unwrap();
    row.0
}

#[tokio::test]
#[serial]
async fn test_refresh_loads_records() {
    let (base_url, pool, _) = spawn_test_server().await;
    insert_enquiry(&pool, "Alice", "a@x.com").await;
    insert_enquiry(&pool, "Bob", "b@x.com").await;

    let client = AdminClient::new(base_url);
    client.refresh().await;

    let state = client.state().await;
    assert_eq!(state.enquiries.len(), 2);
    assert!(!state.loading);
    assert!(state.error.is_none());

    DatabaseConnection::clear_test_pool();
}

#[tokio::test]
#[serial]
async fn test_debounced_search_collapses_keystrokes() {
    let (base_url, pool, list_requests) = spawn_test_server().await;
    insert_enquiry(&pool, "Alina", "alina@x.com").await;
    insert_enquiry(&pool, "Bob", "b@x.com").await;

    let client = AdminClient::new(base_url);
    client.refresh().await;
    assert_eq!(list_requests.load(Ordering::SeqCst), 1);

    // Three rapid keystrokes; only the last pending fetch may run
    client.set_search("a").await;
    client.set_search("al").await;
    client.set_search("ali").await;

    tokio::time::sleep(SEARCH_DEBOUNCE + Duration::from_millis(300)).await;

    assert_eq!(list_requests.load(Ordering::SeqCst), 2);
    let state = client.state().await;
    assert_eq!(state.search, "ali");
    assert_eq!(state.enquiries.len(), 1);
    assert_eq!(state.enquiries[0].uname, "Alina");

    DatabaseConnection::clear_test_pool();
}

#[tokio::test]
#[serial]
async fn test_optimistic_toggle_merges_server_truth() {
    let (base_url, pool, _) = spawn_test_server().await;
    let id = insert_enquiry(&pool, "Alice", "a@x.com").await;

    let client = AdminClient::new(base_url);
    client.refresh().await;

    client.toggle_contacted(id).await.unwrap();

    let state = client.state().await;
    assert!(state.enquiries[0].contacted);

    let row: (bool,) = sqlx::query_as("SELECT contacted FROM enquiries WHERE id = ?")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(row.0);

    DatabaseConnection::clear_test_pool();
}

#[tokio::test]
#[serial]
async fn test_failed_update_leaves_cache_untouched() {
    let (base_url, pool, _) = spawn_test_server().await;
    let id = insert_enquiry(&pool, "Alice", "a@x.com").await;

    let client = AdminClient::new(base_url);
    client.refresh().await;

    let err = client
        .set_field(id, "status", json!("spam"))
        .await
        .unwrap_err();
    assert_eq!(err, "Invalid status value");

    let state = client.state().await;
    assert_eq!(
        serde_json::to_value(state.enquiries[0].status).unwrap(),
        json!("new")
    );

    DatabaseConnection::clear_test_pool();
}

#[tokio::test]
#[serial]
async fn test_save_edit_replaces_cached_item() {
    let (base_url, pool, _) = spawn_test_server().await;
    let id = insert_enquiry(&pool, "Alice", "a@x.com").await;

    let client = AdminClient::new(base_url);
    client.refresh().await;

    assert!(client.open_editor(id).await);
    client
        .modify_draft(|form| form.notes = Some("called back".to_owned()))
        .await;
    client.save_edit().await.unwrap();

    let state = client.state().await;
    assert_eq!(state.enquiries[0].notes.as_deref(), Some("called back"));
    assert!(state.edit_draft.is_none());

    DatabaseConnection::clear_test_pool();
}

#[tokio::test]
#[serial]
async fn test_failed_save_keeps_modal_open() {
    let (base_url, pool, _) = spawn_test_server().await;
    let id = insert_enquiry(&pool, "Alice", "a@x.com").await;

    let client = AdminClient::new(base_url);
    client.refresh().await;

    assert!(client.open_editor(id).await);
    client.modify_draft(|form| form.uname = Some("  ".to_owned())).await;

    let err = client.save_edit().await.unwrap_err();
    assert_eq!(err, "Name, email, and mobile are required fields");

    let state = client.state().await;
    assert!(state.edit_draft.is_some());
    assert_eq!(state.enquiries[0].uname, "Alice");

    DatabaseConnection::clear_test_pool();
}

#[tokio::test]
#[serial]
async fn test_delete_removes_from_cache() {
    let (base_url, pool, _) = spawn_test_server().await;
    let id = insert_enquiry(&pool, "Alice", "a@x.com").await;

    let client = AdminClient::new(base_url);
    client.refresh().await;
    assert_eq!(client.state().await.enquiries.len(), 1);

    client.delete(id).await.unwrap();
    assert!(client.state().await.enquiries.is_empty());

    let err = client.delete(id).await.unwrap_err();
    assert_eq!(err, "Enquiry not found");

    DatabaseConnection::clear_test_pool();
}
