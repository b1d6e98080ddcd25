//! Enquiry admin REST API
//!
//! Public form submissions land in the enquiries table; the admin
//! dashboard lists, filters, edits and deletes them.

use enquiry_admin_api::api;
use enquiry_admin_api::core::services::MyEnquiryService;
use enquiry_admin_api::infrastructure::database::DatabaseConnection;
use enquiry_admin_api::infrastructure::repositories::DbEnquiryRepository;

use anyhow::anyhow;
use axum::Router;
use axum::http::Method;
use di::{Injectable, ServiceCollection};
use di_axum::RouterServiceProviderExtensions;
use log::{error, info};
use std::env;
use tokio::runtime::{Builder, Runtime};
use tower_http::cors::{Any, CorsLayer};

fn main() -> anyhow::Result<()> {
    // initialize tracing
    tracing_subscriber::fmt::init();

    let runtime: Runtime = Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(web_server_task())
}

async fn web_server_task() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let provider = ServiceCollection::new()
        .add(DatabaseConnection::singleton())
        .add(DbEnquiryRepository::scoped())
        .add(MyEnquiryService::scoped())
        .build_provider()
        .map_err(|err| anyhow!("failed to build service provider: {err}"))?;

    // Surface a bad DATABASE_URL at startup instead of on the first request,
    // then make sure the enquiries table exists.
    let connection = provider.get_required::<DatabaseConnection>();
    match sqlx::query("SELECT 1").execute(&**connection).await {
        Ok(_) => info!("Database connected successfully"),
        Err(err) => error!("Database connection error: {err}"),
    }
    sqlx::migrate!().run(&**connection).await?;

    let app = Router::new()
        .nest("/api/admin/enquiries", api::enquiries::admin_router())
        .nest("/api/enquire", api::enquiries::public_router())
        .layer(
            CorsLayer::new()
                .allow_headers(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                ])
                .allow_origin(Any),
        )
        .with_provider(provider);

    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(5000);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(
        "Server running on port {}",
        listener.local_addr().map(|addr| addr.port()).unwrap_or(port)
    );
    axum::serve(listener, app).await?;
    info!("Shutting down...");

    Ok(())
}
