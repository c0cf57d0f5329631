// SPDX-License-Identifier: MIT

//! Devhub API Server
//!
//! Serves the developer directory, communities, events, projects and
//! contributor listings backed by Firestore, with identity handled by
//! the external authentication provider.

use devhub_api::{
    config::Config,
    db::FirestoreDb,
    services::{IdentityService, MembershipService, ParticipationService, StorageService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Devhub API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Identity provider (sign-up / sign-in REST surface)
    let identity = IdentityService::new(config.firebase_api_key.clone());
    tracing::info!("Identity service initialized");

    // Blob storage for profile photos
    let storage = StorageService::new(config.storage_bucket.clone());

    // Business-logic services over the shared db handle
    let memberships = MembershipService::new(db.clone());
    let participation = ParticipationService::new(db.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        identity,
        storage,
        memberships,
        participation,
    });

    // Build router
    let app = devhub_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("devhub_api=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
