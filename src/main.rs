// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Lavandería Inventory API Server
//!
//! Tracks product stock, suppliers, and the audit trail of every change,
//! backed by Firestore with sessions resolved through Firebase Auth.

use lavanderia_inventory::{
    config::Config,
    db::FirestoreDb,
    services::{AuditRecorder, IdentityClient, InventoryService, SessionService, SupplierService},
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
    tracing::info!(port = config.port, "Starting Lavandería Inventory API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id, &config.collection_suffix)
        .await
        .expect("Failed to connect to Firestore");

    // Identity provider client for interactive logins
    let identity = IdentityClient::new(config.identity_api_key.clone());

    // Session resolution with its profile cache
    let sessions = SessionService::new(db.clone(), identity, &config);
    tracing::info!("Session service initialized");

    // Repositories share one audit recorder so every write path lands in
    // the history collection
    let audit = AuditRecorder::new(db.clone());
    let inventory = InventoryService::new(db.clone(), audit.clone());
    let suppliers = SupplierService::new(db.clone(), audit);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        sessions,
        inventory,
        suppliers,
    });

    // Build router
    let app = lavanderia_inventory::routes::create_router(state);

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
                .add_directive("lavanderia_inventory=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
