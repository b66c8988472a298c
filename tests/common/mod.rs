// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use lavanderia_inventory::config::Config;
use lavanderia_inventory::db::FirestoreDb;
use lavanderia_inventory::middleware::auth::create_jwt;
use lavanderia_inventory::models::{Role, User};
use lavanderia_inventory::routes::create_router;
use lavanderia_inventory::services::{
    AuditRecorder, IdentityClient, InventoryService, SessionService, SupplierService,
};
use lavanderia_inventory::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project", "_test")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db_offline();

    let sessions = SessionService::new(db.clone(), IdentityClient::new_mock(), &config);
    let audit = AuditRecorder::new(db.clone());
    let inventory = InventoryService::new(db.clone(), audit.clone());
    let suppliers = SupplierService::new(db.clone(), audit);

    let state = Arc::new(AppState {
        config,
        db,
        sessions,
        inventory,
        suppliers,
    });

    (create_router(state.clone()), state)
}

/// A user with the given role, for driving services and tokens.
#[allow(dead_code)]
pub fn test_user(role: Role) -> User {
    let name = match role {
        Role::Admin => "Marta Admin",
        Role::Operario => "Pedro Operario",
        Role::Invitado => "Invitado",
    };
    User {
        uid: format!("uid-{:?}", role).to_lowercase(),
        email: "staff@example.com".to_string(),
        display_name: name.to_string(),
        role,
    }
}

/// A valid session token for the test signing key.
#[allow(dead_code)]
pub fn session_token(role: Role, signing_key: &[u8]) -> String {
    create_jwt(&test_user(role), signing_key).expect("JWT creation failed")
}
