// SPDX-License-Identifier: MIT

use devhub_api::config::Config;
use devhub_api::db::FirestoreDb;
use devhub_api::routes::create_router;
use devhub_api::services::{
    IdentityService, MembershipService, ParticipationService, StorageService,
};
use devhub_api::AppState;
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
    FirestoreDb::new("test-project")
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
    let (router, state) = create_test_app_with_db(test_db_offline());
    (router, state)
}

/// Create a test app around a given database (offline mock or emulator).
#[allow(dead_code)]
pub fn create_test_app_with_db(db: FirestoreDb) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let identity = IdentityService::new_mock();
    let storage = StorageService::new_mock();
    let memberships = MembershipService::new(db.clone());
    let participation = ParticipationService::new(db.clone());

    let state = Arc::new(AppState {
        config,
        db,
        identity,
        storage,
        memberships,
        participation,
    });

    (create_router(state.clone()), state)
}

/// Create a test JWT for a uid using the test signing key.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    devhub_api::middleware::auth::create_jwt(user_id, signing_key)
        .expect("Failed to create test JWT")
}
