// SPDX-License-Identifier: MIT

//! Registration and login against the identity provider.
//!
//! The provider is treated as an opaque identity source; on success a
//! local session JWT is minted. Provider errors surface as user-facing
//! messages only at this boundary (everywhere else they are opaque).

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::create_jwt;
use crate::models::Profile;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub areas: Vec<String>,
    #[serde(default)]
    pub accepted_cookies: bool,
    #[serde(default)]
    pub accepted_privacy_policy: bool,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user_id: String,
}

/// Register: create the provider identity, then the profile document
/// keyed by the new uid, then mint a session.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<SessionResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if !payload.accepted_privacy_policy {
        return Err(AppError::BadRequest(
            "The privacy policy must be accepted to register".to_string(),
        ));
    }

    let identity = state
        .identity
        .sign_up(&payload.email, &payload.password)
        .await?;

    let now = chrono::Utc::now().to_rfc3339();
    let profile = Profile {
        user_id: identity.uid.clone(),
        first_name: payload.first_name,
        last_name: payload.last_name,
        email: Some(identity.email),
        github: None,
        linkedin: None,
        website: None,
        areas: payload.areas,
        experience: None,
        education_level: None,
        accepted_cookies: payload.accepted_cookies,
        accepted_privacy_policy: payload.accepted_privacy_policy,
        photo_url: None,
        created_at: now.clone(),
        updated_at: now,
    };
    state.db.upsert_profile(&profile).await?;

    tracing::info!(user_id = %identity.uid, "New user registered");

    let token = create_jwt(&identity.uid, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    Ok(Json(SessionResponse {
        token,
        user_id: identity.uid,
    }))
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Login: verify credentials with the provider and mint a session.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let identity = state
        .identity
        .sign_in(&payload.email, &payload.password)
        .await?;

    tracing::info!(user_id = %identity.uid, "User signed in");

    let token = create_jwt(&identity.uid, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    Ok(Json(SessionResponse {
        token,
        user_id: identity.uid,
    }))
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Logout. Sessions are stateless JWTs, so the server keeps nothing;
/// the client discards its token. Account "deletion" in the observed
/// flows is exactly this sign-out.
async fn logout() -> Json<LogoutResponse> {
    Json(LogoutResponse { success: true })
}
