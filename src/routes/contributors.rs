// SPDX-License-Identifier: MIT

//! Contributor credit list routes.
//!
//! The public list doubles as the platform credits page; write access
//! is admin-only because a contributor record grants admin capability.

use crate::error::{AppError, Result};
use crate::models::{Contributor, ContributorRole};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/contributors", get(list_contributors))
}

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/contributors/{uid}", put(upsert_contributor))
        .route("/api/admin/contributors/{uid}", delete(delete_contributor))
}

async fn list_contributors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Contributor>>> {
    Ok(Json(state.db.list_contributors().await?))
}

#[derive(Deserialize, Validate)]
pub struct UpsertContributor {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub role: ContributorRole,
    #[validate(url)]
    pub photo_url: Option<String>,
}

/// Create or update a contributor record for a uid. This also grants
/// the uid platform-admin capability.
async fn upsert_contributor(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
    Json(payload): Json<UpsertContributor>,
) -> Result<Json<Contributor>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let created_at = match state.db.get_contributor(&uid).await? {
        Some(existing) => existing.created_at,
        None => chrono::Utc::now().to_rfc3339(),
    };

    let contributor = Contributor {
        user_id: uid.clone(),
        name: payload.name,
        role: payload.role,
        photo_url: payload.photo_url,
        created_at,
    };
    state.db.upsert_contributor(&contributor).await?;

    tracing::info!(user_id = %uid, role = ?contributor.role, "Contributor record upserted");
    Ok(Json(contributor))
}

/// Remove a contributor record (and with it, admin capability).
async fn delete_contributor(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> Result<Json<serde_json::Value>> {
    state
        .db
        .get_contributor(&uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contributor {} not found", uid)))?;

    state.db.delete_contributor(&uid).await?;
    tracing::info!(user_id = %uid, "Contributor record deleted");
    Ok(Json(serde_json::json!({ "success": true })))
}
