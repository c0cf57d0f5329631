// SPDX-License-Identifier: MIT

//! Community CRUD and membership routes.
//!
//! Membership guards (admin-only approval, last-admin protection) are
//! enforced by `MembershipService`, not by hiding buttons in the UI.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Community, MemberRole, Membership};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// Catalog reads, available without a session.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/communities", get(list_communities))
        .route("/api/communities/{id}", get(get_community))
}

/// Mutations and member views, session required.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/communities", post(create_community))
        .route(
            "/api/communities/{id}",
            put(update_community).delete(delete_community),
        )
        .route("/api/communities/{id}/join", post(join_community))
        .route("/api/communities/{id}/leave", post(leave_community))
        .route("/api/communities/{id}/members", get(list_members))
        .route(
            "/api/communities/{id}/members/{uid}/approve",
            post(approve_member),
        )
        .route("/api/communities/{id}/members/{uid}", delete(remove_member))
        .route("/api/communities/{id}/members/{uid}/role", put(set_role))
}

// ─── Community CRUD ──────────────────────────────────────────

async fn list_communities(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Community>>> {
    Ok(Json(state.db.list_communities().await?))
}

async fn get_community(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Community>> {
    let community = state
        .db
        .get_community(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Community {} not found", id)))?;
    Ok(Json(community))
}

#[derive(Deserialize, Validate)]
pub struct CreateCommunity {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(url)]
    pub chat_link: Option<String>,
    #[serde(default)]
    pub is_private: bool,
}

/// Create a community. The creator becomes its first admin.
async fn create_community(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateCommunity>,
) -> Result<Json<Community>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let now = chrono::Utc::now().to_rfc3339();
    let community = Community {
        id: uuid::Uuid::new_v4().to_string(),
        name: payload.name,
        description: payload.description,
        website: payload.website,
        chat_link: payload.chat_link,
        is_private: payload.is_private,
        created_by: user.user_id.clone(),
        created_at: now.clone(),
        updated_at: now.clone(),
    };
    state.db.upsert_community(&community).await?;

    // The creator is the first admin; without this row nobody could
    // approve requests or manage roles.
    let membership = Membership {
        community_id: community.id.clone(),
        user_id: user.user_id.clone(),
        role: MemberRole::Admin,
        joined_at: now,
    };
    state.db.set_membership(&membership).await?;

    tracing::info!(community_id = %community.id, created_by = %user.user_id, "Community created");
    Ok(Json(community))
}

#[derive(Deserialize, Validate)]
pub struct UpdateCommunity {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub description: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(url)]
    pub chat_link: Option<String>,
    pub is_private: Option<bool>,
}

/// Update a community. Community-admin only.
async fn update_community(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCommunity>,
) -> Result<Json<Community>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if !state.memberships.is_admin(&user.user_id, &id).await? {
        return Err(AppError::Forbidden);
    }

    let mut community = state
        .db
        .get_community(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Community {} not found", id)))?;

    if let Some(v) = payload.name {
        community.name = v;
    }
    if let Some(v) = payload.description {
        community.description = v;
    }
    if let Some(v) = payload.website {
        community.website = Some(v);
    }
    if let Some(v) = payload.chat_link {
        community.chat_link = Some(v);
    }
    if let Some(v) = payload.is_private {
        community.is_private = v;
    }
    community.updated_at = chrono::Utc::now().to_rfc3339();

    state.db.upsert_community(&community).await?;
    Ok(Json(community))
}

/// Delete a community and its members. Community-admin only.
async fn delete_community(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    if !state.memberships.is_admin(&user.user_id, &id).await? {
        return Err(AppError::Forbidden);
    }

    state
        .db
        .get_community(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Community {} not found", id)))?;

    state.db.delete_community(&id).await?;
    tracing::info!(community_id = %id, deleted_by = %user.user_id, "Community deleted");
    Ok(Json(serde_json::json!({ "success": true })))
}

// ─── Membership ──────────────────────────────────────────────

async fn join_community(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Membership>> {
    Ok(Json(state.memberships.join(&user.user_id, &id).await?))
}

async fn leave_community(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    state.memberships.leave(&user.user_id, &id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

#[derive(Deserialize)]
struct MembersQuery {
    /// Show the pending-request view instead of active members
    #[serde(default)]
    pending: bool,
}

/// List a community's members. The pending view is restricted to the
/// community's admins.
async fn list_members(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Query(params): Query<MembersQuery>,
) -> Result<Json<Vec<Membership>>> {
    state
        .db
        .get_community(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Community {} not found", id)))?;

    if params.pending && !state.memberships.is_admin(&user.user_id, &id).await? {
        return Err(AppError::Forbidden);
    }

    let members = state
        .db
        .list_members(&id)
        .await?
        .into_iter()
        .filter(|m| {
            if params.pending {
                m.role == MemberRole::Pending
            } else {
                m.role.is_active()
            }
        })
        .collect();

    Ok(Json(members))
}

async fn approve_member(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((id, uid)): Path<(String, String)>,
) -> Result<Json<Membership>> {
    Ok(Json(
        state.memberships.approve(&user.user_id, &id, &uid).await?,
    ))
}

/// Reject a pending request or remove an active member.
async fn remove_member(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((id, uid)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>> {
    state.memberships.remove(&user.user_id, &id, &uid).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

#[derive(Deserialize)]
struct SetRoleRequest {
    role: MemberRole,
}

async fn set_role(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((id, uid)): Path<(String, String)>,
    Json(payload): Json<SetRoleRequest>,
) -> Result<Json<Membership>> {
    Ok(Json(
        state
            .memberships
            .set_role(&user.user_id, &id, &uid, payload.role)
            .await?,
    ))
}
