// SPDX-License-Identifier: MIT

//! Developer directory and own-profile routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::profile::ProfileUpdate;
use crate::models::Profile;
use crate::services::directory::{self, DirectoryFilter};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Extension, Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

const MAX_PER_PAGE: u32 = 100;
const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/profiles", get(list_profiles))
        .route("/api/profiles/{id}", get(get_profile))
        .route("/api/me", get(get_me).put(update_me))
        .route("/api/me/photo", post(upload_photo).delete(delete_photo))
}

// ─── Directory Listing ───────────────────────────────────────

#[derive(Deserialize)]
struct DirectoryQuery {
    /// Comma-separated expertise tags
    areas: Option<String>,
    /// Case-insensitive name search
    name: Option<String>,
    /// Cursor for forward pagination (opaque token)
    cursor: Option<String>,
    /// Pagination: items per page
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_per_page() -> u32 {
    50
}

/// Cursor position within the created_at-descending profile listing.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ProfileCursor {
    created_at: String,
    user_id: String,
}

fn parse_cursor(cursor: Option<&str>) -> Result<Option<ProfileCursor>> {
    cursor
        .map(|raw| {
            let invalid_cursor =
                || AppError::BadRequest("Invalid 'cursor' parameter".to_string());

            let decoded = URL_SAFE_NO_PAD.decode(raw).map_err(|_| invalid_cursor())?;
            let decoded_str = String::from_utf8(decoded).map_err(|_| invalid_cursor())?;

            // RFC 3339 timestamps contain ':', so split on '|'
            let (created_at, user_id) =
                decoded_str.split_once('|').ok_or_else(invalid_cursor)?;
            if created_at.is_empty() || user_id.is_empty() {
                return Err(invalid_cursor());
            }

            Ok(ProfileCursor {
                created_at: created_at.to_string(),
                user_id: user_id.to_string(),
            })
        })
        .transpose()
}

fn encode_cursor(cursor: &ProfileCursor) -> String {
    URL_SAFE_NO_PAD.encode(format!("{}|{}", cursor.created_at, cursor.user_id))
}

/// Directory entry. Email and consent flags stay private to the owner.
#[derive(Serialize)]
pub struct ProfileSummary {
    pub user_id: String,
    pub name: String,
    pub areas: Vec<String>,
    pub experience: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub photo_url: Option<String>,
}

impl From<Profile> for ProfileSummary {
    fn from(p: Profile) -> Self {
        ProfileSummary {
            name: p.display_name(),
            user_id: p.user_id,
            areas: p.areas,
            experience: p.experience,
            github: p.github,
            linkedin: p.linkedin,
            website: p.website,
            photo_url: p.photo_url,
        }
    }
}

#[derive(Serialize)]
pub struct DirectoryResponse {
    pub profiles: Vec<ProfileSummary>,
    pub per_page: u32,
    pub next_cursor: Option<String>,
}

/// List the developer directory, newest first, with in-memory area and
/// name filtering over each fetched page.
///
/// There is no stable snapshot across pages: concurrent registrations
/// can shift the boundary between requests.
async fn list_profiles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DirectoryQuery>,
) -> Result<Json<DirectoryResponse>> {
    let limit = params.per_page.clamp(1, MAX_PER_PAGE);
    let cursor = parse_cursor(params.cursor.as_deref())?;

    let filter = DirectoryFilter {
        areas: params
            .areas
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default(),
        name: params.name.filter(|s| !s.trim().is_empty()),
    };

    // Fetch one extra item to determine if another page is available.
    let fetch_limit = limit.saturating_add(1);
    let mut page = state
        .db
        .list_profiles(
            cursor
                .as_ref()
                .map(|c| (c.created_at.as_str(), c.user_id.as_str())),
            fetch_limit,
        )
        .await?;

    let has_more = page.len() > limit as usize;
    if has_more {
        page.truncate(limit as usize);
    }

    let next_cursor = if has_more {
        page.last().map(|p| {
            encode_cursor(&ProfileCursor {
                created_at: p.created_at.clone(),
                user_id: p.user_id.clone(),
            })
        })
    } else {
        None
    };

    let profiles: Vec<ProfileSummary> = directory::apply_filter(page, &filter)
        .into_iter()
        .map(ProfileSummary::from)
        .collect();

    Ok(Json(DirectoryResponse {
        profiles,
        per_page: limit,
        next_cursor,
    }))
}

/// Get a single directory profile.
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProfileSummary>> {
    let profile = state
        .db
        .get_profile(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", id)))?;

    Ok(Json(ProfileSummary::from(profile)))
}

// ─── Own Profile ─────────────────────────────────────────────

/// Get the authenticated user's full profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Profile>> {
    let profile = state
        .db
        .get_profile(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", user.user_id)))?;

    Ok(Json(profile))
}

/// Update the authenticated user's profile. Owner-only by construction:
/// the target document is always the session uid.
async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<Profile>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut profile = state
        .db
        .get_profile(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", user.user_id)))?;

    profile.apply(payload, &chrono::Utc::now().to_rfc3339());
    state.db.upsert_profile(&profile).await?;

    Ok(Json(profile))
}

// ─── Profile Photo ───────────────────────────────────────────

#[derive(Serialize)]
pub struct PhotoResponse {
    pub photo_url: Option<String>,
}

/// Upload a new profile photo. Replaces (and best-effort deletes) the
/// previous one.
async fn upload_photo(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PhotoResponse>> {
    if body.is_empty() {
        return Err(AppError::BadRequest("Empty photo upload".to_string()));
    }
    if body.len() > MAX_PHOTO_BYTES {
        return Err(AppError::BadRequest(
            "Photo exceeds the 5 MiB limit".to_string(),
        ));
    }

    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");
    if !content_type.starts_with("image/") {
        return Err(AppError::BadRequest(
            "Photo must be an image content type".to_string(),
        ));
    }

    let mut profile = state
        .db
        .get_profile(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", user.user_id)))?;

    let url = state
        .storage
        .upload_profile_photo(&user.user_id, body.to_vec(), content_type)
        .await?;

    if let Some(old_url) = profile.photo_url.replace(url) {
        if let Err(e) = state.storage.delete_by_url(&old_url).await {
            tracing::warn!(error = %e, "Failed to delete replaced profile photo");
        }
    }
    profile.updated_at = chrono::Utc::now().to_rfc3339();
    state.db.upsert_profile(&profile).await?;

    Ok(Json(PhotoResponse {
        photo_url: profile.photo_url,
    }))
}

/// Remove the profile photo.
async fn delete_photo(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<PhotoResponse>> {
    let mut profile = state
        .db
        .get_profile(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", user.user_id)))?;

    if let Some(old_url) = profile.photo_url.take() {
        state.storage.delete_by_url(&old_url).await?;
        profile.updated_at = chrono::Utc::now().to_rfc3339();
        state.db.upsert_profile(&profile).await?;
    }

    Ok(Json(PhotoResponse { photo_url: None }))
}

// Route registration note: `routes()` is merged under `require_auth`,
// so even the directory listing requires a session (profiles carry
// contact links).
