// SPDX-License-Identifier: MIT

//! Event CRUD and participation routes.
//!
//! Listings carry `interested_count` / `attendees_count` computed from
//! the sub-collection cardinalities at fetch time: one extra read per
//! event per set. Capacity is informational only.

use crate::db::firestore::ParticipationKind;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::Event;
use crate::services::ParticipationCounts;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::{Validate, ValidateUrl};

/// Catalog reads, available without a session.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/events", get(list_events))
        .route("/api/events/{id}", get(get_event))
}

/// Mutations and per-user participation, session required.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/events", post(create_event))
        .route("/api/events/{id}", put(update_event).delete(delete_event))
        .route(
            "/api/events/{id}/interested",
            put(mark_interested).delete(unmark_interested),
        )
        .route(
            "/api/events/{id}/attendance",
            put(confirm_attendance).delete(cancel_attendance),
        )
        .route("/api/events/{id}/participation", get(my_participation))
}

// ─── Event Views ─────────────────────────────────────────────

#[derive(Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub interested_count: u32,
    pub attendees_count: u32,
}

#[derive(Deserialize)]
struct EventsQuery {
    /// Restrict to one organizing community
    community: Option<String>,
}

async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsQuery>,
) -> Result<Json<Vec<EventView>>> {
    let events = state.db.list_events(params.community.as_deref()).await?;

    let mut views = Vec::with_capacity(events.len());
    for event in events {
        let ParticipationCounts {
            interested,
            attendees,
        } = state.participation.counts(&event.id).await?;
        views.push(EventView {
            event,
            interested_count: interested,
            attendees_count: attendees,
        });
    }

    Ok(Json(views))
}

async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<EventView>> {
    let event = state
        .db
        .get_event(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {} not found", id)))?;

    let ParticipationCounts {
        interested,
        attendees,
    } = state.participation.counts(&id).await?;

    Ok(Json(EventView {
        event,
        interested_count: interested,
        attendees_count: attendees,
    }))
}

// ─── Event CRUD ──────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct CreateEvent {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    /// RFC 3339 start timestamp
    pub starts_at: String,
    pub ends_at: Option<String>,
    #[validate(length(max = 500))]
    pub location: Option<String>,
    #[validate(url)]
    pub meeting_link: Option<String>,
    pub community_id: String,
    #[validate(length(max = 100))]
    pub attraction_type: Option<String>,
    pub capacity: Option<u32>,
}

fn parse_rfc3339(raw: &str, field: &str) -> Result<String> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&chrono::Utc).to_rfc3339())
        .map_err(|_| AppError::BadRequest(format!("'{}' must be an RFC 3339 datetime", field)))
}

/// Create an event. Requires editor or admin in the organizing community.
async fn create_event(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateEvent>,
) -> Result<Json<Event>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    state
        .db
        .get_community(&payload.community_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Community {} not found", payload.community_id))
        })?;

    if !state
        .memberships
        .can_manage_events(&user.user_id, &payload.community_id)
        .await?
    {
        return Err(AppError::Forbidden);
    }

    let starts_at = parse_rfc3339(&payload.starts_at, "starts_at")?;
    let ends_at = payload
        .ends_at
        .as_deref()
        .map(|raw| parse_rfc3339(raw, "ends_at"))
        .transpose()?;

    let now = chrono::Utc::now().to_rfc3339();
    let event = Event {
        id: uuid::Uuid::new_v4().to_string(),
        title: payload.title,
        description: payload.description,
        starts_at,
        ends_at,
        location: payload.location,
        meeting_link: payload.meeting_link,
        community_id: payload.community_id,
        created_by: user.user_id.clone(),
        attraction_type: payload.attraction_type,
        capacity: payload.capacity,
        created_at: now.clone(),
        updated_at: now,
    };
    state.db.upsert_event(&event).await?;

    tracing::info!(event_id = %event.id, community_id = %event.community_id, "Event created");
    Ok(Json(event))
}

/// Deserialize a field where JSON `null` means "clear the value" while
/// an absent field means "leave it unchanged".
fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

#[derive(Deserialize, Validate)]
pub struct UpdateEvent {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub description: Option<String>,
    pub starts_at: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub ends_at: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub meeting_link: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub attraction_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub capacity: Option<Option<u32>>,
}

impl UpdateEvent {
    /// Checks the derive macro cannot express for double-optional fields.
    fn validate_clearable_fields(&self) -> Result<()> {
        if let Some(Some(link)) = &self.meeting_link {
            if !link.validate_url() {
                return Err(AppError::BadRequest(
                    "'meeting_link' must be a valid URL".to_string(),
                ));
            }
        }
        if let Some(Some(location)) = &self.location {
            if location.len() > 500 {
                return Err(AppError::BadRequest("'location' is too long".to_string()));
            }
        }
        if let Some(Some(kind)) = &self.attraction_type {
            if kind.len() > 100 {
                return Err(AppError::BadRequest(
                    "'attraction_type' is too long".to_string(),
                ));
            }
        }
        Ok(())
    }
}

async fn update_event(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateEvent>,
) -> Result<Json<Event>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    payload.validate_clearable_fields()?;

    let mut event = state
        .db
        .get_event(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {} not found", id)))?;

    if !state
        .memberships
        .can_manage_events(&user.user_id, &event.community_id)
        .await?
    {
        return Err(AppError::Forbidden);
    }

    if let Some(v) = payload.title {
        event.title = v;
    }
    if let Some(v) = payload.description {
        event.description = v;
    }
    if let Some(raw) = payload.starts_at {
        event.starts_at = parse_rfc3339(&raw, "starts_at")?;
    }
    if let Some(v) = payload.ends_at {
        event.ends_at = v
            .as_deref()
            .map(|raw| parse_rfc3339(raw, "ends_at"))
            .transpose()?;
    }
    if let Some(v) = payload.location {
        event.location = v;
    }
    if let Some(v) = payload.meeting_link {
        event.meeting_link = v;
    }
    if let Some(v) = payload.attraction_type {
        event.attraction_type = v;
    }
    if let Some(v) = payload.capacity {
        event.capacity = v;
    }
    event.updated_at = chrono::Utc::now().to_rfc3339();

    state.db.upsert_event(&event).await?;
    Ok(Json(event))
}

/// Delete an event and both participation sets.
async fn delete_event(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let event = state
        .db
        .get_event(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {} not found", id)))?;

    if !state
        .memberships
        .can_manage_events(&user.user_id, &event.community_id)
        .await?
    {
        return Err(AppError::Forbidden);
    }

    state.db.delete_event(&id).await?;
    tracing::info!(event_id = %id, deleted_by = %user.user_id, "Event deleted");
    Ok(Json(serde_json::json!({ "success": true })))
}

// ─── Participation ───────────────────────────────────────────

async fn mark_interested(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    state
        .participation
        .set(&user.user_id, &id, ParticipationKind::Interested)
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

async fn unmark_interested(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    state
        .participation
        .unset(&user.user_id, &id, ParticipationKind::Interested)
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

async fn confirm_attendance(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    state
        .participation
        .set(&user.user_id, &id, ParticipationKind::Attending)
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

async fn cancel_attendance(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    state
        .participation
        .unset(&user.user_id, &id, ParticipationKind::Attending)
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

#[derive(Serialize)]
pub struct MyParticipation {
    pub interested: bool,
    pub attending: bool,
}

/// The current user's standing for an event.
async fn my_participation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<MyParticipation>> {
    let (interested, attending) = state.participation.status(&user.user_id, &id).await?;
    Ok(Json(MyParticipation {
        interested,
        attending,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_null_clears_and_absent_keeps() {
        let payload: UpdateEvent =
            serde_json::from_str(r#"{"location": null, "capacity": 50}"#).unwrap();

        assert_eq!(payload.location, Some(None)); // explicit clear
        assert_eq!(payload.capacity, Some(Some(50))); // overwrite
        assert_eq!(payload.meeting_link, None); // untouched
        assert_eq!(payload.ends_at, None);
    }

    #[test]
    fn test_update_rejects_bad_meeting_link() {
        let payload: UpdateEvent =
            serde_json::from_str(r#"{"meeting_link": "not a url"}"#).unwrap();
        assert!(payload.validate_clearable_fields().is_err());

        let payload: UpdateEvent = serde_json::from_str(r#"{"meeting_link": null}"#).unwrap();
        assert!(payload.validate_clearable_fields().is_ok());
    }
}
