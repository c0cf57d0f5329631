// SPDX-License-Identifier: MIT

//! Project showcase routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Project, ProjectCategory};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/projects", get(list_projects))
        .route("/api/projects/{id}", get(get_project))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/projects", post(create_project))
        .route("/api/projects/{id}", put(update_project).delete(delete_project))
}

async fn list_projects(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Project>>> {
    Ok(Json(state.db.list_projects().await?))
}

async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Project>> {
    let project = state
        .db
        .get_project(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {} not found", id)))?;
    Ok(Json(project))
}

#[derive(Deserialize, Validate)]
pub struct CreateProject {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    pub category: ProjectCategory,
    #[validate(url)]
    pub link: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
}

/// Create a project authored by the current user. The author name is
/// denormalized from the profile at creation time.
async fn create_project(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateProject>,
) -> Result<Json<Project>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let author = state
        .db
        .get_profile(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", user.user_id)))?;

    let now = chrono::Utc::now().to_rfc3339();
    let project = Project {
        id: uuid::Uuid::new_v4().to_string(),
        title: payload.title,
        description: payload.description,
        category: payload.category,
        author_id: user.user_id.clone(),
        author_name: author.display_name(),
        link: payload.link,
        image_url: payload.image_url,
        created_at: now.clone(),
        updated_at: now,
    };
    state.db.upsert_project(&project).await?;

    tracing::info!(project_id = %project.id, author_id = %user.user_id, "Project created");
    Ok(Json(project))
}

#[derive(Deserialize, Validate)]
pub struct UpdateProject {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub description: Option<String>,
    pub category: Option<ProjectCategory>,
    #[validate(url)]
    pub link: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
}

/// Update a project. Author-only.
async fn update_project(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProject>,
) -> Result<Json<Project>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut project = state
        .db
        .get_project(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {} not found", id)))?;

    if project.author_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    if let Some(v) = payload.title {
        project.title = v;
    }
    if let Some(v) = payload.description {
        project.description = v;
    }
    if let Some(v) = payload.category {
        project.category = v;
    }
    if let Some(v) = payload.link {
        project.link = Some(v);
    }
    if let Some(v) = payload.image_url {
        project.image_url = Some(v);
    }
    project.updated_at = chrono::Utc::now().to_rfc3339();

    state.db.upsert_project(&project).await?;
    Ok(Json(project))
}

/// Delete a project. Author-only.
async fn delete_project(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let project = state
        .db
        .get_project(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {} not found", id)))?;

    if project.author_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    state.db.delete_project(&id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
