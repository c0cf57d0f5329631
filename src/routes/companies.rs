// SPDX-License-Identifier: MIT

//! Company listing routes (admin-managed).

use crate::error::{AppError, Result};
use crate::models::Company;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/companies", get(list_companies))
        .route("/api/companies/{id}", get(get_company))
}

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/companies", post(create_company))
        .route(
            "/api/admin/companies/{id}",
            put(update_company).delete(delete_company),
        )
}

async fn list_companies(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Company>>> {
    Ok(Json(state.db.list_companies().await?))
}

async fn get_company(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Company>> {
    let company = state
        .db
        .get_company(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Company {} not found", id)))?;
    Ok(Json(company))
}

#[derive(Deserialize, Validate)]
pub struct CreateCompany {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(url)]
    pub logo_url: Option<String>,
}

async fn create_company(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateCompany>,
) -> Result<Json<Company>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let now = chrono::Utc::now().to_rfc3339();
    let company = Company {
        id: uuid::Uuid::new_v4().to_string(),
        name: payload.name,
        description: payload.description,
        website: payload.website,
        logo_url: payload.logo_url,
        created_at: now.clone(),
        updated_at: now,
    };
    state.db.upsert_company(&company).await?;

    tracing::info!(company_id = %company.id, "Company created");
    Ok(Json(company))
}

#[derive(Deserialize, Validate)]
pub struct UpdateCompany {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub description: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(url)]
    pub logo_url: Option<String>,
}

async fn update_company(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCompany>,
) -> Result<Json<Company>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut company = state
        .db
        .get_company(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Company {} not found", id)))?;

    if let Some(v) = payload.name {
        company.name = v;
    }
    if let Some(v) = payload.description {
        company.description = v;
    }
    if let Some(v) = payload.website {
        company.website = Some(v);
    }
    if let Some(v) = payload.logo_url {
        company.logo_url = Some(v);
    }
    company.updated_at = chrono::Utc::now().to_rfc3339();

    state.db.upsert_company(&company).await?;
    Ok(Json(company))
}

async fn delete_company(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    state
        .db
        .get_company(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Company {} not found", id)))?;

    state.db.delete_company(&id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
