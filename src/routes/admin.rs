// SPDX-License-Identifier: MIT

//! Admin dashboard routes.

use crate::error::Result;
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/admin/stats", get(get_stats))
}

/// Dashboard counts, each the cardinality of one collection at fetch
/// time.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub users: u32,
    pub communities: u32,
    pub events: u32,
    pub projects: u32,
    pub contributors: u32,
}

impl DashboardStats {
    pub fn from_counts(
        users: usize,
        communities: usize,
        events: usize,
        projects: usize,
        contributors: usize,
    ) -> Self {
        Self {
            users: users as u32,
            communities: communities as u32,
            events: events as u32,
            projects: projects as u32,
            contributors: contributors as u32,
        }
    }
}

/// Admin dashboard stats. O(collection) reads per request; fine at the
/// platform's scale, revisit if listings grow past a few thousand docs.
async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<DashboardStats>> {
    let profiles = state.db.list_all_profiles().await?;
    let communities = state.db.list_communities().await?;
    let events = state.db.list_events(None).await?;
    let projects = state.db.list_projects().await?;
    let contributors = state.db.list_contributors().await?;

    Ok(Json(DashboardStats::from_counts(
        profiles.len(),
        communities.len(),
        events.len(),
        projects.len(),
        contributors.len(),
    )))
}
