// SPDX-License-Identifier: MIT

//! Devhub: community platform backend API
//!
//! This crate provides the backend API for the developer directory,
//! communities, events, projects and contributor listings, persisted
//! in Firestore behind a typed data-access facade.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::FirestoreDb;
use services::{IdentityService, MembershipService, ParticipationService, StorageService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub identity: IdentityService,
    pub storage: StorageService,
    pub memberships: MembershipService,
    pub participation: ParticipationService,
}
