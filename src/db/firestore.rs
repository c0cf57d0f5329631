// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! One facade per entity, each with the same contract:
//! get / list / create / update / delete. Sub-collections (community
//! members, event participation sets) are reached through parent paths.
//!
//! Failure policy: provider errors map to [`AppError::Database`] and
//! propagate to the caller; there is no retry or backoff. Cascades are
//! caller-ordered child-first deletes, with no transactional guarantee
//! spanning a parent and its sub-collection.

use crate::db::collections;
use crate::error::AppError;
use crate::models::{
    Community, Company, Contributor, Event, Membership, Participation, Profile, Project,
};

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Which participation set of an event to operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipationKind {
    Interested,
    Attending,
}

impl ParticipationKind {
    /// Sub-collection name under `events/{id}`.
    pub fn collection(&self) -> &'static str {
        match self {
            ParticipationKind::Interested => collections::INTERESTED,
            ParticipationKind::Attending => collections::ATTENDEES,
        }
    }
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get a profile by the identity provider uid.
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::PROFILES)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List profiles for the directory, newest first with the uid as a
    /// tiebreaker.
    ///
    /// `before` is the `(created_at, user_id)` cursor boundary from a
    /// previous page. Rows sharing the boundary timestamp are kept by
    /// comparing uids, so equal `created_at` values cannot swallow
    /// entries between pages. There is no stable snapshot across pages
    /// if data mutates between requests.
    pub async fn list_profiles(
        &self,
        before: Option<(&str, &str)>,
        limit: u32,
    ) -> Result<Vec<Profile>, AppError> {
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::PROFILES);

        let query = if let Some((created_at, user_id)) = before {
            let created_at = created_at.to_string();
            let user_id = user_id.to_string();
            query.filter(move |q| {
                q.for_any([
                    q.field("created_at").less_than(created_at.clone()),
                    q.for_all([
                        q.field("created_at").eq(created_at.clone()),
                        q.field("user_id").less_than(user_id.clone()),
                    ]),
                ])
            })
        } else {
            query
        };

        query
            .order_by([
                (
                    "created_at",
                    firestore::FirestoreQueryDirection::Descending,
                ),
                ("user_id", firestore::FirestoreQueryDirection::Descending),
            ])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List every profile (admin dashboard counting).
    pub async fn list_all_profiles(&self) -> Result<Vec<Profile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::PROFILES)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a profile.
    pub async fn upsert_profile(&self, profile: &Profile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PROFILES)
            .document_id(&profile.user_id)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Community Operations ────────────────────────────────────

    pub async fn get_community(&self, id: &str) -> Result<Option<Community>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::COMMUNITIES)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all communities, newest first.
    pub async fn list_communities(&self) -> Result<Vec<Community>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::COMMUNITIES)
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn upsert_community(&self, community: &Community) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::COMMUNITIES)
            .document_id(&community.id)
            .object(community)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a community and its members sub-collection.
    ///
    /// Children first: sub-collection rows do not disappear with the
    /// parent document in Firestore.
    pub async fn delete_community(&self, id: &str) -> Result<(), AppError> {
        let members = self.list_members(id).await?;
        self.batch_delete_in_parent(
            &members,
            collections::COMMUNITIES,
            id,
            collections::MEMBERS,
            |m: &Membership| m.user_id.clone(),
        )
        .await?;
        tracing::debug!(community_id = id, count = members.len(), "Deleted members");

        self.get_client()?
            .fluent()
            .delete()
            .from(collections::COMMUNITIES)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Membership Sub-Collection ───────────────────────────────

    /// Get a user's membership row in a community, if any.
    pub async fn get_membership(
        &self,
        community_id: &str,
        user_id: &str,
    ) -> Result<Option<Membership>, AppError> {
        let client = self.get_client()?;
        let parent_path = client
            .parent_path(collections::COMMUNITIES, community_id)
            .map_err(|e| AppError::Database(e.to_string()))?;

        client
            .fluent()
            .select()
            .by_id_in(collections::MEMBERS)
            .parent(&parent_path)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all membership rows of a community (every role, pending included).
    pub async fn list_members(&self, community_id: &str) -> Result<Vec<Membership>, AppError> {
        let client = self.get_client()?;
        let parent_path = client
            .parent_path(collections::COMMUNITIES, community_id)
            .map_err(|e| AppError::Database(e.to_string()))?;

        client
            .fluent()
            .select()
            .from(collections::MEMBERS)
            .parent(&parent_path)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or overwrite a membership row. The document ID is the uid,
    /// so there is at most one row per (community, user) pair.
    pub async fn set_membership(&self, membership: &Membership) -> Result<(), AppError> {
        let client = self.get_client()?;
        let parent_path = client
            .parent_path(collections::COMMUNITIES, &membership.community_id)
            .map_err(|e| AppError::Database(e.to_string()))?;

        let _: () = client
            .fluent()
            .update()
            .in_col(collections::MEMBERS)
            .document_id(&membership.user_id)
            .parent(&parent_path)
            .object(membership)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Remove a membership row (leave / reject / remove).
    pub async fn delete_membership(
        &self,
        community_id: &str,
        user_id: &str,
    ) -> Result<(), AppError> {
        let client = self.get_client()?;
        let parent_path = client
            .parent_path(collections::COMMUNITIES, community_id)
            .map_err(|e| AppError::Database(e.to_string()))?;

        client
            .fluent()
            .delete()
            .from(collections::MEMBERS)
            .parent(&parent_path)
            .document_id(user_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Event Operations ────────────────────────────────────────

    pub async fn get_event(&self, id: &str) -> Result<Option<Event>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::EVENTS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List events, optionally restricted to one community, soonest first.
    pub async fn list_events(&self, community_id: Option<&str>) -> Result<Vec<Event>, AppError> {
        let query = self.get_client()?.fluent().select().from(collections::EVENTS);

        let query = if let Some(community_id) = community_id {
            let community_id = community_id.to_string();
            query.filter(move |q| q.for_all([q.field("community_id").eq(community_id.clone())]))
        } else {
            query
        };

        query
            .order_by([("starts_at", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn upsert_event(&self, event: &Event) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::EVENTS)
            .document_id(&event.id)
            .object(event)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete an event and both of its participation sub-collections.
    pub async fn delete_event(&self, id: &str) -> Result<(), AppError> {
        for kind in [ParticipationKind::Interested, ParticipationKind::Attending] {
            let rows = self.list_participants(id, kind).await?;
            self.batch_delete_in_parent(
                &rows,
                collections::EVENTS,
                id,
                kind.collection(),
                |p: &Participation| p.user_id.clone(),
            )
            .await?;
            tracing::debug!(
                event_id = id,
                set = kind.collection(),
                count = rows.len(),
                "Deleted participation rows"
            );
        }

        self.get_client()?
            .fluent()
            .delete()
            .from(collections::EVENTS)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Participation Sub-Collections ───────────────────────────

    /// List one participation set of an event. Counts reported to views
    /// are the length of this list, recomputed at fetch time.
    pub async fn list_participants(
        &self,
        event_id: &str,
        kind: ParticipationKind,
    ) -> Result<Vec<Participation>, AppError> {
        let client = self.get_client()?;
        let parent_path = client
            .parent_path(collections::EVENTS, event_id)
            .map_err(|e| AppError::Database(e.to_string()))?;

        client
            .fluent()
            .select()
            .from(kind.collection())
            .parent(&parent_path)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn get_participant(
        &self,
        event_id: &str,
        kind: ParticipationKind,
        user_id: &str,
    ) -> Result<Option<Participation>, AppError> {
        let client = self.get_client()?;
        let parent_path = client
            .parent_path(collections::EVENTS, event_id)
            .map_err(|e| AppError::Database(e.to_string()))?;

        client
            .fluent()
            .select()
            .by_id_in(kind.collection())
            .parent(&parent_path)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Upsert a participation row. Keyed by uid, so calling this twice
    /// for the same (user, event) overwrites one document rather than
    /// creating a second.
    pub async fn set_participant(
        &self,
        event_id: &str,
        kind: ParticipationKind,
        participation: &Participation,
    ) -> Result<(), AppError> {
        let client = self.get_client()?;
        let parent_path = client
            .parent_path(collections::EVENTS, event_id)
            .map_err(|e| AppError::Database(e.to_string()))?;

        let _: () = client
            .fluent()
            .update()
            .in_col(kind.collection())
            .document_id(&participation.user_id)
            .parent(&parent_path)
            .object(participation)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn delete_participant(
        &self,
        event_id: &str,
        kind: ParticipationKind,
        user_id: &str,
    ) -> Result<(), AppError> {
        let client = self.get_client()?;
        let parent_path = client
            .parent_path(collections::EVENTS, event_id)
            .map_err(|e| AppError::Database(e.to_string()))?;

        client
            .fluent()
            .delete()
            .from(kind.collection())
            .parent(&parent_path)
            .document_id(user_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Project Operations ──────────────────────────────────────

    pub async fn get_project(&self, id: &str) -> Result<Option<Project>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::PROJECTS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::PROJECTS)
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn upsert_project(&self, project: &Project) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PROJECTS)
            .document_id(&project.id)
            .object(project)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn delete_project(&self, id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::PROJECTS)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Contributor Operations ──────────────────────────────────

    /// Get a contributor record by uid. A present record grants
    /// platform-admin capability.
    pub async fn get_contributor(&self, user_id: &str) -> Result<Option<Contributor>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::CONTRIBUTORS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn list_contributors(&self) -> Result<Vec<Contributor>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CONTRIBUTORS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn upsert_contributor(&self, contributor: &Contributor) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::CONTRIBUTORS)
            .document_id(&contributor.user_id)
            .object(contributor)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn delete_contributor(&self, user_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::CONTRIBUTORS)
            .document_id(user_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Company Operations ──────────────────────────────────────

    pub async fn get_company(&self, id: &str) -> Result<Option<Company>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::COMPANIES)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn list_companies(&self) -> Result<Vec<Company>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::COMPANIES)
            .order_by([("name", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn upsert_company(&self, company: &Company) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::COMPANIES)
            .document_id(&company.id)
            .object(company)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn delete_company(&self, id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::COMPANIES)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Helper Methods ──────────────────────────────────────────

    /// Batch delete sub-collection documents under one parent using
    /// chunked transactions.
    async fn batch_delete_in_parent<T, F>(
        &self,
        items: &[T],
        parent_collection: &str,
        parent_id: &str,
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;
        let parent_path = client
            .parent_path(parent_collection, parent_id)
            .map_err(|e| AppError::Database(e.to_string()))?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .parent(&parent_path)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }
}
