// SPDX-License-Identifier: MIT

//! Event participation tracker.
//!
//! Two independent sets per event (interested, attending), each a
//! uid-keyed sub-collection. Counts are the cardinality of the sets,
//! recomputed on every fetch; there is no denormalized counter to
//! drift. Capacity is never enforced here.

use crate::db::firestore::ParticipationKind;
use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::Participation;
use futures_util::future;
use serde::Serialize;

/// Cardinality of both participation sets at fetch time.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ParticipationCounts {
    pub interested: u32,
    pub attendees: u32,
}

#[derive(Clone)]
pub struct ParticipationService {
    db: FirestoreDb,
}

impl ParticipationService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Add the user to one of the event's sets. Upserts the uid-keyed
    /// document, so repeated calls leave exactly one row.
    pub async fn set(
        &self,
        user_id: &str,
        event_id: &str,
        kind: ParticipationKind,
    ) -> Result<(), AppError> {
        self.require_event(event_id).await?;

        let row = Participation {
            user_id: user_id.to_string(),
            joined_at: chrono::Utc::now().to_rfc3339(),
        };
        self.db.set_participant(event_id, kind, &row).await?;

        tracing::debug!(user_id, event_id, set = kind.collection(), "Participation set");
        Ok(())
    }

    /// Remove the user from one of the event's sets. Removing an absent
    /// row is a no-op.
    pub async fn unset(
        &self,
        user_id: &str,
        event_id: &str,
        kind: ParticipationKind,
    ) -> Result<(), AppError> {
        self.require_event(event_id).await?;
        self.db.delete_participant(event_id, kind, user_id).await?;

        tracing::debug!(
            user_id,
            event_id,
            set = kind.collection(),
            "Participation removed"
        );
        Ok(())
    }

    /// Counts reported to views: one read per sub-collection per event,
    /// both sets fetched concurrently.
    pub async fn counts(&self, event_id: &str) -> Result<ParticipationCounts, AppError> {
        let (interested, attendees) = future::try_join(
            self.db
                .list_participants(event_id, ParticipationKind::Interested),
            self.db
                .list_participants(event_id, ParticipationKind::Attending),
        )
        .await?;

        Ok(ParticipationCounts {
            interested: interested.len() as u32,
            attendees: attendees.len() as u32,
        })
    }

    /// The current user's standing for an event detail view.
    pub async fn status(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> Result<(bool, bool), AppError> {
        let (interested, attending) = future::try_join(
            self.db
                .get_participant(event_id, ParticipationKind::Interested, user_id),
            self.db
                .get_participant(event_id, ParticipationKind::Attending, user_id),
        )
        .await?;
        Ok((interested.is_some(), attending.is_some()))
    }

    async fn require_event(&self, event_id: &str) -> Result<(), AppError> {
        self.db
            .get_event(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))?;
        Ok(())
    }
}
