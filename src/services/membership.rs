// SPDX-License-Identifier: MIT

//! Membership state machine over community member rows.
//!
//! The pure role transitions live in `models::community`; this service
//! wires them to Firestore and enforces the guards on the server rather
//! than trusting the client UI:
//! - approve / reject / set_role / remove require the acting user to be
//!   a community admin
//! - the last remaining admin cannot leave, be removed or be demoted
//! - joining an already-joined community is a no-op (never overwrites
//!   the existing role)

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::community::{approve_transition, check_removal, check_role_update};
use crate::models::{MemberRole, Membership};

#[derive(Clone)]
pub struct MembershipService {
    db: FirestoreDb,
}

impl MembershipService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Join a community. Private communities produce a `pending` request,
    /// public ones admit directly as `member`. Re-joining returns the
    /// existing row unchanged.
    pub async fn join(&self, user_id: &str, community_id: &str) -> Result<Membership, AppError> {
        let community = self
            .db
            .get_community(community_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Community {} not found", community_id)))?;

        if let Some(existing) = self.db.get_membership(community_id, user_id).await? {
            tracing::debug!(
                user_id,
                community_id,
                role = ?existing.role,
                "Join request for existing membership (no-op)"
            );
            return Ok(existing);
        }

        let membership = Membership {
            community_id: community_id.to_string(),
            user_id: user_id.to_string(),
            role: MemberRole::initial(community.is_private),
            joined_at: chrono::Utc::now().to_rfc3339(),
        };
        self.db.set_membership(&membership).await?;

        tracing::info!(user_id, community_id, role = ?membership.role, "User joined community");
        Ok(membership)
    }

    /// Approve a pending join request: `pending -> member`. Admin-only.
    pub async fn approve(
        &self,
        acting_user: &str,
        community_id: &str,
        user_id: &str,
    ) -> Result<Membership, AppError> {
        self.require_admin(acting_user, community_id).await?;

        let mut membership = self.get_required(community_id, user_id).await?;
        membership.role = approve_transition(membership.role)
            .map_err(|e| AppError::Conflict(e.to_string()))?;
        self.db.set_membership(&membership).await?;

        tracing::info!(acting_user, user_id, community_id, "Join request approved");
        Ok(membership)
    }

    /// Reject a pending request or remove a member. Admin-only.
    pub async fn remove(
        &self,
        acting_user: &str,
        community_id: &str,
        user_id: &str,
    ) -> Result<(), AppError> {
        self.require_admin(acting_user, community_id).await?;

        let membership = self.get_required(community_id, user_id).await?;
        self.check_last_admin(&membership).await?;

        self.db.delete_membership(community_id, user_id).await?;
        tracing::info!(acting_user, user_id, community_id, "Membership removed");
        Ok(())
    }

    /// Leave a community (self-service removal, any role).
    pub async fn leave(&self, user_id: &str, community_id: &str) -> Result<(), AppError> {
        let membership = self.get_required(community_id, user_id).await?;
        self.check_last_admin(&membership).await?;

        self.db.delete_membership(community_id, user_id).await?;
        tracing::info!(user_id, community_id, "User left community");
        Ok(())
    }

    /// Overwrite a member's role to member/editor/admin. Admin-only.
    pub async fn set_role(
        &self,
        acting_user: &str,
        community_id: &str,
        user_id: &str,
        new_role: MemberRole,
    ) -> Result<Membership, AppError> {
        self.require_admin(acting_user, community_id).await?;

        let mut membership = self.get_required(community_id, user_id).await?;
        let admin_count = self.admin_count(community_id).await?;
        check_role_update(membership.role, new_role, admin_count)
            .map_err(|e| AppError::Conflict(e.to_string()))?;

        membership.role = new_role;
        self.db.set_membership(&membership).await?;

        tracing::info!(
            acting_user,
            user_id,
            community_id,
            role = ?new_role,
            "Member role updated"
        );
        Ok(membership)
    }

    /// Whether the user is an active (non-pending) member.
    pub async fn is_member(&self, user_id: &str, community_id: &str) -> Result<bool, AppError> {
        Ok(self
            .db
            .get_membership(community_id, user_id)
            .await?
            .map(|m| m.role.is_active())
            .unwrap_or(false))
    }

    /// Whether the user is an admin of the community.
    pub async fn is_admin(&self, user_id: &str, community_id: &str) -> Result<bool, AppError> {
        Ok(self
            .db
            .get_membership(community_id, user_id)
            .await?
            .map(|m| m.role.can_moderate())
            .unwrap_or(false))
    }

    /// Whether the user may manage events of the community (editor or admin).
    pub async fn can_manage_events(
        &self,
        user_id: &str,
        community_id: &str,
    ) -> Result<bool, AppError> {
        Ok(self
            .db
            .get_membership(community_id, user_id)
            .await?
            .map(|m| matches!(m.role, MemberRole::Editor | MemberRole::Admin))
            .unwrap_or(false))
    }

    async fn get_required(
        &self,
        community_id: &str,
        user_id: &str,
    ) -> Result<Membership, AppError> {
        self.db
            .get_membership(community_id, user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No membership for user {} in community {}",
                    user_id, community_id
                ))
            })
    }

    async fn require_admin(&self, acting_user: &str, community_id: &str) -> Result<(), AppError> {
        if self.is_admin(acting_user, community_id).await? {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    async fn admin_count(&self, community_id: &str) -> Result<usize, AppError> {
        Ok(self
            .db
            .list_members(community_id)
            .await?
            .iter()
            .filter(|m| m.role == MemberRole::Admin)
            .count())
    }

    async fn check_last_admin(&self, membership: &Membership) -> Result<(), AppError> {
        let admin_count = self.admin_count(&membership.community_id).await?;
        check_removal(membership.role, admin_count).map_err(|e| AppError::Conflict(e.to_string()))
    }
}
