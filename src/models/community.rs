// SPDX-License-Identifier: MIT

//! Community and membership models.
//!
//! The membership role transitions are kept as pure functions here so
//! the state machine can be tested without a database:
//!
//! ```text
//! none ──join──> pending (private) ──approve──> member <──> editor <──> admin
//!        └─join─> member (public)
//! any role ──leave/reject/remove──> none
//! ```

use serde::{Deserialize, Serialize};

/// A community: name, links, visibility. Owns a `members` sub-collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Community {
    /// Document ID (server-generated UUID)
    pub id: String,
    pub name: String,
    pub description: String,
    /// Contact links
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub chat_link: Option<String>,
    /// Private communities require admin approval to join
    #[serde(default)]
    pub is_private: bool,
    /// Uid of the creating user (becomes the first admin)
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A user's role within a community.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// Join request awaiting admin approval (private communities only)
    Pending,
    Member,
    Editor,
    Admin,
}

impl MemberRole {
    /// Role assigned when a user joins: private communities gate entry
    /// behind approval, public ones admit directly.
    pub fn initial(is_private: bool) -> Self {
        if is_private {
            MemberRole::Pending
        } else {
            MemberRole::Member
        }
    }

    /// Pending members are not yet part of the community.
    pub fn is_active(&self) -> bool {
        !matches!(self, MemberRole::Pending)
    }

    /// Only admins can approve requests, change roles or remove members.
    pub fn can_moderate(&self) -> bool {
        matches!(self, MemberRole::Admin)
    }

    /// Roles an admin may assign directly. `pending` is never a target:
    /// it only exists as the entry state of a private join request.
    pub fn is_assignable(&self) -> bool {
        self.is_active()
    }
}

/// Membership row stored at `communities/{communityId}/members/{userId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub community_id: String,
    pub user_id: String,
    pub role: MemberRole,
    pub joined_at: String,
}

/// Errors from pure role-transition checks. Mapped to HTTP conflicts by
/// the membership service.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("only pending requests can be approved (current role: {0:?})")]
    NotPending(MemberRole),
    #[error("cannot assign the pending role directly")]
    AssignPending,
    #[error("a community must keep at least one admin")]
    LastAdmin,
}

/// Approving a join request: `pending -> member`, nothing else.
pub fn approve_transition(current: MemberRole) -> Result<MemberRole, TransitionError> {
    match current {
        MemberRole::Pending => Ok(MemberRole::Member),
        other => Err(TransitionError::NotPending(other)),
    }
}

/// Check a direct role overwrite. `admin_count` is the number of admins
/// currently in the community, used to protect the last admin from
/// demotion.
pub fn check_role_update(
    current: MemberRole,
    new_role: MemberRole,
    admin_count: usize,
) -> Result<(), TransitionError> {
    if !new_role.is_assignable() {
        return Err(TransitionError::AssignPending);
    }
    if current == MemberRole::Admin && new_role != MemberRole::Admin && admin_count <= 1 {
        return Err(TransitionError::LastAdmin);
    }
    Ok(())
}

/// Check a removal (leave, reject, or admin-initiated remove). The last
/// admin may not be removed.
pub fn check_removal(current: MemberRole, admin_count: usize) -> Result<(), TransitionError> {
    if current == MemberRole::Admin && admin_count <= 1 {
        return Err(TransitionError::LastAdmin);
    }
    Ok(())
}
