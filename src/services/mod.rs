// SPDX-License-Identifier: MIT

//! Services module - business logic and external providers.

pub mod directory;
pub mod identity;
pub mod membership;
pub mod participation;
pub mod storage;

pub use identity::{IdentityService, IdentityUser};
pub use membership::MembershipService;
pub use participation::{ParticipationCounts, ParticipationService};
pub use storage::StorageService;
