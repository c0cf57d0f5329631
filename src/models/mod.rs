// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod community;
pub mod company;
pub mod contributor;
pub mod event;
pub mod profile;
pub mod project;

pub use community::{Community, MemberRole, Membership};
pub use company::Company;
pub use contributor::{Contributor, ContributorRole};
pub use event::{Event, Participation};
pub use profile::Profile;
pub use project::{Project, ProjectCategory};
