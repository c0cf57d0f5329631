//! Contributor records.
//!
//! A contributor is a role-tagged overlay on a profile, shown as the
//! platform credit list. The existence of a contributor record for a uid
//! also grants platform-admin capability; `middleware::auth` checks it
//! server-side on every admin request.

use serde::{Deserialize, Serialize};

/// Credit role of a contributor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContributorRole {
    Founder,
    Developer,
    Designer,
    Community,
    QualityAssurance,
}

/// Contributor record, keyed by uid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contributor {
    pub user_id: String,
    /// Display name shown on the credits page
    pub name: String,
    pub role: ContributorRole,
    #[serde(default)]
    pub photo_url: Option<String>,
    pub created_at: String,
}
