//! Project model.

use serde::{Deserialize, Serialize};

/// Category tag for a showcased project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectCategory {
    Portfolio,
    Commercial,
    Scientific,
}

/// Community-showcased project stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Document ID (server-generated UUID)
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: ProjectCategory,
    /// Uid of the author
    pub author_id: String,
    /// Denormalized author display name, as submitted
    pub author_name: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
