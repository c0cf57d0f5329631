//! Company model (partner/employer listings).

use serde::{Deserialize, Serialize};

/// Company stored in Firestore, managed by platform admins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    /// Document ID (server-generated UUID)
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
