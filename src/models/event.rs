//! Event and participation models.

use serde::{Deserialize, Serialize};

/// Event stored in Firestore. Owns two sub-collections of
/// [`Participation`] rows: `interested` and `attendees`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Document ID (server-generated UUID)
    pub id: String,
    pub title: String,
    pub description: String,
    /// Start timestamp (RFC 3339)
    pub starts_at: String,
    /// Optional end timestamp (RFC 3339)
    #[serde(default)]
    pub ends_at: Option<String>,
    /// Physical location or meeting link
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub meeting_link: Option<String>,
    /// Organizing community
    pub community_id: String,
    /// Uid of the creating user
    pub created_by: String,
    /// Attraction-type tag, e.g. "talk", "hackathon"
    #[serde(default)]
    pub attraction_type: Option<String>,
    /// Informational capacity. Stored but never enforced.
    #[serde(default)]
    pub capacity: Option<u32>,
    pub created_at: String,
    pub updated_at: String,
}

/// One row in an event's `interested` or `attendees` sub-collection.
///
/// The document ID is the uid, which makes add/remove idempotent by
/// construction: re-marking upserts the same document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participation {
    pub user_id: String,
    pub joined_at: String,
}
