//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const PROFILES: &str = "profiles";
    pub const COMMUNITIES: &str = "communities";
    /// Sub-collection of `communities/{id}`
    pub const MEMBERS: &str = "members";
    pub const EVENTS: &str = "events";
    /// Sub-collections of `events/{id}`
    pub const INTERESTED: &str = "interested";
    pub const ATTENDEES: &str = "attendees";
    pub const PROJECTS: &str = "projects";
    /// Contributor records, keyed by uid (also the admin allowlist)
    pub const CONTRIBUTORS: &str = "contributors";
    pub const COMPANIES: &str = "companies";
}
