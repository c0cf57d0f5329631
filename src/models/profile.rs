//! Developer profile model for storage and API.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Developer profile stored in Firestore.
///
/// Keyed by the identity provider's uid. Created at registration and
/// mutated only by the owning user. Never hard-deleted: account removal
/// in the observed flows just signs the user out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Identity provider uid (also used as document ID)
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    /// Email (may be hidden from the public directory)
    pub email: Option<String>,
    /// Contact / social links
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    /// Areas of expertise tags, e.g. "frontend", "backend"
    #[serde(default)]
    pub areas: Vec<String>,
    /// Free-form experience descriptor
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub education_level: Option<String>,
    /// Consent flags captured at registration
    #[serde(default)]
    pub accepted_cookies: bool,
    #[serde(default)]
    pub accepted_privacy_policy: bool,
    /// Public photo URL in blob storage
    pub photo_url: Option<String>,
    /// When the profile was created (RFC 3339)
    pub created_at: String,
    /// Last modification timestamp (RFC 3339)
    pub updated_at: String,
}

impl Profile {
    /// Full display name, as shown in the directory.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Apply an owner-submitted update. Only fields present in the
    /// request are overwritten.
    pub fn apply(&mut self, update: ProfileUpdate, now: &str) {
        if let Some(v) = update.first_name {
            self.first_name = v;
        }
        if let Some(v) = update.last_name {
            self.last_name = v;
        }
        if let Some(v) = update.github {
            self.github = Some(v);
        }
        if let Some(v) = update.linkedin {
            self.linkedin = Some(v);
        }
        if let Some(v) = update.website {
            self.website = Some(v);
        }
        if let Some(v) = update.areas {
            self.areas = v;
        }
        if let Some(v) = update.experience {
            self.experience = Some(v);
        }
        if let Some(v) = update.education_level {
            self.education_level = Some(v);
        }
        if let Some(v) = update.accepted_cookies {
            self.accepted_cookies = v;
        }
        if let Some(v) = update.accepted_privacy_policy {
            self.accepted_privacy_policy = v;
        }
        self.updated_at = now.to_string();
    }
}

/// Owner-submitted profile mutation, validated before it reaches the
/// data-access layer.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(url)]
    pub github: Option<String>,
    #[validate(url)]
    pub linkedin: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(length(max = 20))]
    pub areas: Option<Vec<String>>,
    #[validate(length(max = 2000))]
    pub experience: Option<String>,
    #[validate(length(max = 100))]
    pub education_level: Option<String>,
    pub accepted_cookies: Option<bool>,
    pub accepted_privacy_policy: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_profile() -> Profile {
        Profile {
            user_id: "uid-1".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: Some("ada@example.com".to_string()),
            github: None,
            linkedin: None,
            website: None,
            areas: vec!["backend".to_string()],
            experience: None,
            education_level: None,
            accepted_cookies: false,
            accepted_privacy_policy: true,
            photo_url: None,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_apply_overwrites_only_present_fields() {
        let mut profile = base_profile();
        let update = ProfileUpdate {
            first_name: Some("Grace".to_string()),
            areas: Some(vec!["frontend".to_string(), "backend".to_string()]),
            ..Default::default()
        };

        profile.apply(update, "2024-02-01T00:00:00Z");

        assert_eq!(profile.first_name, "Grace");
        assert_eq!(profile.last_name, "Lovelace"); // untouched
        assert_eq!(profile.areas, vec!["frontend", "backend"]);
        assert_eq!(profile.updated_at, "2024-02-01T00:00:00Z");
        assert_eq!(profile.created_at, "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_update_validation_rejects_bad_url() {
        use validator::Validate;

        let update = ProfileUpdate {
            github: Some("not a url".to_string()),
            ..Default::default()
        };

        assert!(update.validate().is_err());
    }
}
