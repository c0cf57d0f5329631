// SPDX-License-Identifier: MIT

//! Blob storage client for profile photos.
//!
//! Bytes in, public URL out; delete-by-url for replacement. Nothing
//! else in the system touches blob storage.

use crate::error::AppError;

/// Blob storage client (Firebase Storage REST surface).
#[derive(Clone)]
pub struct StorageService {
    http: reqwest::Client,
    base_url: String,
    /// None disables uploads (offline mode / local dev without a bucket).
    bucket: Option<String>,
}

impl StorageService {
    pub fn new(bucket: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://firebasestorage.googleapis.com/v0".to_string(),
            bucket,
        }
    }

    /// Create a mock storage service for testing (offline mode).
    pub fn new_mock() -> Self {
        Self::new(None)
    }

    fn get_bucket(&self) -> Result<&str, AppError> {
        self.bucket
            .as_deref()
            .ok_or_else(|| AppError::Storage("Storage bucket not configured".to_string()))
    }

    /// Upload a profile photo and return its public URL.
    pub async fn upload_profile_photo(
        &self,
        user_id: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AppError> {
        let bucket = self.get_bucket()?;
        let object_name = format!("profile-photos/{}", user_id);
        let url = format!(
            "{}/b/{}/o?name={}",
            self.base_url,
            bucket,
            urlencoding::encode(&object_name)
        );

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Upload request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Storage(format!(
                "Upload rejected: HTTP {}",
                response.status()
            )));
        }

        tracing::info!(user_id, object = %object_name, "Profile photo uploaded");

        Ok(format!(
            "{}/b/{}/o/{}?alt=media",
            self.base_url,
            bucket,
            urlencoding::encode(&object_name)
        ))
    }

    /// Delete a previously uploaded photo by its public URL.
    ///
    /// URLs from other buckets (or arbitrary strings) are rejected so a
    /// crafted profile field cannot steer deletes elsewhere.
    pub async fn delete_by_url(&self, photo_url: &str) -> Result<(), AppError> {
        let bucket = self.get_bucket()?;
        let prefix = format!("{}/b/{}/o/", self.base_url, bucket);

        let encoded_object = photo_url
            .strip_prefix(&prefix)
            .and_then(|rest| rest.split('?').next())
            .ok_or_else(|| AppError::BadRequest("Unrecognized photo URL".to_string()))?;

        let url = format!("{}/b/{}/o/{}", self.base_url, bucket, encoded_object);

        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Delete request failed: {}", e)))?;

        // 404 means the blob is already gone, which is the desired state
        if !response.status().is_success() && response.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::Storage(format!(
                "Delete rejected: HTTP {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_mode_rejects_uploads() {
        let storage = StorageService::new_mock();
        let err = storage
            .upload_profile_photo("uid-1", vec![1, 2, 3], "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
    }

    #[tokio::test]
    async fn test_delete_rejects_foreign_url() {
        let storage = StorageService::new(Some("my-bucket".to_string()));
        let err = storage
            .delete_by_url("https://evil.example.com/b/other/o/thing")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
