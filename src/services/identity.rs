// SPDX-License-Identifier: MIT

//! Identity provider client (Firebase Auth REST surface).
//!
//! The application treats the provider as an opaque identity source:
//! sign-up and sign-in return a uid; sessions are then minted locally
//! as JWTs. Provider error codes are translated to user-facing messages
//! here and nowhere else.

use crate::error::AppError;
use serde::Deserialize;

/// Identity provider client.
#[derive(Clone)]
pub struct IdentityService {
    http: reqwest::Client,
    base_url: String,
    /// None puts the service in offline mock mode (tests).
    api_key: Option<String>,
}

/// Identity returned by the provider after sign-up or sign-in.
#[derive(Debug, Clone)]
pub struct IdentityUser {
    pub uid: String,
    pub email: String,
}

#[derive(Deserialize)]
struct ProviderIdentity {
    #[serde(rename = "localId")]
    local_id: String,
    email: String,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: ProviderError,
}

#[derive(Deserialize)]
struct ProviderError {
    message: String,
}

impl IdentityService {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://identitytoolkit.googleapis.com/v1".to_string(),
            api_key: Some(api_key),
        }
    }

    /// Create a mock identity service for testing (offline mode).
    pub fn new_mock() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "http://localhost:0".to_string(),
            api_key: None,
        }
    }

    /// Register a new identity with the provider.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<IdentityUser, AppError> {
        self.credential_request("accounts:signUp", email, password)
            .await
    }

    /// Sign in an existing identity.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<IdentityUser, AppError> {
        self.credential_request("accounts:signInWithPassword", email, password)
            .await
    }

    async fn credential_request(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<IdentityUser, AppError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            AppError::Identity("Identity provider not configured (offline mode)".to_string())
        })?;

        let url = format!("{}/{}?key={}", self.base_url, endpoint, api_key);
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Identity(format!("Identity request failed: {}", e)))?;

        if !response.status().is_success() {
            let code = response
                .json::<ProviderErrorBody>()
                .await
                .map(|b| b.error.message)
                .unwrap_or_else(|_| "UNKNOWN".to_string());
            tracing::warn!(code = %code, "Identity provider rejected credentials");
            return Err(map_provider_error(&code));
        }

        let identity: ProviderIdentity = response
            .json()
            .await
            .map_err(|e| AppError::Identity(format!("Invalid identity response: {}", e)))?;

        Ok(IdentityUser {
            uid: identity.local_id,
            email: identity.email,
        })
    }
}

/// Map provider error codes to the messages shown at the
/// registration/login boundary.
fn map_provider_error(code: &str) -> AppError {
    // Codes may carry a suffix, e.g. "WEAK_PASSWORD : Password should be..."
    let code = code.split_whitespace().next().unwrap_or(code);
    let message = match code {
        "EMAIL_EXISTS" => "An account with this email already exists",
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            "Invalid email or password"
        }
        "INVALID_EMAIL" => "The email address is badly formatted",
        "WEAK_PASSWORD" => "Password must be at least 6 characters",
        "USER_DISABLED" => "This account has been disabled",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts, try again later",
        _ => "Authentication failed",
    };
    AppError::Identity(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_known_provider_codes() {
        for (code, expected) in [
            ("EMAIL_EXISTS", "An account with this email already exists"),
            ("INVALID_LOGIN_CREDENTIALS", "Invalid email or password"),
            ("INVALID_EMAIL", "The email address is badly formatted"),
        ] {
            match map_provider_error(code) {
                AppError::Identity(msg) => assert_eq!(msg, expected),
                other => panic!("unexpected error variant: {:?}", other),
            }
        }
    }

    #[test]
    fn test_maps_code_with_detail_suffix() {
        match map_provider_error("WEAK_PASSWORD : Password should be at least 6 characters") {
            AppError::Identity(msg) => {
                assert_eq!(msg, "Password must be at least 6 characters")
            }
            other => panic!("unexpected error variant: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_code_gets_generic_message() {
        match map_provider_error("SOMETHING_NEW") {
            AppError::Identity(msg) => assert_eq!(msg, "Authentication failed"),
            other => panic!("unexpected error variant: {:?}", other),
        }
    }
}
