// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity-provider REST client (Firebase Auth).
//!
//! Only the password sign-in endpoint is consumed; profile data and roles
//! live in our own store and are resolved by the session service.

use crate::error::AppError;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Provider identity returned by a successful sign-in.
#[derive(Debug, Clone)]
pub struct ProviderIdentity {
    /// Provider subject identifier; doubles as the profile document id.
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// Identity provider client.
#[derive(Clone)]
pub struct IdentityClient {
    http: Option<reqwest::Client>,
    base_url: String,
    api_key: String,
}

impl IdentityClient {
    /// Create a new client with the project's web API key.
    pub fn new(api_key: String) -> Self {
        Self {
            http: Some(reqwest::Client::new()),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
        }
    }

    /// Create a client against a custom endpoint (auth emulator, tests).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            http: Some(reqwest::Client::new()),
            base_url,
            api_key,
        }
    }

    /// Create a mock client for testing (offline mode).
    ///
    /// Sign-in attempts will return an error if called.
    pub fn new_mock() -> Self {
        Self {
            http: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: "offline".to_string(),
        }
    }

    fn get_http(&self) -> Result<&reqwest::Client, AppError> {
        self.http.as_ref().ok_or_else(|| {
            AppError::IdentityProvider("Identity provider not connected (offline mode)".to_string())
        })
    }

    /// Verify email/password against the provider.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderIdentity, AppError> {
        let url = format!(
            "{}/accounts:signInWithPassword?key={}",
            self.base_url, self.api_key
        );

        let body = serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });

        let response = self
            .get_http()?
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::IdentityProvider(format!("Sign-in request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body: SignInError = response.json().await.unwrap_or_default();
            let message = error_body.error.message;

            // Credential problems are the caller's fault; anything else is
            // a provider outage.
            return match message.as_str() {
                "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS"
                | "USER_DISABLED" => Err(AppError::InvalidCredentials),
                _ => Err(AppError::IdentityProvider(format!(
                    "Sign-in failed ({}): {}",
                    status, message
                ))),
            };
        }

        let signed_in: SignInResponse = response
            .json()
            .await
            .map_err(|e| AppError::IdentityProvider(format!("Malformed sign-in response: {}", e)))?;

        Ok(ProviderIdentity {
            uid: signed_in.local_id,
            email: signed_in.email,
            display_name: signed_in.display_name,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Deserialize, Default)]
struct SignInError {
    #[serde(default)]
    error: SignInErrorBody,
}

#[derive(Deserialize, Default)]
struct SignInErrorBody {
    #[serde(default)]
    message: String,
}
