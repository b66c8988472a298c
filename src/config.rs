// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup and held in memory; nothing here
//! re-reads the environment at request time.

use std::env;

/// What to do when a link token fails to resolve to a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuestPolicy {
    /// Refuse the session outright.
    Reject,
    /// Establish a permission-less guest identity.
    Guest,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment (non-sensitive) ---
    /// GCP project ID for Firestore.
    pub gcp_project_id: String,
    /// Frontend URL, for CORS.
    pub frontend_url: String,
    /// Server port.
    pub port: u16,
    /// Suffix appended to per-instance collection names (`productos_4`…),
    /// isolating tenants that share one physical store.
    pub collection_suffix: String,
    /// Stored role strings that map to the admin role.
    pub admin_roles: Vec<String>,
    /// Fallback behavior for unresolvable link tokens.
    pub guest_policy: GuestPolicy,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes).
    pub jwt_signing_key: Vec<u8>,
    /// HMAC key the intranet uses to sign cross-system link tokens.
    pub link_token_key: Vec<u8>,
    /// Identity-provider (Firebase Auth) web API key.
    pub identity_api_key: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let admin_roles = env::var("ADMIN_ROLES")
            .unwrap_or_else(|_| "administrador,admin".to_string())
            .split(',')
            .map(|role| role.trim().to_string())
            .filter(|role| !role.is_empty())
            .collect();

        let guest_policy = match env::var("GUEST_POLICY").as_deref() {
            Ok("guest") => GuestPolicy::Guest,
            Ok("reject") | Err(_) => GuestPolicy::Reject,
            Ok(_) => return Err(ConfigError::Invalid("GUEST_POLICY")),
        };

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            collection_suffix: env::var("COLLECTION_SUFFIX").unwrap_or_else(|_| "_4".to_string()),
            admin_roles,
            guest_policy,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            link_token_key: env::var("LINK_TOKEN_KEY")
                .map_err(|_| ConfigError::Missing("LINK_TOKEN_KEY"))?
                .into_bytes(),
            identity_api_key: env::var("IDENTITY_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("IDENTITY_API_KEY"))?,
        })
    }

    /// Fixed configuration for tests.
    pub fn test_default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            collection_suffix: "_test".to_string(),
            admin_roles: vec!["administrador".to_string(), "admin".to_string()],
            guest_policy: GuestPolicy::Reject,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            link_token_key: b"test_link_key".to_vec(),
            identity_api_key: "test_api_key".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("LINK_TOKEN_KEY", "test_link_key");
        env::set_var("IDENTITY_API_KEY", "test_api_key");
        env::remove_var("ADMIN_ROLES");
        env::remove_var("GUEST_POLICY");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.port, 8080);
        assert_eq!(config.collection_suffix, "_4");
        assert_eq!(config.admin_roles, vec!["administrador", "admin"]);
        assert_eq!(config.guest_policy, GuestPolicy::Reject);
    }

    #[test]
    fn test_admin_roles_parsing() {
        env::set_var("JWT_SIGNING_KEY", "k");
        env::set_var("LINK_TOKEN_KEY", "k");
        env::set_var("IDENTITY_API_KEY", "k");
        env::set_var("ADMIN_ROLES", "administrador, admin ,recepcionista");

        let config = Config::from_env().expect("Config should load");
        assert_eq!(
            config.admin_roles,
            vec!["administrador", "admin", "recepcionista"]
        );

        env::remove_var("ADMIN_ROLES");
    }
}
