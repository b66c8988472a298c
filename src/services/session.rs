// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session resolution: who is acting, and with which role.
//!
//! Two entry points produce a session: interactive email/password sign-in
//! through the identity provider, and the intranet token-link flow that
//! adopts an externally supplied, HMAC-signed profile id. Both end in the
//! same place: the stored profile is read, the role string is mapped, and
//! the resolved user is cached until explicit sign-out.

use crate::config::{Config, GuestPolicy};
use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{Role, User};
use crate::services::identity::IdentityClient;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use dashmap::DashMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

/// Placeholder identity fields for token-linked sessions; the stored
/// profile overrides them whenever it carries its own values.
const LINKED_EMAIL: &str = "usuario@intranet.cl";
const LINKED_NAME: &str = "Usuario Vinculado";

/// Uid and display name of the permission-less guest identity.
const GUEST_UID: &str = "invitado";

/// Session and identity resolution.
#[derive(Clone)]
pub struct SessionService {
    db: FirestoreDb,
    identity: IdentityClient,
    admin_roles: Vec<String>,
    guest_policy: GuestPolicy,
    link_token_key: Vec<u8>,
    /// Resolved profiles keyed by uid; the local session store. Cleared
    /// per-uid on sign-out, never on failed lookups.
    cache: Arc<DashMap<String, User>>,
}

impl SessionService {
    pub fn new(db: FirestoreDb, identity: IdentityClient, config: &Config) -> Self {
        Self {
            db,
            identity,
            admin_roles: config.admin_roles.clone(),
            guest_policy: config.guest_policy,
            link_token_key: config.link_token_key.clone(),
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Interactive sign-in: verify credentials with the provider, then
    /// resolve the stored profile. A provider identity without a profile
    /// document is not a staff account and is refused.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AppError> {
        let identity = self.identity.sign_in_with_password(email, password).await?;

        let display_name = identity.display_name.clone().unwrap_or_default();
        match self
            .resolve(&identity.uid, &identity.email, &display_name)
            .await?
        {
            Some(user) => Ok(user),
            None => {
                tracing::warn!(uid = %identity.uid, "Authenticated identity has no profile");
                Err(AppError::Unauthorized)
            }
        }
    }

    /// Token-link flow: adopt the identity named by a signed link token,
    /// bypassing provider authentication. Verification or resolution
    /// failure falls back to the configured guest policy.
    pub async fn login_with_token(&self, token: &str) -> Result<User, AppError> {
        let Some(uid) = self.verify_link_token(token) else {
            tracing::warn!("Link token rejected (bad signature or format)");
            return self.guest_fallback();
        };

        // An already-resolved session is reused as-is; a repeat link for
        // the same uid must not re-run (and possibly fail) the lookup.
        if let Some(user) = self.cache.get(&uid) {
            return Ok(user.clone());
        }

        match self.resolve(&uid, LINKED_EMAIL, LINKED_NAME).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => {
                tracing::warn!(uid = %uid, "Link token names an unknown profile");
                self.guest_fallback()
            }
            Err(error) => {
                tracing::error!(uid = %uid, %error, "Profile lookup failed during token link");
                self.guest_fallback()
            }
        }
    }

    /// Resolve a profile into a session user.
    ///
    /// Returns `Ok(None)` when no profile document exists. On success the
    /// profile's last-access timestamp is touched in the background;
    /// failure there never blocks the login.
    async fn resolve(
        &self,
        uid: &str,
        fallback_email: &str,
        fallback_name: &str,
    ) -> Result<Option<User>, AppError> {
        let profile = match self.db.get_profile(uid).await {
            Ok(profile) => profile,
            Err(error) => {
                tracing::error!(uid = %uid, %error, "Profile lookup failed");
                return Err(error);
            }
        };

        let Some(profile) = profile else {
            return Ok(None);
        };

        let db = self.db.clone();
        let touch_uid = uid.to_string();
        tokio::spawn(async move {
            if let Err(error) = db.touch_last_access(&touch_uid, chrono::Utc::now()).await {
                tracing::warn!(uid = %touch_uid, %error, "Failed to touch last access");
            }
        });

        let role = Role::from_stored(profile.stored_role(), &self.admin_roles);
        let user = User {
            uid: uid.to_string(),
            email: profile.resolved_email(fallback_email),
            display_name: profile.resolved_name(fallback_name),
            role,
        };

        tracing::info!(uid = %uid, role = ?role, "Session resolved");
        self.cache.insert(uid.to_string(), user.clone());
        Ok(Some(user))
    }

    /// Explicit sign-out: forget the cached session for this uid.
    pub fn sign_out(&self, uid: &str) {
        self.cache.remove(uid);
    }

    fn guest_fallback(&self) -> Result<User, AppError> {
        match self.guest_policy {
            GuestPolicy::Guest => Ok(Self::guest_user()),
            GuestPolicy::Reject => Err(AppError::Unauthorized),
        }
    }

    /// The permission-less guest identity.
    pub fn guest_user() -> User {
        User {
            uid: GUEST_UID.to_string(),
            email: String::new(),
            display_name: "Invitado".to_string(),
            role: Role::Invitado,
        }
    }

    // ─── Link Tokens ─────────────────────────────────────────────

    /// Sign a link token for a profile id: `base64url(uid|ts_hex|sig_hex)`.
    ///
    /// The intranet side holds the same key; this signer exists for its
    /// tooling and for tests.
    pub fn sign_link_token(&self, uid: &str) -> Result<String, AppError> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
            .as_millis();

        let payload = format!("{}|{:x}", uid, timestamp);

        let mut mac = HmacSha256::new_from_slice(&self.link_token_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
        mac.update(payload.as_bytes());
        let signature = mac.finalize().into_bytes();

        let signed = format!("{}|{}", payload, hex::encode(signature));
        Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
    }

    /// Verify a link token's signature and extract the profile id.
    pub fn verify_link_token(&self, token: &str) -> Option<String> {
        let bytes = URL_SAFE_NO_PAD.decode(token).ok()?;
        let token_str = String::from_utf8(bytes).ok()?;

        // Format is "uid|timestamp_hex|signature_hex"
        let parts: Vec<&str> = token_str.splitn(3, '|').collect();
        if parts.len() != 3 {
            return None;
        }

        let uid = parts[0];
        let timestamp_hex = parts[1];
        let signature_hex = parts[2];

        let payload = format!("{}|{}", uid, timestamp_hex);

        let mut mac = HmacSha256::new_from_slice(&self.link_token_key).ok()?;
        mac.update(payload.as_bytes());
        let expected_signature = hex::encode(mac.finalize().into_bytes());

        if signature_hex != expected_signature {
            tracing::error!("Link token signature mismatch");
            return None;
        }

        Some(uid.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> SessionService {
        SessionService::new(
            FirestoreDb::new_mock(),
            IdentityClient::new_mock(),
            &Config::test_default(),
        )
    }

    #[test]
    fn test_link_token_roundtrip() {
        let service = test_service();

        let token = service.sign_link_token("uid-123").unwrap();
        assert_eq!(service.verify_link_token(&token), Some("uid-123".to_string()));
    }

    #[test]
    fn test_link_token_tamper_rejected() {
        let service = test_service();

        let token = service.sign_link_token("uid-123").unwrap();
        let bytes = URL_SAFE_NO_PAD.decode(&token).unwrap();
        let tampered = String::from_utf8(bytes)
            .unwrap()
            .replace("uid-123", "uid-999");
        let tampered_token = URL_SAFE_NO_PAD.encode(tampered.as_bytes());

        assert_eq!(service.verify_link_token(&tampered_token), None);
    }

    #[test]
    fn test_link_token_wrong_key_rejected() {
        let service = test_service();
        let mut other_config = Config::test_default();
        other_config.link_token_key = b"another_key".to_vec();
        let other = SessionService::new(
            FirestoreDb::new_mock(),
            IdentityClient::new_mock(),
            &other_config,
        );

        let token = other.sign_link_token("uid-123").unwrap();
        assert_eq!(service.verify_link_token(&token), None);
    }

    #[test]
    fn test_link_token_malformed_rejected() {
        let service = test_service();

        assert_eq!(service.verify_link_token("not-base64!@#"), None);
        let missing_parts = URL_SAFE_NO_PAD.encode(b"uid-only");
        assert_eq!(service.verify_link_token(&missing_parts), None);
    }

    #[test]
    fn test_guest_user_is_permission_less() {
        let guest = SessionService::guest_user();
        assert_eq!(guest.role, Role::Invitado);
        assert!(!guest.role.can_move_stock());
        assert!(!guest.role.can_manage_catalog());
    }

    #[tokio::test]
    async fn test_bad_token_with_reject_policy() {
        let service = test_service();

        let result = service.login_with_token("garbage").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_bad_token_with_guest_policy() {
        let mut config = Config::test_default();
        config.guest_policy = GuestPolicy::Guest;
        let service = SessionService::new(
            FirestoreDb::new_mock(),
            IdentityClient::new_mock(),
            &config,
        );

        let user = service.login_with_token("garbage").await.unwrap();
        assert_eq!(user.role, Role::Invitado);
    }

    #[tokio::test]
    async fn test_cached_session_survives_offline_store() {
        // A valid token for an already-resolved uid must not re-run the
        // lookup: the cached admin session is reused even when the store
        // is unreachable.
        let service = test_service();
        let user = User {
            uid: "uid-123".to_string(),
            email: "marta@example.com".to_string(),
            display_name: "Marta".to_string(),
            role: Role::Admin,
        };
        service.cache.insert(user.uid.clone(), user);

        let token = service.sign_link_token("uid-123").unwrap();
        let resolved = service.login_with_token(&token).await.unwrap();
        assert_eq!(resolved.role, Role::Admin);
        assert_eq!(resolved.display_name, "Marta");
    }
}
