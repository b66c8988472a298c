// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User identity, stored profile documents, and the role mapping.

use serde::{Deserialize, Serialize};

/// Permission tier governing which mutations a session may invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access: catalog and supplier management plus stock movements.
    Admin,
    /// Read access plus stock movements.
    Operario,
    /// Permission-less fallback identity from the token-link guest policy.
    Invitado,
}

impl Role {
    /// Map a stored role string onto the internal role.
    ///
    /// Pure function of the stored value and the configured alias set:
    /// any alias match means admin, everything else (including absent)
    /// is operario.
    pub fn from_stored(stored: Option<&str>, admin_aliases: &[String]) -> Role {
        match stored {
            Some(value) if admin_aliases.iter().any(|alias| alias == value) => Role::Admin,
            _ => Role::Operario,
        }
    }

    /// Whether this role may create, edit, or delete products and suppliers.
    pub fn can_manage_catalog(self) -> bool {
        self == Role::Admin
    }

    /// Whether this role may register stock movements.
    pub fn can_move_stock(self) -> bool {
        matches!(self, Role::Admin | Role::Operario)
    }
}

/// The acting user, resolved once per session and passed explicitly into
/// every repository operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

/// Profile document stored in the users collection.
///
/// Field names are Spanish in current documents; the English aliases cover
/// profiles written before the rename.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserProfile {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub correo: Option<String>,
    #[serde(default)]
    pub rol: Option<String>,
    #[serde(default, rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub ultimo_acceso: Option<chrono::DateTime<chrono::Utc>>,
}

impl UserProfile {
    /// The stored role string, preferring the current field name.
    pub fn stored_role(&self) -> Option<&str> {
        self.rol.as_deref().or(self.role.as_deref())
    }

    /// Display name with fallback to the provider-supplied value.
    pub fn resolved_name(&self, provider_name: &str) -> String {
        self.nombre
            .clone()
            .or_else(|| self.display_name.clone())
            .unwrap_or_else(|| provider_name.to_string())
    }

    /// Email with fallback to the provider-supplied value.
    pub fn resolved_email(&self, provider_email: &str) -> String {
        self.correo
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| provider_email.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aliases(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_role_mapping_admin_aliases() {
        let admin_aliases = aliases(&["administrador", "admin"]);

        assert_eq!(
            Role::from_stored(Some("administrador"), &admin_aliases),
            Role::Admin
        );
        assert_eq!(Role::from_stored(Some("admin"), &admin_aliases), Role::Admin);
    }

    #[test]
    fn test_role_mapping_defaults_to_operario() {
        let admin_aliases = aliases(&["administrador", "admin"]);

        assert_eq!(
            Role::from_stored(Some("operario"), &admin_aliases),
            Role::Operario
        );
        assert_eq!(
            Role::from_stored(Some("recepcionista"), &admin_aliases),
            Role::Operario
        );
        assert_eq!(Role::from_stored(None, &admin_aliases), Role::Operario);
        assert_eq!(Role::from_stored(Some(""), &admin_aliases), Role::Operario);
    }

    #[test]
    fn test_role_mapping_is_alias_configurable() {
        // Some deployments treat receptionists as admins; that is an alias
        // list decision, not a code change.
        let admin_aliases = aliases(&["administrador", "admin", "recepcionista"]);

        assert_eq!(
            Role::from_stored(Some("recepcionista"), &admin_aliases),
            Role::Admin
        );
    }

    #[test]
    fn test_role_permissions() {
        assert!(Role::Admin.can_manage_catalog());
        assert!(Role::Admin.can_move_stock());

        assert!(!Role::Operario.can_manage_catalog());
        assert!(Role::Operario.can_move_stock());

        assert!(!Role::Invitado.can_manage_catalog());
        assert!(!Role::Invitado.can_move_stock());
    }

    #[test]
    fn test_profile_field_fallbacks() {
        let legacy = UserProfile {
            display_name: Some("Marta".to_string()),
            email: Some("marta@example.com".to_string()),
            role: Some("admin".to_string()),
            ..Default::default()
        };

        assert_eq!(legacy.resolved_name("Proveedor"), "Marta");
        assert_eq!(legacy.resolved_email("p@example.com"), "marta@example.com");
        assert_eq!(legacy.stored_role(), Some("admin"));

        let current = UserProfile {
            nombre: Some("Marta".to_string()),
            rol: Some("operario".to_string()),
            // A stale legacy value must lose to the current field.
            role: Some("admin".to_string()),
            ..Default::default()
        };
        assert_eq!(current.stored_role(), Some("operario"));

        let empty = UserProfile::default();
        assert_eq!(empty.resolved_name("Fallback"), "Fallback");
        assert_eq!(empty.resolved_email("f@example.com"), "f@example.com");
    }
}
