// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod audit;
pub mod identity;
pub mod inventory;
pub mod reports;
pub mod session;
pub mod suppliers;

pub use audit::AuditRecorder;
pub use identity::{IdentityClient, ProviderIdentity};
pub use inventory::{InventoryService, StockDelta};
pub use session::SessionService;
pub use suppliers::SupplierService;

use crate::error::AppError;
use crate::models::User;

/// Catalog and supplier mutations are admin-only.
pub(crate) fn ensure_admin(actor: &User) -> Result<(), AppError> {
    if actor.role.can_manage_catalog() {
        Ok(())
    } else {
        tracing::debug!(uid = %actor.uid, role = ?actor.role, "Catalog mutation refused");
        Err(AppError::Forbidden)
    }
}

/// Stock movements require a staff role (admin or operario).
pub(crate) fn ensure_staff(actor: &User) -> Result<(), AppError> {
    if actor.role.can_move_stock() {
        Ok(())
    } else {
        tracing::debug!(uid = %actor.uid, role = ?actor.role, "Stock movement refused");
        Err(AppError::Forbidden)
    }
}

/// Serialize an entity into its document field map, stripping the listed
/// server-generated fields. Used for audit payloads.
pub(crate) fn entity_fields<T: serde::Serialize>(
    entity: &T,
    strip: &[&str],
) -> serde_json::Map<String, serde_json::Value> {
    let mut fields = match serde_json::to_value(entity) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };
    for key in strip {
        fields.remove(*key);
    }
    fields
}
