// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Supplier model and mutation payloads. Plain CRUD, no stock semantics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Supplier document stored in Firestore.
///
/// The name doubles as the join key used by `Product.supplier` and by
/// reporting; history records keep the name as written at mutation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

/// Payload for registering a new supplier.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSupplier {
    #[validate(length(min = 1, message = "El nombre es obligatorio"))]
    pub name: String,
    #[validate(email(message = "Correo inválido"))]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

impl NewSupplier {
    pub fn into_supplier(self, id: String, now: DateTime<Utc>) -> Supplier {
        Supplier {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            created_at: now,
        }
    }
}

/// Partial update payload; only present fields are merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SupplierUpdate {
    #[serde(default)]
    #[validate(length(min = 1, message = "El nombre es obligatorio"))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(email(message = "Correo inválido"))]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl SupplierUpdate {
    pub fn apply(&self, supplier: &mut Supplier) {
        if let Some(name) = &self.name {
            supplier.name = name.clone();
        }
        if let Some(email) = &self.email {
            supplier.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            supplier.phone = phone.clone();
        }
        if let Some(address) = &self.address {
            supplier.address = address.clone();
        }
    }

    /// The provided fields as a map, for the audit record.
    pub fn changed_fields(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut fields = serde_json::Map::new();
        if let Some(name) = &self.name {
            fields.insert("name".to_string(), name.clone().into());
        }
        if let Some(email) = &self.email {
            fields.insert("email".to_string(), email.clone().into());
        }
        if let Some(phone) = &self.phone {
            fields.insert("phone".to_string(), phone.clone().into());
        }
        if let Some(address) = &self.address {
            fields.insert("address".to_string(), address.clone().into());
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }
}
