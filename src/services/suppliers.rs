// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Supplier repository: CRUD with audit, no stock semantics.
//!
//! Supplier names double as the join key on products and in reports;
//! renaming a supplier deliberately does not cascade to existing products,
//! and history keeps the name as it was written at the time.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{
    EntityType, HistoryAction, HistoryChanges, NewSupplier, Supplier, SupplierUpdate, User,
};
use crate::services::audit::AuditRecorder;
use crate::services::{ensure_admin, entity_fields};
use chrono::Utc;
use validator::Validate;

/// Supplier repository.
#[derive(Clone)]
pub struct SupplierService {
    db: FirestoreDb,
    audit: AuditRecorder,
}

impl SupplierService {
    pub fn new(db: FirestoreDb, audit: AuditRecorder) -> Self {
        Self { db, audit }
    }

    pub async fn list(&self) -> Result<Vec<Supplier>, AppError> {
        self.db.list_suppliers().await
    }

    pub async fn get(&self, id: &str) -> Result<Supplier, AppError> {
        self.db
            .get_supplier(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Proveedor {} no existe", id)))
    }

    /// Register a new supplier. Admin only.
    pub async fn create(&self, actor: &User, data: NewSupplier) -> Result<Supplier, AppError> {
        ensure_admin(actor)?;
        data.validate()?;

        let id = uuid::Uuid::new_v4().to_string();
        let supplier = data.into_supplier(id, Utc::now());
        self.db.create_supplier(&supplier).await?;

        tracing::info!(supplier = %supplier.id, name = %supplier.name, "Supplier created");

        let initial = entity_fields(&supplier, &["id", "createdAt"]);
        self.audit
            .record(
                HistoryAction::Create,
                EntityType::Supplier,
                &supplier.id,
                actor,
                Some(&supplier.name),
                Some(HistoryChanges::Fields(initial)),
            )
            .await;

        Ok(supplier)
    }

    /// Merge a partial edit into a supplier. Admin only.
    pub async fn update(
        &self,
        actor: &User,
        id: &str,
        update: SupplierUpdate,
    ) -> Result<Supplier, AppError> {
        ensure_admin(actor)?;
        update.validate()?;
        if update.is_empty() {
            return Err(AppError::BadRequest("Nada que actualizar".to_string()));
        }

        let (_, after) = self.db.apply_supplier_update(id, &update).await?;

        tracing::info!(supplier = %after.id, name = %after.name, "Supplier updated");

        self.audit
            .record(
                HistoryAction::Update,
                EntityType::Supplier,
                id,
                actor,
                Some(&after.name),
                Some(HistoryChanges::Fields(update.changed_fields())),
            )
            .await;

        Ok(after)
    }

    /// Hard delete. Admin only. The audit record keeps the snapshot.
    pub async fn delete(&self, actor: &User, id: &str) -> Result<(), AppError> {
        ensure_admin(actor)?;

        let snapshot = self.db.delete_supplier(id).await?;

        tracing::info!(supplier = %id, name = %snapshot.name, "Supplier deleted");

        let name = snapshot.name.clone();
        self.audit
            .record(
                HistoryAction::Delete,
                EntityType::Supplier,
                id,
                actor,
                Some(&name),
                Some(HistoryChanges::Deleted {
                    snapshot: entity_fields(&snapshot, &[]),
                }),
            )
            .await;

        Ok(())
    }
}
