// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Product repository: the only component that changes product state.
//!
//! Every operation takes the acting user explicitly, enforces the role
//! gate, mutates through the store, and then appends exactly one audit
//! record. Quantity never goes negative; the check runs against the
//! transactional snapshot, not client-cached state.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{
    EntityType, HistoryAction, HistoryChanges, NewProduct, Product, ProductUpdate, User,
};
use crate::services::audit::AuditRecorder;
use crate::services::{ensure_admin, ensure_staff, entity_fields};
use chrono::Utc;
use validator::Validate;

/// Result of a stock movement: the quantity before and after.
#[derive(Debug, Clone)]
pub struct StockDelta {
    pub previous_quantity: i64,
    pub product: Product,
}

/// Product repository and stock mutation logic.
#[derive(Clone)]
pub struct InventoryService {
    db: FirestoreDb,
    audit: AuditRecorder,
}

impl InventoryService {
    pub fn new(db: FirestoreDb, audit: AuditRecorder) -> Self {
        Self { db, audit }
    }

    pub async fn list(&self) -> Result<Vec<Product>, AppError> {
        self.db.list_products().await
    }

    pub async fn get(&self, id: &str) -> Result<Product, AppError> {
        self.db
            .get_product(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Producto {} no existe", id)))
    }

    /// Register a new product. Admin only.
    pub async fn create(&self, actor: &User, data: NewProduct) -> Result<Product, AppError> {
        ensure_admin(actor)?;
        data.validate()?;

        let now = Utc::now();
        let id = uuid::Uuid::new_v4().to_string();
        let product = data.into_product(id, now);
        self.db.create_product(&product).await?;

        tracing::info!(
            product = %product.id,
            name = %product.name,
            quantity = product.quantity,
            "Product created"
        );

        // Initial field set, minus the server-generated fields.
        let initial = entity_fields(&product, &["id", "createdAt", "updatedAt"]);
        self.audit
            .record(
                HistoryAction::Create,
                EntityType::Product,
                &product.id,
                actor,
                Some(&product.name),
                Some(HistoryChanges::Fields(initial)),
            )
            .await;

        Ok(product)
    }

    /// Merge a partial edit into a product. Admin only.
    ///
    /// With `is_restock` set and a quantity present, the audit entry is an
    /// `add_stock` carrying the delta against the pre-mutation snapshot;
    /// otherwise it is a plain `update` listing the changed fields.
    pub async fn update(
        &self,
        actor: &User,
        id: &str,
        update: ProductUpdate,
        is_restock: bool,
    ) -> Result<Product, AppError> {
        ensure_admin(actor)?;
        update.validate()?;
        if update.is_empty() {
            return Err(AppError::BadRequest("Nada que actualizar".to_string()));
        }

        let (before, after) = self.db.apply_product_update(id, &update, Utc::now()).await?;

        let (action, changes) = if is_restock && update.quantity.is_some() {
            (
                HistoryAction::AddStock,
                HistoryChanges::stock_added(before.quantity, after.quantity),
            )
        } else {
            (
                HistoryAction::Update,
                HistoryChanges::Fields(update.changed_fields()),
            )
        };

        tracing::info!(
            product = %after.id,
            action = ?action,
            previous_quantity = before.quantity,
            quantity = after.quantity,
            "Product updated"
        );

        self.audit
            .record(
                action,
                EntityType::Product,
                id,
                actor,
                Some(&after.name),
                Some(changes),
            )
            .await;

        Ok(after)
    }

    /// Restock: add a positive quantity. Any staff role.
    pub async fn add_to_inventory(
        &self,
        actor: &User,
        id: &str,
        quantity_to_add: i64,
    ) -> Result<StockDelta, AppError> {
        ensure_staff(actor)?;
        if quantity_to_add <= 0 {
            return Err(AppError::BadRequest(
                "La cantidad debe ser positiva".to_string(),
            ));
        }

        let (previous_quantity, product) = self
            .db
            .adjust_product_quantity(id, quantity_to_add, Utc::now())
            .await?;

        tracing::info!(
            product = %product.id,
            previous_quantity,
            quantity = product.quantity,
            "Stock added"
        );

        self.audit
            .record(
                HistoryAction::AddStock,
                EntityType::Product,
                id,
                actor,
                Some(&product.name),
                Some(HistoryChanges::stock_added(
                    previous_quantity,
                    product.quantity,
                )),
            )
            .await;

        Ok(StockDelta {
            previous_quantity,
            product,
        })
    }

    /// Withdrawal: remove up to the available quantity. Any staff role.
    ///
    /// A withdrawal larger than the current stock is rejected inside the
    /// store transaction: no mutation, no audit record.
    pub async fn remove_from_inventory(
        &self,
        actor: &User,
        id: &str,
        quantity_to_remove: i64,
    ) -> Result<StockDelta, AppError> {
        ensure_staff(actor)?;
        if quantity_to_remove <= 0 {
            return Err(AppError::BadRequest(
                "La cantidad debe ser positiva".to_string(),
            ));
        }

        let (previous_quantity, product) = self
            .db
            .adjust_product_quantity(id, -quantity_to_remove, Utc::now())
            .await?;

        tracing::info!(
            product = %product.id,
            previous_quantity,
            quantity = product.quantity,
            "Stock removed"
        );

        self.audit
            .record(
                HistoryAction::RemoveStock,
                EntityType::Product,
                id,
                actor,
                Some(&product.name),
                Some(HistoryChanges::stock_removed(
                    previous_quantity,
                    product.quantity,
                )),
            )
            .await;

        Ok(StockDelta {
            previous_quantity,
            product,
        })
    }

    /// Hard delete. Admin only. The audit record keeps the full pre-delete
    /// snapshot; the document itself is gone.
    pub async fn delete(&self, actor: &User, id: &str) -> Result<(), AppError> {
        ensure_admin(actor)?;

        let snapshot = self.db.delete_product(id).await?;

        tracing::info!(product = %id, name = %snapshot.name, "Product deleted");

        let name = snapshot.name.clone();
        self.audit
            .record(
                HistoryAction::Delete,
                EntityType::Product,
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
