// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - User profiles (identity resolution)
//! - Products (catalog and transactional stock adjustments)
//! - Suppliers
//! - History (append-only audit records)

use crate::db::Collections;
use crate::error::AppError;
use crate::models::{
    HistoryRecord, Product, ProductUpdate, Supplier, SupplierUpdate, UserProfile,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
    collections: Collections,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str, collection_suffix: &str) -> Result<Self, AppError> {
        let collections = Collections::new(collection_suffix);

        // If the emulator environment variable is set, use unauthenticated
        // connection to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id, collections).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
            collections,
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(
        project_id: &str,
        collections: Collections,
    ) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without
        // needing a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
            collections,
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self {
            client: None,
            collections: Collections::new("_test"),
        }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get a stored user profile by provider uid.
    pub async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(&self.collections.users)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or replace a stored profile. Profiles are normally
    /// provisioned out-of-band; this exists for tooling and tests.
    pub async fn upsert_profile(&self, uid: &str, profile: &UserProfile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(&self.collections.users)
            .document_id(uid)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Update the profile's last-access timestamp, leaving other fields alone.
    pub async fn touch_last_access(&self, uid: &str, now: DateTime<Utc>) -> Result<(), AppError> {
        #[derive(Serialize, Deserialize)]
        struct LastAccessPatch {
            ultimo_acceso: DateTime<Utc>,
        }

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(["ultimo_acceso"])
            .in_col(&self.collections.users)
            .document_id(uid)
            .object(&LastAccessPatch { ultimo_acceso: now })
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Product Operations ──────────────────────────────────────

    /// List all products, newest first.
    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(self.collections.products.as_str())
            .order_by([(
                "createdAt",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a product by id.
    pub async fn get_product(&self, id: &str) -> Result<Option<Product>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(&self.collections.products)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Persist a new product document under its own id.
    pub async fn create_product(&self, product: &Product) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(self.collections.products.as_str())
            .document_id(&product.id)
            .object(product)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Atomically adjust a product's quantity by `delta`.
    ///
    /// Runs inside a Firestore transaction so two concurrent adjustments
    /// cannot both apply against the same snapshot: the second commit fails
    /// instead of silently losing an update. Returns the pre-mutation
    /// quantity together with the updated product.
    ///
    /// A negative result is rejected before the write: the quantity
    /// invariant is enforced here, against the transactional snapshot,
    /// never against client-cached state.
    pub async fn adjust_product_quantity(
        &self,
        id: &str,
        delta: i64,
        now: DateTime<Utc>,
    ) -> Result<(i64, Product), AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // Read the current state; this registers the document for conflict
        // detection against concurrent writers.
        let current: Option<Product> = client
            .fluent()
            .select()
            .by_id_in(&self.collections.products)
            .obj()
            .one(id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read product in transaction: {}", e))
            })?;

        let Some(mut product) = current else {
            let _ = transaction.rollback().await;
            return Err(AppError::NotFound(format!("Producto {} no existe", id)));
        };

        let previous_quantity = product.quantity;
        let new_quantity = previous_quantity + delta;
        if new_quantity < 0 {
            let _ = transaction.rollback().await;
            return Err(AppError::InsufficientStock {
                available: previous_quantity,
                requested: -delta,
            });
        }

        product.quantity = new_quantity;
        product.updated_at = now;

        client
            .fluent()
            .update()
            .in_col(&self.collections.products)
            .document_id(id)
            .object(&product)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add product to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok((previous_quantity, product))
    }

    /// Merge a partial update into a product within a transaction.
    ///
    /// The pre-mutation snapshot is read immediately before the write so
    /// that restock deltas are computed against the stored state, not
    /// whatever the client last saw. Returns (before, after).
    pub async fn apply_product_update(
        &self,
        id: &str,
        update: &ProductUpdate,
        now: DateTime<Utc>,
    ) -> Result<(Product, Product), AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let current: Option<Product> = client
            .fluent()
            .select()
            .by_id_in(&self.collections.products)
            .obj()
            .one(id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read product in transaction: {}", e))
            })?;

        let Some(before) = current else {
            let _ = transaction.rollback().await;
            return Err(AppError::NotFound(format!("Producto {} no existe", id)));
        };

        let mut after = before.clone();
        update.apply(&mut after, now);

        client
            .fluent()
            .update()
            .in_col(&self.collections.products)
            .document_id(id)
            .object(&after)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add product to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok((before, after))
    }

    /// Delete a product, returning the pre-delete snapshot.
    pub async fn delete_product(&self, id: &str) -> Result<Product, AppError> {
        let snapshot = self
            .get_product(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Producto {} no existe", id)))?;

        self.get_client()?
            .fluent()
            .delete()
            .from(self.collections.products.as_str())
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(snapshot)
    }

    // ─── Supplier Operations ─────────────────────────────────────

    /// List all suppliers, newest first.
    pub async fn list_suppliers(&self) -> Result<Vec<Supplier>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(self.collections.suppliers.as_str())
            .order_by([(
                "createdAt",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a supplier by id.
    pub async fn get_supplier(&self, id: &str) -> Result<Option<Supplier>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(&self.collections.suppliers)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Persist a new supplier document under its own id.
    pub async fn create_supplier(&self, supplier: &Supplier) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(self.collections.suppliers.as_str())
            .document_id(&supplier.id)
            .object(supplier)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Merge a partial update into a supplier. Returns (before, after).
    pub async fn apply_supplier_update(
        &self,
        id: &str,
        update: &SupplierUpdate,
    ) -> Result<(Supplier, Supplier), AppError> {
        let before = self
            .get_supplier(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Proveedor {} no existe", id)))?;

        let mut after = before.clone();
        update.apply(&mut after);

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(&self.collections.suppliers)
            .document_id(id)
            .object(&after)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((before, after))
    }

    /// Delete a supplier, returning the pre-delete snapshot.
    pub async fn delete_supplier(&self, id: &str) -> Result<Supplier, AppError> {
        let snapshot = self
            .get_supplier(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Proveedor {} no existe", id)))?;

        self.get_client()?
            .fluent()
            .delete()
            .from(self.collections.suppliers.as_str())
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(snapshot)
    }

    // ─── History Operations ──────────────────────────────────────

    /// Append one audit record. Nothing in this crate updates or deletes
    /// documents in the history collection.
    pub async fn append_history(&self, record: &HistoryRecord) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(self.collections.history.as_str())
            .document_id(&record.id)
            .object(record)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Most recent history records, newest first.
    pub async fn list_history(&self, limit: u32) -> Result<Vec<HistoryRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(self.collections.history.as_str())
            .order_by([(
                "timestamp",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
