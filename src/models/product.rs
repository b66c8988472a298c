// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Product model, mutation payloads, and the stock classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Below this quantity a product is critically low.
pub const LOW_STOCK_THRESHOLD: i64 = 10;
/// Below this quantity (and at or above the low threshold) stock is medium.
pub const MEDIUM_STOCK_THRESHOLD: i64 = 25;

/// Product document stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Content per sales unit, e.g. 5.0 for a 5 kg bag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub quantity: i64,
    pub price: f64,
    pub category: String,
    /// Supplier name as written at registration time. Denormalized on
    /// purpose: renaming a supplier does not rewrite existing products.
    pub supplier: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn stock_level(&self) -> StockLevel {
        StockLevel::classify(self.quantity)
    }
}

/// Three-tier stock classification used for dashboard alerts, row
/// highlighting, and report coloring. Implemented once, here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    Critical,
    Medium,
    Ok,
}

impl StockLevel {
    /// Total and non-overlapping for every quantity.
    pub fn classify(quantity: i64) -> StockLevel {
        if quantity < LOW_STOCK_THRESHOLD {
            StockLevel::Critical
        } else if quantity < MEDIUM_STOCK_THRESHOLD {
            StockLevel::Medium
        } else {
            StockLevel::Ok
        }
    }
}

/// Payload for registering a new product.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[validate(length(min = 1, message = "El nombre es obligatorio"))]
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub unit_quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[validate(range(min = 0, message = "La cantidad no puede ser negativa"))]
    pub quantity: i64,
    #[validate(range(min = 0.0, message = "El precio no puede ser negativo"))]
    pub price: f64,
    #[validate(length(min = 1, message = "La categoría es obligatoria"))]
    pub category: String,
    #[serde(default)]
    pub supplier: String,
}

impl NewProduct {
    /// Materialize the stored document for a creation at `now`.
    pub fn into_product(self, id: String, now: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name,
            brand: self.brand,
            unit_quantity: self.unit_quantity,
            unit: self.unit,
            quantity: self.quantity,
            price: self.price,
            category: self.category,
            supplier: self.supplier,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update payload; only present fields are merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[serde(default)]
    #[validate(length(min = 1, message = "El nombre es obligatorio"))]
    pub name: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub unit_quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "La cantidad no puede ser negativa"))]
    pub quantity: Option<i64>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "El precio no puede ser negativo"))]
    pub price: Option<f64>,
    #[serde(default)]
    #[validate(length(min = 1, message = "La categoría es obligatoria"))]
    pub category: Option<String>,
    #[serde(default)]
    pub supplier: Option<String>,
}

impl ProductUpdate {
    /// Merge the present fields into `product`, refreshing `updated_at`.
    pub fn apply(&self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(brand) = &self.brand {
            product.brand = Some(brand.clone());
        }
        if let Some(unit_quantity) = self.unit_quantity {
            product.unit_quantity = Some(unit_quantity);
        }
        if let Some(unit) = &self.unit {
            product.unit = Some(unit.clone());
        }
        if let Some(quantity) = self.quantity {
            product.quantity = quantity;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(category) = &self.category {
            product.category = category.clone();
        }
        if let Some(supplier) = &self.supplier {
            product.supplier = supplier.clone();
        }
        product.updated_at = now;
    }

    /// The provided fields as a map, for the audit record of a plain edit.
    pub fn changed_fields(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut fields = serde_json::Map::new();
        if let Some(name) = &self.name {
            fields.insert("name".to_string(), name.clone().into());
        }
        if let Some(brand) = &self.brand {
            fields.insert("brand".to_string(), brand.clone().into());
        }
        if let Some(unit_quantity) = self.unit_quantity {
            fields.insert("unitQuantity".to_string(), unit_quantity.into());
        }
        if let Some(unit) = &self.unit {
            fields.insert("unit".to_string(), unit.clone().into());
        }
        if let Some(quantity) = self.quantity {
            fields.insert("quantity".to_string(), quantity.into());
        }
        if let Some(price) = self.price {
            fields.insert("price".to_string(), price.into());
        }
        if let Some(category) = &self.category {
            fields.insert("category".to_string(), category.clone().into());
        }
        if let Some(supplier) = &self.supplier {
            fields.insert("supplier".to_string(), supplier.clone().into());
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_classification_boundaries() {
        assert_eq!(StockLevel::classify(0), StockLevel::Critical);
        assert_eq!(StockLevel::classify(9), StockLevel::Critical);
        assert_eq!(StockLevel::classify(10), StockLevel::Medium);
        assert_eq!(StockLevel::classify(24), StockLevel::Medium);
        assert_eq!(StockLevel::classify(25), StockLevel::Ok);
        assert_eq!(StockLevel::classify(1_000_000), StockLevel::Ok);
    }

    #[test]
    fn test_update_merges_only_present_fields() {
        let now = Utc::now();
        let mut product = Product {
            id: "p1".to_string(),
            name: "Detergente".to_string(),
            brand: Some("Acme".to_string()),
            unit_quantity: Some(5.0),
            unit: Some("kg".to_string()),
            quantity: 12,
            price: 5000.0,
            category: "Insumos".to_string(),
            supplier: "Proveedor Sur".to_string(),
            created_at: now,
            updated_at: now,
        };

        let later = now + chrono::Duration::minutes(5);
        let update = ProductUpdate {
            price: Some(5500.0),
            quantity: Some(40),
            ..Default::default()
        };
        update.apply(&mut product, later);

        assert_eq!(product.price, 5500.0);
        assert_eq!(product.quantity, 40);
        assert_eq!(product.name, "Detergente");
        assert_eq!(product.brand.as_deref(), Some("Acme"));
        assert_eq!(product.updated_at, later);
        assert_eq!(product.created_at, now);
    }

    #[test]
    fn test_changed_fields_reflects_payload() {
        let update = ProductUpdate {
            name: Some("Suavizante".to_string()),
            quantity: Some(3),
            ..Default::default()
        };
        let fields = update.changed_fields();

        assert_eq!(fields.len(), 2);
        assert_eq!(fields["name"], "Suavizante");
        assert_eq!(fields["quantity"], 3);

        assert!(ProductUpdate::default().is_empty());
    }
}
