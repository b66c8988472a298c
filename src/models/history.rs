// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Audit trail records.
//!
//! Every mutation to a product or supplier produces exactly one
//! [`HistoryRecord`]. Records are append-only: nothing in the application
//! updates or deletes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Create,
    Update,
    Delete,
    AddStock,
    RemoveStock,
}

impl HistoryAction {
    pub fn is_stock_change(self) -> bool {
        matches!(self, HistoryAction::AddStock | HistoryAction::RemoveStock)
    }
}

/// Which kind of entity a record refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Product,
    Supplier,
    User,
}

impl EntityType {
    /// Spanish label used in report lines.
    pub fn label_es(self) -> &'static str {
        match self {
            EntityType::Product => "producto",
            EntityType::Supplier => "proveedor",
            EntityType::User => "usuario",
        }
    }
}

/// Detail payload of a record, keyed by the action that produced it.
///
/// One variant per action shape so consumers can match exhaustively
/// instead of poking at a free-form map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryChanges {
    /// A restock: quantity went up by `quantity_added`.
    #[serde(rename_all = "camelCase")]
    StockAdded {
        previous_quantity: i64,
        new_quantity: i64,
        quantity_added: i64,
    },
    /// A withdrawal: quantity went down by `quantity_removed`.
    #[serde(rename_all = "camelCase")]
    StockRemoved {
        previous_quantity: i64,
        new_quantity: i64,
        quantity_removed: i64,
    },
    /// Full snapshot of the entity as it was right before deletion.
    #[serde(rename_all = "camelCase")]
    Deleted {
        snapshot: serde_json::Map<String, serde_json::Value>,
    },
    /// Initial field set (create) or the changed fields only (update).
    Fields(serde_json::Map<String, serde_json::Value>),
}

impl HistoryChanges {
    pub fn stock_added(previous_quantity: i64, new_quantity: i64) -> Self {
        HistoryChanges::StockAdded {
            previous_quantity,
            new_quantity,
            quantity_added: new_quantity - previous_quantity,
        }
    }

    pub fn stock_removed(previous_quantity: i64, new_quantity: i64) -> Self {
        HistoryChanges::StockRemoved {
            previous_quantity,
            new_quantity,
            quantity_removed: previous_quantity - new_quantity,
        }
    }
}

/// One audit entry, as stored in the history collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: String,
    pub action: HistoryAction,
    pub entity_type: EntityType,
    pub entity_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    pub user_id: String,
    pub user_name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<HistoryChanges>,
}
