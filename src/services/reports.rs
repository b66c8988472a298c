// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Read side of the audit trail: filtering, statistics, and the
//! human-readable one-liners that exported reports print. Also the
//! low-stock breakdown over the product set.
//!
//! Everything here is a pure function over already-fetched records so the
//! same logic serves the dashboard, the history page, and the PDF export.

use crate::models::{
    EntityType, HistoryAction, HistoryChanges, HistoryRecord, Product, StockLevel,
};
use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Time window for history filtering, relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Today,
    Week,
    Month,
    #[default]
    All,
}

impl TimeRange {
    /// Inclusive lower bound of the window, or `None` for no bound.
    ///
    /// Days start at midnight UTC; weeks start on Monday.
    pub fn start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let start_of_day = now.date_naive().and_hms_opt(0, 0, 0).unwrap().and_utc();

        match self {
            TimeRange::Today => Some(start_of_day),
            TimeRange::Week => {
                let days_since_monday = now.date_naive().weekday().num_days_from_monday();
                Some(start_of_day - Duration::days(days_since_monday as i64))
            }
            TimeRange::Month => Some(
                now.date_naive()
                    .with_day(1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
                    .and_utc(),
            ),
            TimeRange::All => None,
        }
    }
}

/// Conjunctive history filter; absent criteria match everything.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryFilter {
    #[serde(default)]
    pub action: Option<HistoryAction>,
    #[serde(default)]
    pub entity_type: Option<EntityType>,
    /// Case-insensitive match against user name or entity name.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub range: Option<TimeRange>,
}

impl HistoryFilter {
    fn matches(&self, record: &HistoryRecord, now: DateTime<Utc>) -> bool {
        if let Some(action) = self.action {
            if record.action != action {
                return false;
            }
        }

        if let Some(entity_type) = self.entity_type {
            if record.entity_type != entity_type {
                return false;
            }
        }

        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !needle.is_empty() {
                let in_user = record.user_name.to_lowercase().contains(&needle);
                let in_entity = record
                    .entity_name
                    .as_deref()
                    .map(|name| name.to_lowercase().contains(&needle))
                    .unwrap_or(false);
                if !in_user && !in_entity {
                    return false;
                }
            }
        }

        if let Some(start) = self.range.unwrap_or_default().start(now) {
            // Inclusive: a record stamped exactly at the boundary counts.
            if record.timestamp < start {
                return false;
            }
        }

        true
    }
}

/// Apply a filter to a record list. All criteria are ANDed.
pub fn filter_records(
    records: &[HistoryRecord],
    filter: &HistoryFilter,
    now: DateTime<Utc>,
) -> Vec<HistoryRecord> {
    records
        .iter()
        .filter(|record| filter.matches(record, now))
        .cloned()
        .collect()
}

/// Counts by action category over a (usually filtered) record set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub total: usize,
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
    /// `add_stock` and `remove_stock` combined.
    pub stock_changes: usize,
}

pub fn summarize(records: &[HistoryRecord]) -> HistorySummary {
    let mut summary = HistorySummary {
        total: records.len(),
        creates: 0,
        updates: 0,
        deletes: 0,
        stock_changes: 0,
    };

    for record in records {
        match record.action {
            HistoryAction::Create => summary.creates += 1,
            HistoryAction::Update => summary.updates += 1,
            HistoryAction::Delete => summary.deletes += 1,
            HistoryAction::AddStock | HistoryAction::RemoveStock => summary.stock_changes += 1,
        }
    }

    summary
}

/// One-line description of a record for exported reports.
pub fn describe(record: &HistoryRecord) -> String {
    let label = record.entity_type.label_es();
    let name = record
        .entity_name
        .as_deref()
        .unwrap_or(record.entity_id.as_str());

    match (&record.action, &record.changes) {
        (
            HistoryAction::AddStock,
            Some(HistoryChanges::StockAdded {
                previous_quantity,
                new_quantity,
                quantity_added,
            }),
        ) => format!(
            "Entrada: +{} unids. ({} -> {})",
            quantity_added, previous_quantity, new_quantity
        ),
        (
            HistoryAction::RemoveStock,
            Some(HistoryChanges::StockRemoved {
                previous_quantity,
                new_quantity,
                quantity_removed,
            }),
        ) => format!(
            "Salida: -{} unids. ({} -> {})",
            quantity_removed, previous_quantity, new_quantity
        ),
        (HistoryAction::Create, _) => format!("Creación de {} \"{}\"", label, name),
        (HistoryAction::Update, Some(HistoryChanges::Fields(fields))) => {
            let changed: Vec<&str> = fields.keys().map(String::as_str).collect();
            format!(
                "Edición de {} \"{}\": {}",
                label,
                name,
                changed.join(", ")
            )
        }
        (HistoryAction::Delete, _) => format!("Eliminación de {} \"{}\"", label, name),
        // A stock action whose payload went missing still reads sensibly.
        (HistoryAction::AddStock, _) => format!("Entrada de stock en \"{}\"", name),
        (HistoryAction::RemoveStock, _) => format!("Salida de stock de \"{}\"", name),
        (HistoryAction::Update, _) => format!("Edición de {} \"{}\"", label, name),
    }
}

/// Products grouped by stock classification, for dashboard alerts and
/// report coloring.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockReport {
    pub critical: Vec<Product>,
    pub medium: Vec<Product>,
    pub ok_count: usize,
}

pub fn low_stock_report(products: &[Product]) -> LowStockReport {
    let mut report = LowStockReport {
        critical: Vec::new(),
        medium: Vec::new(),
        ok_count: 0,
    };

    for product in products {
        match product.stock_level() {
            StockLevel::Critical => report.critical.push(product.clone()),
            StockLevel::Medium => report.medium.push(product.clone()),
            StockLevel::Ok => report.ok_count += 1,
        }
    }

    report
}
