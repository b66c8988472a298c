// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Audit trail recorder.
//!
//! One immutable record per mutation, appended after the entity write has
//! committed. Recording is best-effort on purpose: an audit outage must
//! not fail or roll back the business operation, so failures are logged
//! at error level and swallowed here.

use crate::db::FirestoreDb;
use crate::models::{EntityType, HistoryAction, HistoryChanges, HistoryRecord, User};
use chrono::Utc;

/// Append-only writer for the history collection.
#[derive(Clone)]
pub struct AuditRecorder {
    db: FirestoreDb,
}

impl AuditRecorder {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Append one record with a server-assigned timestamp.
    pub async fn record(
        &self,
        action: HistoryAction,
        entity_type: EntityType,
        entity_id: &str,
        actor: &User,
        entity_name: Option<&str>,
        changes: Option<HistoryChanges>,
    ) {
        let record = HistoryRecord {
            id: uuid::Uuid::new_v4().to_string(),
            action,
            entity_type,
            entity_id: entity_id.to_string(),
            entity_name: entity_name.map(|name| name.to_string()),
            user_id: actor.uid.clone(),
            user_name: actor.display_name.clone(),
            timestamp: Utc::now(),
            changes,
        };

        if let Err(error) = self.db.append_history(&record).await {
            tracing::error!(
                %error,
                entity_id,
                action = ?action,
                "History write failed after committed mutation"
            );
        }
    }
}
