// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Emulator-backed tests for the stock mutation and audit properties:
//! every successful mutation leaves exactly one history record with the
//! right delta, and rejected mutations leave nothing at all.

use lavanderia_inventory::db::FirestoreDb;
use lavanderia_inventory::error::AppError;
use lavanderia_inventory::models::{
    HistoryAction, HistoryChanges, HistoryRecord, NewProduct, ProductUpdate, Role,
};
use lavanderia_inventory::services::{AuditRecorder, InventoryService};

mod common;
use common::{test_db, test_user};

async fn inventory() -> (FirestoreDb, InventoryService) {
    let db = test_db().await;
    let audit = AuditRecorder::new(db.clone());
    (db.clone(), InventoryService::new(db, audit))
}

fn new_product(name: &str, quantity: i64) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        brand: None,
        unit_quantity: None,
        unit: None,
        quantity,
        price: 5000.0,
        category: "Insumos".to_string(),
        supplier: "Proveedor Sur".to_string(),
    }
}

async fn history_for(db: &FirestoreDb, entity_id: &str) -> Vec<HistoryRecord> {
    db.list_history(500)
        .await
        .expect("history query failed")
        .into_iter()
        .filter(|record| record.entity_id == entity_id)
        .collect()
}

#[tokio::test]
async fn test_create_then_restock_end_to_end() {
    require_emulator!();
    let (db, inventory) = inventory().await;
    let admin = test_user(Role::Admin);

    let product = inventory
        .create(&admin, new_product("Detergente", 0))
        .await
        .expect("create failed");
    assert_eq!(product.quantity, 0);

    let delta = inventory
        .add_to_inventory(&admin, &product.id, 50)
        .await
        .expect("restock failed");
    assert_eq!(delta.previous_quantity, 0);
    assert_eq!(delta.product.quantity, 50);

    let stored = inventory.get(&product.id).await.expect("get failed");
    assert_eq!(stored.quantity, 50);

    let records = history_for(&db, &product.id).await;
    assert_eq!(records.len(), 2, "expected one create and one add_stock");

    let create = records
        .iter()
        .find(|r| r.action == HistoryAction::Create)
        .expect("create record missing");
    match &create.changes {
        Some(HistoryChanges::Fields(fields)) => {
            assert_eq!(fields["name"], "Detergente");
            assert_eq!(fields["quantity"], 0);
            assert!(fields.get("id").is_none(), "server fields stay out");
        }
        other => panic!("unexpected create changes: {:?}", other),
    }

    let restock = records
        .iter()
        .find(|r| r.action == HistoryAction::AddStock)
        .expect("add_stock record missing");
    assert_eq!(
        restock.changes,
        Some(HistoryChanges::StockAdded {
            previous_quantity: 0,
            new_quantity: 50,
            quantity_added: 50,
        })
    );
    assert_eq!(restock.user_name, admin.display_name);
    assert_eq!(restock.entity_name.as_deref(), Some("Detergente"));
}

#[tokio::test]
async fn test_withdrawal_records_delta() {
    require_emulator!();
    let (db, inventory) = inventory().await;
    let admin = test_user(Role::Admin);
    let operario = test_user(Role::Operario);

    let product = inventory
        .create(&admin, new_product("Cloro", 50))
        .await
        .expect("create failed");

    let delta = inventory
        .remove_from_inventory(&operario, &product.id, 20)
        .await
        .expect("withdrawal failed");
    assert_eq!(delta.previous_quantity, 50);
    assert_eq!(delta.product.quantity, 30);

    let records = history_for(&db, &product.id).await;
    let withdrawal = records
        .iter()
        .find(|r| r.action == HistoryAction::RemoveStock)
        .expect("remove_stock record missing");
    assert_eq!(
        withdrawal.changes,
        Some(HistoryChanges::StockRemoved {
            previous_quantity: 50,
            new_quantity: 30,
            quantity_removed: 20,
        })
    );
    assert_eq!(withdrawal.user_id, operario.uid);
}

#[tokio::test]
async fn test_overdraw_rejected_without_trace() {
    require_emulator!();
    let (db, inventory) = inventory().await;
    let admin = test_user(Role::Admin);

    let product = inventory
        .create(&admin, new_product("Suavizante", 5))
        .await
        .expect("create failed");
    let records_before = history_for(&db, &product.id).await.len();

    let result = inventory
        .remove_from_inventory(&admin, &product.id, 10)
        .await;
    match result {
        Err(AppError::InsufficientStock {
            available,
            requested,
        }) => {
            assert_eq!(available, 5);
            assert_eq!(requested, 10);
        }
        other => panic!("expected insufficient stock, got {:?}", other.map(|_| ())),
    }

    // No mutation, no audit record.
    let stored = inventory.get(&product.id).await.expect("get failed");
    assert_eq!(stored.quantity, 5);
    assert_eq!(history_for(&db, &product.id).await.len(), records_before);
}

#[tokio::test]
async fn test_nonpositive_adjustment_rejected() {
    require_emulator!();
    let (_, inventory) = inventory().await;
    let admin = test_user(Role::Admin);

    let product = inventory
        .create(&admin, new_product("Quitamanchas", 5))
        .await
        .expect("create failed");

    assert!(matches!(
        inventory.add_to_inventory(&admin, &product.id, 0).await,
        Err(AppError::BadRequest(_))
    ));
    assert!(matches!(
        inventory
            .remove_from_inventory(&admin, &product.id, -3)
            .await,
        Err(AppError::BadRequest(_))
    ));
}

#[tokio::test]
async fn test_restock_via_update_flag() {
    require_emulator!();
    let (db, inventory) = inventory().await;
    let admin = test_user(Role::Admin);

    let product = inventory
        .create(&admin, new_product("Perborato", 10))
        .await
        .expect("create failed");

    // Restock edit: quantity change lands as add_stock with the delta.
    let update = ProductUpdate {
        quantity: Some(35),
        ..Default::default()
    };
    let updated = inventory
        .update(&admin, &product.id, update, true)
        .await
        .expect("restock update failed");
    assert_eq!(updated.quantity, 35);

    // Plain edit: changed fields only.
    let update = ProductUpdate {
        price: Some(6000.0),
        ..Default::default()
    };
    inventory
        .update(&admin, &product.id, update, false)
        .await
        .expect("plain update failed");

    let records = history_for(&db, &product.id).await;

    let restock = records
        .iter()
        .find(|r| r.action == HistoryAction::AddStock)
        .expect("add_stock record missing");
    assert_eq!(
        restock.changes,
        Some(HistoryChanges::StockAdded {
            previous_quantity: 10,
            new_quantity: 35,
            quantity_added: 25,
        })
    );

    let edit = records
        .iter()
        .find(|r| r.action == HistoryAction::Update)
        .expect("update record missing");
    match &edit.changes {
        Some(HistoryChanges::Fields(fields)) => {
            assert_eq!(fields.len(), 1);
            assert_eq!(fields["price"], 6000.0);
        }
        other => panic!("unexpected update changes: {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_audits_exactly_once_with_snapshot() {
    require_emulator!();
    let (db, inventory) = inventory().await;
    let admin = test_user(Role::Admin);

    let product = inventory
        .create(&admin, new_product("Jabón", 7))
        .await
        .expect("create failed");

    inventory
        .delete(&admin, &product.id)
        .await
        .expect("delete failed");

    let records = history_for(&db, &product.id).await;
    let deletes: Vec<_> = records
        .iter()
        .filter(|r| r.action == HistoryAction::Delete)
        .collect();
    assert_eq!(deletes.len(), 1);
    match &deletes[0].changes {
        Some(HistoryChanges::Deleted { snapshot }) => {
            assert_eq!(snapshot["name"], "Jabón");
            assert_eq!(snapshot["quantity"], 7);
        }
        other => panic!("expected snapshot, got {:?}", other),
    }

    // Deleting a missing id is rejected and records nothing.
    let records_before = history_for(&db, &product.id).await.len();
    assert!(matches!(
        inventory.delete(&admin, &product.id).await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(history_for(&db, &product.id).await.len(), records_before);
}

#[tokio::test]
async fn test_role_gate_in_service_layer() {
    require_emulator!();
    let (_, inventory) = inventory().await;
    let operario = test_user(Role::Operario);

    assert!(matches!(
        inventory.create(&operario, new_product("X", 1)).await,
        Err(AppError::Forbidden)
    ));
}

const CONCURRENT_MOVES: i64 = 10;
const MOVE_QUANTITY: i64 = 10;

#[tokio::test]
async fn test_concurrent_restocks_lose_no_updates() {
    // Two concurrent adjustments must never both apply against the same
    // snapshot. A conflicting commit may fail outright; what can never
    // happen is a silently swallowed delta.
    require_emulator!();
    let (_, inventory) = inventory().await;
    let admin = test_user(Role::Admin);

    let product = inventory
        .create(&admin, new_product("Concurrente", 0))
        .await
        .expect("create failed");

    let mut handles = vec![];
    for _ in 0..CONCURRENT_MOVES {
        let inventory = inventory.clone();
        let admin = admin.clone();
        let id = product.id.clone();
        handles.push(tokio::spawn(async move {
            inventory.add_to_inventory(&admin, &id, MOVE_QUANTITY).await
        }));
    }

    let mut successes = 0i64;
    for handle in handles {
        if handle.await.expect("task join failed").is_ok() {
            successes += 1;
        }
    }
    assert!(successes > 0, "at least one restock must commit");

    let stored = inventory.get(&product.id).await.expect("get failed");
    assert_eq!(
        stored.quantity,
        successes * MOVE_QUANTITY,
        "committed quantity must match successful restocks exactly"
    );
}
