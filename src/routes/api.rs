// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated staff.
//!
//! Role enforcement happens in the service layer, which receives the
//! acting user with every call; handlers only shuttle data. The auth
//! middleware is applied in routes/mod.rs for these routes.

use crate::error::Result;
use crate::models::{
    EntityType, HistoryAction, HistoryRecord, NewProduct, NewSupplier, Product, ProductUpdate,
    Supplier, SupplierUpdate, User,
};
use crate::services::reports::{
    self, HistoryFilter, HistorySummary, LowStockReport, TimeRange,
};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

const DEFAULT_HISTORY_LIMIT: u32 = 100;
const MAX_HISTORY_LIMIT: u32 = 500;

/// API routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/low-stock", get(low_stock))
        .route(
            "/api/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/api/products/{id}/stock/add", post(add_stock))
        .route("/api/products/{id}/stock/remove", post(remove_stock))
        .route("/api/suppliers", get(list_suppliers).post(create_supplier))
        .route(
            "/api/suppliers/{id}",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
        .route("/api/history", get(get_history))
        .route("/api/history/summary", get(get_history_summary))
}

// ─── Session ─────────────────────────────────────────────────

/// Current session user, straight from the verified claims.
async fn get_me(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}

// ─── Products ────────────────────────────────────────────────

async fn list_products(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.inventory.list().await?))
}

async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    Ok(Json(state.inventory.get(&id).await?))
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(payload): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state.inventory.create(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[derive(Deserialize)]
struct UpdateParams {
    /// Marks a quantity edit as a restock so it lands in history as an
    /// `add_stock` with the computed delta.
    #[serde(default)]
    restock: bool,
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    Query(params): Query<UpdateParams>,
    Json(payload): Json<ProductUpdate>,
) -> Result<Json<Product>> {
    let product = state
        .inventory
        .update(&user, &id, payload, params.restock)
        .await?;
    Ok(Json(product))
}

#[derive(Serialize)]
struct DeleteResponse {
    success: bool,
}

async fn delete_product(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.inventory.delete(&user, &id).await?;
    Ok(Json(DeleteResponse { success: true }))
}

/// Stock movement request. The upper bound is a sanity policy against
/// typos, not a business invariant.
#[derive(Deserialize, Validate)]
struct StockAdjustment {
    #[validate(range(min = 1, max = 10_000, message = "Cantidad fuera de rango"))]
    quantity: i64,
}

/// Stock movement result: the delta the audit trail recorded.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StockMovementResponse {
    previous_quantity: i64,
    new_quantity: i64,
    product: Product,
}

async fn add_stock(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    Json(payload): Json<StockAdjustment>,
) -> Result<Json<StockMovementResponse>> {
    payload.validate()?;

    let delta = state
        .inventory
        .add_to_inventory(&user, &id, payload.quantity)
        .await?;

    Ok(Json(StockMovementResponse {
        previous_quantity: delta.previous_quantity,
        new_quantity: delta.product.quantity,
        product: delta.product,
    }))
}

async fn remove_stock(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    Json(payload): Json<StockAdjustment>,
) -> Result<Json<StockMovementResponse>> {
    payload.validate()?;

    let delta = state
        .inventory
        .remove_from_inventory(&user, &id, payload.quantity)
        .await?;

    Ok(Json(StockMovementResponse {
        previous_quantity: delta.previous_quantity,
        new_quantity: delta.product.quantity,
        product: delta.product,
    }))
}

async fn low_stock(State(state): State<Arc<AppState>>) -> Result<Json<LowStockReport>> {
    let products = state.inventory.list().await?;
    Ok(Json(reports::low_stock_report(&products)))
}

// ─── Suppliers ───────────────────────────────────────────────

async fn list_suppliers(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Supplier>>> {
    Ok(Json(state.suppliers.list().await?))
}

async fn get_supplier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Supplier>> {
    Ok(Json(state.suppliers.get(&id).await?))
}

async fn create_supplier(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(payload): Json<NewSupplier>,
) -> Result<(StatusCode, Json<Supplier>)> {
    let supplier = state.suppliers.create(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

async fn update_supplier(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    Json(payload): Json<SupplierUpdate>,
) -> Result<Json<Supplier>> {
    Ok(Json(state.suppliers.update(&user, &id, payload).await?))
}

async fn delete_supplier(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.suppliers.delete(&user, &id).await?;
    Ok(Json(DeleteResponse { success: true }))
}

// ─── History ─────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryQuery {
    #[serde(default)]
    action: Option<HistoryAction>,
    #[serde(default)]
    entity_type: Option<EntityType>,
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    range: Option<TimeRange>,
    #[serde(default = "default_history_limit")]
    limit: u32,
}

fn default_history_limit() -> u32 {
    DEFAULT_HISTORY_LIMIT
}

impl HistoryQuery {
    fn filter(&self) -> HistoryFilter {
        HistoryFilter {
            action: self.action,
            entity_type: self.entity_type,
            search: self.search.clone(),
            range: self.range,
        }
    }

    fn limit(&self) -> u32 {
        self.limit.clamp(1, MAX_HISTORY_LIMIT)
    }
}

/// One history row plus its report line.
#[derive(Serialize)]
struct HistoryItem {
    #[serde(flatten)]
    record: HistoryRecord,
    description: String,
}

#[derive(Serialize)]
struct HistoryResponse {
    records: Vec<HistoryItem>,
}

async fn fetch_filtered(
    state: &AppState,
    query: &HistoryQuery,
) -> Result<Vec<HistoryRecord>> {
    let records = state.db.list_history(query.limit()).await?;
    Ok(reports::filter_records(
        &records,
        &query.filter(),
        chrono::Utc::now(),
    ))
}

async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>> {
    let filtered = fetch_filtered(&state, &query).await?;

    let records = filtered
        .into_iter()
        .map(|record| {
            let description = reports::describe(&record);
            HistoryItem {
                record,
                description,
            }
        })
        .collect();

    Ok(Json(HistoryResponse { records }))
}

async fn get_history_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistorySummary>> {
    let filtered = fetch_filtered(&state, &query).await?;
    Ok(Json(reports::summarize(&filtered)))
}
