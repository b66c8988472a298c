// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Lavandería Inventory: stock and supplier management for a laundry shop
//!
//! This crate provides the backend API for tracking product stock levels,
//! registering restocks and withdrawals, managing supplier records, and
//! keeping an append-only audit trail of every mutation.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::FirestoreDb;
use services::{InventoryService, SessionService, SupplierService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub sessions: SessionService,
    pub inventory: InventoryService,
    pub suppliers: SupplierService,
}
