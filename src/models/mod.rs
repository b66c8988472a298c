// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod history;
pub mod product;
pub mod supplier;
pub mod user;

pub use history::{EntityType, HistoryAction, HistoryChanges, HistoryRecord};
pub use product::{NewProduct, Product, ProductUpdate, StockLevel};
pub use supplier::{NewSupplier, Supplier, SupplierUpdate};
pub use user::{Role, User, UserProfile};
