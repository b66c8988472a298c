// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request validation tests.
//!
//! Validation failures must be rejected with 400 before any write; all of
//! these run against the offline mock store, so reaching it would surface
//! as a 500 instead and fail the assertion.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use lavanderia_inventory::models::Role;
use tower::ServiceExt;

mod common;
use common::{create_test_app, session_token};

async fn post_json(
    app: axum::Router,
    token: &str,
    uri: &str,
    body: serde_json::Value,
) -> StatusCode {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
    .status()
}

#[tokio::test]
async fn test_create_product_rejects_negative_quantity() {
    let (app, state) = create_test_app();
    let token = session_token(Role::Admin, &state.config.jwt_signing_key);

    let body = serde_json::json!({
        "name": "Detergente",
        "quantity": -5,
        "price": 5000.0,
        "category": "Insumos",
        "supplier": "Sur"
    });

    let status = post_json(app, &token, "/api/products", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_product_rejects_empty_name() {
    let (app, state) = create_test_app();
    let token = session_token(Role::Admin, &state.config.jwt_signing_key);

    let body = serde_json::json!({
        "name": "",
        "quantity": 10,
        "price": 5000.0,
        "category": "Insumos",
        "supplier": "Sur"
    });

    let status = post_json(app, &token, "/api/products", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_product_rejects_negative_price() {
    let (app, state) = create_test_app();
    let token = session_token(Role::Admin, &state.config.jwt_signing_key);

    let body = serde_json::json!({
        "name": "Detergente",
        "quantity": 10,
        "price": -1.0,
        "category": "Insumos",
        "supplier": "Sur"
    });

    let status = post_json(app, &token, "/api/products", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stock_adjustment_rejects_zero_and_excess() {
    let (app, state) = create_test_app();
    let token = session_token(Role::Operario, &state.config.jwt_signing_key);

    let status = post_json(
        app.clone(),
        &token,
        "/api/products/p1/stock/add",
        serde_json::json!({"quantity": 0}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Upper bound is a sanity policy against typos.
    let status = post_json(
        app.clone(),
        &token,
        "/api/products/p1/stock/add",
        serde_json::json!({"quantity": 20_000}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let status = post_json(
        app,
        &token,
        "/api/products/p1/stock/remove",
        serde_json::json!({"quantity": -3}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_supplier_rejects_bad_email() {
    let (app, state) = create_test_app();
    let token = session_token(Role::Admin, &state.config.jwt_signing_key);

    let body = serde_json::json!({
        "name": "Proveedor Sur",
        "email": "not-an-email",
        "phone": "123",
        "address": "Calle 1"
    });

    let status = post_json(app, &token, "/api/suppliers", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_rejects_malformed_email() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({"email": "nope", "password": "secret"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    // Rejected before the identity provider is consulted.
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_update_rejected() {
    let (app, state) = create_test_app();
    let token = session_token(Role::Admin, &state.config.jwt_signing_key);

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/products/p1")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
