// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session routes: interactive login, intranet token link, and logout.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, decode_session, SESSION_COOKIE};
use crate::models::User;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/link", post(link))
        .route("/auth/logout", get(logout))
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Correo inválido"))]
    email: String,
    #[validate(length(min = 1, message = "La contraseña es obligatoria"))]
    password: String,
}

#[derive(Deserialize)]
pub struct LinkRequest {
    token: String,
}

/// Session response: the resolved user plus the bearer token for clients
/// that cannot use the cookie.
#[derive(Serialize)]
pub struct SessionResponse {
    user: User,
    token: String,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    success: bool,
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(30))
        .build()
}

/// Interactive email/password login.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    request.validate()?;

    let user = state.sessions.login(&request.email, &request.password).await?;

    let token = create_jwt(&user, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    tracing::info!(uid = %user.uid, "Login successful");

    let jar = jar.add(session_cookie(token.clone()));
    Ok((jar, Json(SessionResponse { user, token })))
}

/// Intranet token-link login: adopt an externally signed profile id.
async fn link(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LinkRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let user = state.sessions.login_with_token(&request.token).await?;

    let token = create_jwt(&user, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    tracing::info!(uid = %user.uid, "Token link successful");

    let jar = jar.add(session_cookie(token.clone()));
    Ok((jar, Json(SessionResponse { user, token })))
}

/// Logout: clear the session cookie and the cached resolution.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<LogoutResponse>) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Ok(user) = decode_session(cookie.value(), &state.config.jwt_signing_key) {
            state.sessions.sign_out(&user.uid);
            tracing::info!(uid = %user.uid, "Signed out");
        }
    }

    // The removal cookie must carry the same path to actually clear it.
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());
    (jar, Json(LogoutResponse { success: true }))
}
