// src/handlers/auth_handler.rs
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    errors::TaxiResult,
    handlers::extractors::SESSION_COOKIE,
    models::{DriverLogin, DriverResponse},
    services::AuthOperations,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginPage {
    pub detail: String,
    pub next: String,
}

pub async fn login_page(Query(query): Query<LoginQuery>) -> Json<LoginPage> {
    Json(LoginPage {
        detail: "Authentication required".to_string(),
        next: query.next.unwrap_or_else(|| "/".to_string()),
    })
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(credentials): Json<DriverLogin>,
) -> TaxiResult<(CookieJar, Json<DriverResponse>)> {
    let (driver, session) = state.auth_service.login(credentials).await?;
    let cookie = Cookie::build((SESSION_COOKIE, session.token)).http_only(true).path("/");
    Ok((jar.add(cookie), Json(driver)))
}

pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> TaxiResult<(CookieJar, StatusCode)> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.auth_service.logout(cookie.value()).await?;
    }
    Ok((jar.remove(Cookie::build(SESSION_COOKIE).path("/")), StatusCode::NO_CONTENT))
}
