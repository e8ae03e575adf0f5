// src/handlers/extractors.rs
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

use crate::{
    models::{Driver, Session},
    services::AuthOperations,
    state::AppState,
};

pub const SESSION_COOKIE: &str = "sessionid";
pub const LOGIN_URL: &str = "/accounts/login/";

/// The logged-in driver and their session. Anonymous requests are
/// rejected with a `302` to the login page instead of an error body.
pub struct CurrentSession {
    pub session: Session,
    pub driver: Driver,
}

pub fn login_redirect(next: &str) -> Response {
    let location = format!("{}?next={}", LOGIN_URL, next);
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentSession {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(token) = jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string()) else {
            tracing::debug!("Anonymous request to {}", parts.uri.path());
            return Err(login_redirect(parts.uri.path()));
        };

        match state.auth_service.authenticate(&token).await {
            Ok(Some((session, driver))) => Ok(Self { session, driver }),
            Ok(None) => Err(login_redirect(parts.uri.path())),
            Err(err) => Err(err.into_response()),
        }
    }
}
